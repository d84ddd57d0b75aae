use std::borrow::Cow;

use dropbot_core::{Blackboard, TickContext, WorldMut};
use dropbot_tools::{emit as trace_emit, TraceEvent};

use crate::bt::{NodeResult, Task, TaskFn};
use crate::decorator::Decorator;
use crate::service::Service;

fn decorators_pass(decorators: &[Decorator], blackboard: &Blackboard) -> bool {
    decorators.iter().all(|d| d.evaluate(blackboard))
}

/// Named leaf wrapping a [`Task`] behind its guards.
pub struct TaskNode<W>
where
    W: WorldMut + 'static,
{
    name: Cow<'static, str>,
    decorators: Vec<Decorator>,
    task: Box<dyn Task<W>>,
}

impl<W> TaskNode<W>
where
    W: WorldMut + 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>, task: impl Task<W>) -> Self {
        Self {
            name: name.into(),
            decorators: Vec::new(),
            task: Box::new(task),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult {
        if !decorators_pass(&self.decorators, blackboard) {
            return NodeResult::Failed;
        }
        self.task.tick(ctx, agent, world, blackboard)
    }
}

/// Priority selector.
///
/// Every tick the children are tried from the first one; the first child whose guards pass and
/// whose tick is not `Failed` wins, the selector's services get their chance to run, and the
/// child's result is returned. Nothing about the previous tick's winner is remembered.
pub struct CompositeSelector<W>
where
    W: WorldMut + 'static,
{
    name: Cow<'static, str>,
    decorators: Vec<Decorator>,
    services: Vec<Service<W>>,
    children: Vec<Node<W>>,
}

impl<W> CompositeSelector<W>
where
    W: WorldMut + 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            decorators: Vec::new(),
            services: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: impl Into<Node<W>>) -> Self {
        self.add_child(child);
        self
    }

    pub fn add_child(&mut self, child: impl Into<Node<W>>) {
        self.children.push(child.into());
    }

    pub fn with_service(mut self, service: Service<W>) -> Self {
        self.add_service(service);
        self
    }

    pub fn add_service(&mut self, service: Service<W>) {
        self.services.push(service);
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn children(&self) -> &[Node<W>] {
        &self.children
    }

    pub fn services(&self) -> &[Service<W>] {
        &self.services
    }

    /// Evaluate the selector's own guards, then its children.
    pub fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult {
        if !decorators_pass(&self.decorators, blackboard) {
            return NodeResult::Failed;
        }
        self.tick_children(ctx, agent, world, blackboard)
    }

    fn tick_children(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult {
        for (i, child) in self.children.iter_mut().enumerate() {
            let result = child.tick(ctx, agent, world, blackboard);
            if result.is_failed() {
                continue;
            }

            trace_emit(
                blackboard,
                TraceEvent::new(ctx.tick, "bt.selector.pick").with_a(i as u64),
            );
            for service in self.services.iter_mut() {
                service.tick(ctx, agent, world, blackboard);
            }
            return result;
        }

        NodeResult::Failed
    }
}

/// A tree node: either a guarded leaf or a guarded selector.
pub enum Node<W>
where
    W: WorldMut + 'static,
{
    Task(TaskNode<W>),
    Selector(CompositeSelector<W>),
}

impl<W> Node<W>
where
    W: WorldMut + 'static,
{
    pub fn task(name: impl Into<Cow<'static, str>>, task: impl Task<W>) -> Self {
        Node::Task(TaskNode::new(name, task))
    }

    pub fn task_fn(
        name: impl Into<Cow<'static, str>>,
        f: impl FnMut(&TickContext, W::Agent, &mut W, &mut Blackboard) -> NodeResult + 'static,
    ) -> Self {
        Self::task(name, TaskFn::new(f))
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        match &mut self {
            Node::Task(node) => node.decorators.push(decorator),
            Node::Selector(node) => node.decorators.push(decorator),
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Task(node) => node.name(),
            Node::Selector(node) => node.name(),
        }
    }

    pub fn decorators(&self) -> &[Decorator] {
        match self {
            Node::Task(node) => node.decorators(),
            Node::Selector(node) => node.decorators(),
        }
    }

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult {
        match self {
            Node::Task(node) => node.tick(ctx, agent, world, blackboard),
            Node::Selector(node) => node.tick(ctx, agent, world, blackboard),
        }
    }
}

impl<W> From<CompositeSelector<W>> for Node<W>
where
    W: WorldMut + 'static,
{
    fn from(selector: CompositeSelector<W>) -> Self {
        Node::Selector(selector)
    }
}

impl<W> From<TaskNode<W>> for Node<W>
where
    W: WorldMut + 'static,
{
    fn from(task: TaskNode<W>) -> Self {
        Node::Task(task)
    }
}

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use dropbot_core::{Blackboard, TickContext, WorldMut};
use dropbot_tools::{emit as trace_emit, TraceEvent};

use crate::bt::{NodeResult, Task};
use crate::node::CompositeSelector;

/// Selector that can be reached from more than one place in a tree.
pub type SharedSelector<W> = Rc<RefCell<CompositeSelector<W>>>;

/// A root selector plus a registry of named selectors that tasks can re-run.
///
/// One tree instance belongs to one agent; the same shape is rebuilt per agent so that service
/// timers and task deadlines are never shared.
pub struct Tree<W>
where
    W: WorldMut + 'static,
{
    root: CompositeSelector<W>,
    registry: BTreeMap<String, SharedSelector<W>>,
}

impl<W> Tree<W>
where
    W: WorldMut + 'static,
{
    pub fn new(root: CompositeSelector<W>) -> Self {
        Self {
            root,
            registry: BTreeMap::new(),
        }
    }

    /// Register `selector` under its own name. A later registration with the same name replaces
    /// the earlier entry; handles already given out keep pointing at the old selector.
    pub fn register(&mut self, selector: CompositeSelector<W>) -> SharedSelector<W> {
        let name = selector.name().to_owned();
        let shared = Rc::new(RefCell::new(selector));
        self.registry.insert(name, Rc::clone(&shared));
        shared
    }

    pub fn find_selector(&self, name: &str) -> Option<SharedSelector<W>> {
        self.registry.get(name).cloned()
    }

    pub fn registered_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.registry.keys().map(String::as_str)
    }

    pub fn root(&self) -> &CompositeSelector<W> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut CompositeSelector<W> {
        &mut self.root
    }

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult {
        self.root.tick(ctx, agent, world, blackboard)
    }
}

/// Task that ticks a registered selector and returns its result.
///
/// A selector that is already being ticked further up the stack (a branch re-running itself)
/// yields `Failed` instead of recursing.
pub struct RunSelector<W>
where
    W: WorldMut + 'static,
{
    selector: SharedSelector<W>,
}

impl<W> RunSelector<W>
where
    W: WorldMut + 'static,
{
    pub fn new(selector: SharedSelector<W>) -> Self {
        Self { selector }
    }

    /// Look up `name` in the tree's registry.
    pub fn named(tree: &Tree<W>, name: &str) -> Option<Self> {
        tree.find_selector(name).map(Self::new)
    }
}

impl<W> Task<W> for RunSelector<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> NodeResult {
        let Ok(mut selector) = self.selector.try_borrow_mut() else {
            trace_emit(blackboard, TraceEvent::new(ctx.tick, "bt.run_selector.reentrant"));
            return NodeResult::Failed;
        };
        selector.tick(ctx, agent, world, blackboard)
    }
}

use std::rc::Rc;

use dropbot_bt::{CompositeSelector, Node, NodeResult, RunSelector, Tree};
use dropbot_core::{Blackboard, TickContext, WorldMut, WorldView};
use dropbot_tools::{TraceLog, TRACE_LOG};

#[derive(Debug, Default)]
struct RecordingWorld {
    ticked: Vec<&'static str>,
}

impl WorldView for RecordingWorld {
    type Agent = u64;
}

impl WorldMut for RecordingWorld {}

fn recorder(name: &'static str, result: NodeResult) -> Node<RecordingWorld> {
    Node::<RecordingWorld>::task_fn(name, move |_ctx, _agent, world: &mut RecordingWorld, _bb| {
        world.ticked.push(name);
        result
    })
}

#[test]
fn run_selector_reuses_a_registered_branch() {
    let mut tree = Tree::new(CompositeSelector::new("Root"));
    tree.register(
        CompositeSelector::new("Transport").with_child(recorder("jump", NodeResult::InProgress)),
    );
    assert_eq!(tree.registered_names().collect::<Vec<_>>(), vec!["Transport"]);

    let run = RunSelector::named(&tree, "Transport").expect("registered");
    tree.root_mut().add_child(Node::task("Run Transport", run));

    let mut world = RecordingWorld::default();
    let mut bb = Blackboard::new();
    let ctx = TickContext::fixed_step(0, 0.1, 0);
    assert_eq!(tree.tick(&ctx, 1, &mut world, &mut bb), NodeResult::InProgress);
    assert_eq!(world.ticked, vec!["jump"]);
}

#[test]
fn unknown_selector_name_is_none() {
    let tree: Tree<RecordingWorld> = Tree::new(CompositeSelector::new("Root"));
    assert!(tree.find_selector("Missing").is_none());
    assert!(RunSelector::named(&tree, "Missing").is_none());
}

#[test]
fn branch_re_running_itself_fails_instead_of_recursing() {
    let mut tree = Tree::new(CompositeSelector::new("Root"));
    let looping = tree.register(CompositeSelector::new("Loop"));
    looping
        .borrow_mut()
        .add_child(Node::task("again", RunSelector::new(Rc::clone(&looping))));
    looping
        .borrow_mut()
        .add_child(recorder("fallback", NodeResult::Succeeded));
    tree.root_mut()
        .add_child(Node::task("Run Loop", RunSelector::new(Rc::clone(&looping))));

    let mut world = RecordingWorld::default();
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());
    let ctx = TickContext::fixed_step(3, 0.1, 0);

    assert_eq!(tree.tick(&ctx, 1, &mut world, &mut bb), NodeResult::Succeeded);
    assert_eq!(world.ticked, vec!["fallback"]);
    let log = bb.get(TRACE_LOG).expect("trace log");
    assert_eq!(log.count("bt.run_selector.reentrant"), 1);
}

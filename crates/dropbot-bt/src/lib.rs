//! Priority behavior-tree runtime built on `dropbot-core`.
//!
//! A tree is a root [`CompositeSelector`] whose children are guarded by [`Decorator`]s and
//! whose branches carry interval-gated [`Service`]s. Selectors re-evaluate from their first
//! child every tick, so a higher-priority child that becomes eligible preempts whatever was
//! in progress below it. Preempted tasks are simply not ticked again; there is no cancel
//! callback, and tasks must tolerate being abandoned mid-flight.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod decorator;
pub mod node;
pub mod service;
pub mod tasks;
pub mod tree;

pub use bt::{NodeResult, Task, TaskFn};
pub use decorator::{CompareOp, Decorator, SetKey};
pub use node::{CompositeSelector, Node, TaskNode};
pub use service::{Service, ServiceBody, ServiceFn};
pub use tasks::Wait;
pub use tree::{RunSelector, SharedSelector, Tree};

//! Decision-trace tooling for dropbot behavior trees.
//!
//! Traces are recorded per agent through its blackboard, so nothing is collected unless the host
//! opts in by inserting a [`TraceLog`] or a [`TraceSink`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{emit, TraceEvent, TraceLog, TraceSink, TRACE_LOG, TRACE_SINK};

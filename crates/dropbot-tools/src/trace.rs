#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use dropbot_core::{BbKey, Blackboard};

/// One scheduling decision, tagged with the tick it happened on.
///
/// Tags are dotted paths (`bt.service.fire`, `bot.phase.falling`); `a` and `b` carry
/// tag-specific numeric payloads such as a child index or a distance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            a: 0,
            b: 0,
        }
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.tag == tag).count()
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }

    pub fn last(&self, tag: &str) -> Option<&TraceEvent> {
        self.events.iter().rev().find(|e| e.tag == tag)
    }
}

/// Blackboard key for collecting events in-memory.
pub const TRACE_LOG: BbKey<TraceLog> = BbKey::new("dropbot.trace.log");
/// Blackboard key for streaming events into a host-provided sink.
pub const TRACE_SINK: BbKey<Box<dyn TraceSink>> = BbKey::new("dropbot.trace.sink");

pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(log) = blackboard.get_mut(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.get_mut(TRACE_SINK) {
        sink.emit(event);
    }
}

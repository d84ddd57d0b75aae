use std::borrow::Cow;

use dropbot_core::{Blackboard, DeterministicRng, TickContext, WorldMut};
use dropbot_tools::{emit as trace_emit, TraceEvent};

/// Side effect run by a [`Service`] when its interval has elapsed.
pub trait ServiceBody<W>: 'static
where
    W: WorldMut + 'static,
{
    fn fire(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    );
}

/// Service body backed by a closure.
pub struct ServiceFn<F> {
    f: F,
}

impl<F> ServiceFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, W> ServiceBody<W> for ServiceFn<F>
where
    F: FnMut(&TickContext, W::Agent, &mut W, &mut Blackboard) + 'static,
    W: WorldMut + 'static,
{
    fn fire(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        (self.f)(ctx, agent, world, blackboard)
    }
}

/// Interval-gated side effect attached to one selector.
///
/// The owning selector offers the service a chance to run on every tick where the branch
/// produced a non-failed result; the body runs when at least `interval` seconds have passed
/// since the last run. A fresh service fires on its first offer, or `jitter` seconds after it
/// when built with [`Service::with_jitter`].
pub struct Service<W>
where
    W: WorldMut + 'static,
{
    name: Cow<'static, str>,
    interval: f64,
    initial_delay: f64,
    last_fire: Option<f64>,
    fire_count: u64,
    body: Box<dyn ServiceBody<W>>,
}

impl<W> Service<W>
where
    W: WorldMut + 'static,
{
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        interval_seconds: f64,
        body: impl ServiceBody<W>,
    ) -> Self {
        let interval = interval_seconds.max(0.0);
        Self {
            name: name.into(),
            interval,
            initial_delay: 0.0,
            last_fire: None,
            fire_count: 0,
            body: Box::new(body),
        }
    }

    pub fn from_fn(
        name: impl Into<Cow<'static, str>>,
        interval_seconds: f64,
        f: impl FnMut(&TickContext, W::Agent, &mut W, &mut Blackboard) + 'static,
    ) -> Self {
        Self::new(name, interval_seconds, ServiceFn::new(f))
    }

    /// Delay the first run by a uniform offset in `[0, max_jitter)` so that many agents built
    /// from the same tree don't all fire on the same tick. The offset never exceeds the interval.
    pub fn with_jitter(self, rng: &mut impl DeterministicRng, max_jitter: f64) -> Self {
        let jitter = rng.range_f64(0.0, max_jitter.min(self.interval));
        self.with_initial_delay(jitter)
    }

    /// Delay the first run by exactly `seconds` after the first offer (capped at the interval).
    pub fn with_initial_delay(mut self, seconds: f64) -> Self {
        self.initial_delay = seconds.clamp(0.0, self.interval);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn initial_delay(&self) -> f64 {
        self.initial_delay
    }

    /// Time of the last run, once the service has been offered at least once.
    pub fn last_fire(&self) -> Option<f64> {
        self.last_fire
    }

    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// Run the body if due. Returns whether it ran.
    pub fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> bool {
        let now = ctx.now_seconds;
        let interval = self.interval;
        let delay = self.initial_delay;
        let last = *self.last_fire.get_or_insert(now - interval + delay);
        if now < last {
            // Clock went backward: re-anchor instead of waiting out a bogus gap.
            self.last_fire = Some(now);
            trace_emit(blackboard, TraceEvent::new(ctx.tick, "bt.service.clock_reset"));
            return false;
        }
        if now - last < interval {
            return false;
        }

        self.body.fire(ctx, agent, world, blackboard);
        self.last_fire = Some(now);
        self.fire_count += 1;
        trace_emit(
            blackboard,
            TraceEvent::new(ctx.tick, "bt.service.fire").with_a(self.fire_count),
        );
        true
    }
}

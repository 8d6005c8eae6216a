use std::time::{Duration, Instant};

use crate::api::game::SchedulerConfig;

/// What the driver should do on the tick that was just planned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickPlan {
    /// Milliseconds to hand to the game loop (capped, then scaled by speed).
    pub delta_ms: f32,
    /// False on frames dropped by the frame-skip divisor.
    pub run_logic: bool,
    /// 1-based tick counter since the last reset.
    pub frame: u64,
}

/// Pacing policy for a periodic driver.
///
/// Measured wall-clock deltas are capped (after a stall the game slows down
/// instead of jumping ahead), scaled by a global speed multiplier, and only
/// every `frame_skip`-th tick runs logic. The delay before the next tick is
/// the interval minus what the tick cost, floored so a slow tick can never
/// schedule the next one at zero or in the past.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    max_delta_ms: f32,
    speed: f32,
    frame_skip: u32,
    min_delay: Duration,
    frame: u64,
    last_tick: Option<Instant>,
}

impl FramePacer {
    /// Pacer running at `hz` ticks per second with the config's policy.
    pub fn new(hz: f32, config: &SchedulerConfig) -> Self {
        let hz = if hz > 0.0 { hz } else { 1.0 };
        Self {
            interval: Duration::from_nanos((1e9 / f64::from(hz)).round() as u64),
            max_delta_ms: config.max_delta_ms,
            speed: config.speed.max(0.0),
            frame_skip: config.frame_skip.max(1),
            min_delay: Duration::from_millis(config.min_delay_ms.max(1)),
            frame: 0,
            last_tick: None,
        }
    }

    /// Logic-rate pacer.
    pub fn logic(config: &SchedulerConfig) -> Self {
        Self::new(config.logic_hz, config)
    }

    /// Render-rate pacer; redraws are never slowed or skipped.
    pub fn render(config: &SchedulerConfig) -> Self {
        let plain = SchedulerConfig {
            speed: 1.0,
            frame_skip: 1,
            ..config.clone()
        };
        Self::new(config.render_hz, &plain)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn interval_ms(&self) -> f32 {
        self.interval.as_secs_f32() * 1000.0
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn frame_skip(&self) -> u32 {
        self.frame_skip
    }

    /// Run logic on one tick out of every `n` (0 is treated as 1).
    pub fn set_frame_skip(&mut self, n: u32) {
        self.frame_skip = n.max(1);
    }

    /// Forget the previous tick so the next delta is one nominal interval.
    pub fn reset(&mut self) {
        self.last_tick = None;
        self.frame = 0;
    }

    /// Plan the tick starting at `now`.
    pub fn begin_tick(&mut self, now: Instant) -> TickPlan {
        let since_last = self.last_tick.map(|last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.plan(since_last)
    }

    /// Plan a tick given the wall-clock time since the previous one
    /// (`None` on the first tick).
    pub fn plan(&mut self, since_last: Option<Duration>) -> TickPlan {
        let measured_ms = since_last
            .map(|d| d.as_secs_f32() * 1000.0)
            .unwrap_or_else(|| self.interval_ms());
        self.frame += 1;
        TickPlan {
            delta_ms: measured_ms.min(self.max_delta_ms) * self.speed,
            run_logic: self.frame % u64::from(self.frame_skip) == 0,
            frame: self.frame,
        }
    }

    /// Delay before the next tick, given how long this one took.
    pub fn next_delay(&self, tick_cost: Duration) -> Duration {
        self.interval.saturating_sub(tick_cost).max(self.min_delay)
    }
}

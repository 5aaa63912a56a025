//! Simulation clock: Idle -> Running -> Ended
//!
//! The periodic timer only exists while the clock is Running. It is created on
//! `start`/`reset` and dropped on `end`, so no exit path can leave it ticking.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_CATCHUP_TICKS;

/// Lifecycle phase of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockPhase {
    /// Created, not started yet
    Idle,
    /// Accepting ticks and gestures
    Running,
    /// Game over or stopped; terminal until reset
    Ended,
}

/// Fixed-period tick timer fed with host frame deltas
#[derive(Debug)]
pub struct TickTimer {
    period: f32,
    accumulator: f32,
}

impl TickTimer {
    fn new(period: f32) -> Self {
        log::debug!("Tick timer acquired ({} ms period)", (period * 1000.0).round());
        Self {
            period,
            accumulator: 0.0,
        }
    }

    /// Whole ticks due after `dt` more seconds, at most `MAX_CATCHUP_TICKS`
    fn due(&mut self, dt: f32) -> u32 {
        if !(dt.is_finite() && dt > 0.0) {
            return 0;
        }
        self.accumulator += dt;

        let mut ticks = 0;
        while self.accumulator >= self.period && ticks < MAX_CATCHUP_TICKS {
            self.accumulator -= self.period;
            ticks += 1;
        }
        // Drop backlog beyond the cap instead of spiralling
        if ticks == MAX_CATCHUP_TICKS {
            self.accumulator = self.accumulator.min(self.period);
        }
        ticks
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        log::debug!("Tick timer released");
    }
}

/// Lifecycle state machine plus the optional periodic timer
#[derive(Debug)]
pub struct SimClock {
    phase: ClockPhase,
    /// `None` for interaction-only games
    period: Option<f32>,
    timer: Option<TickTimer>,
    ticks: u64,
}

impl SimClock {
    /// Clock with a fixed tick period in seconds
    pub fn periodic(period: f32) -> Self {
        Self {
            phase: ClockPhase::Idle,
            period: Some(period),
            timer: None,
            ticks: 0,
        }
    }

    /// Clock with no autonomous tick
    pub fn manual() -> Self {
        Self {
            phase: ClockPhase::Idle,
            period: None,
            timer: None,
            ticks: 0,
        }
    }

    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    /// Whether a periodic timer is currently held
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Ticks completed since the last start/reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Idle -> Running. Returns false if the clock was not Idle.
    pub fn start(&mut self) -> bool {
        if self.phase != ClockPhase::Idle {
            return false;
        }
        self.run();
        true
    }

    /// Any phase -> Running with a fresh timer
    pub fn reset(&mut self) {
        self.timer = None;
        self.run();
    }

    /// Idle/Running -> Ended, releasing the timer. Returns false if already Ended.
    pub fn end(&mut self) -> bool {
        self.timer = None;
        if self.phase == ClockPhase::Ended {
            return false;
        }
        self.phase = ClockPhase::Ended;
        true
    }

    /// Feed elapsed host time; returns the number of ticks to simulate
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.phase != ClockPhase::Running {
            return 0;
        }
        let ticks = self.timer.as_mut().map_or(0, |timer| timer.due(dt));
        self.ticks += ticks as u64;
        ticks
    }

    fn run(&mut self) {
        self.phase = ClockPhase::Running;
        self.ticks = 0;
        self.timer = self.period.map(TickTimer::new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut clock = SimClock::periodic(0.1);
        assert_eq!(clock.phase(), ClockPhase::Idle);
        assert!(!clock.has_timer());
        assert_eq!(clock.advance(1.0), 0);

        assert!(clock.start());
        assert!(clock.is_running());
        assert!(clock.has_timer());
        assert!(!clock.start());

        assert!(clock.end());
        assert_eq!(clock.phase(), ClockPhase::Ended);
        assert!(!clock.has_timer());
        assert!(!clock.end());
        assert_eq!(clock.advance(1.0), 0);

        // Ended is terminal until reset
        assert!(!clock.start());
        clock.reset();
        assert!(clock.is_running());
        assert!(clock.has_timer());
    }

    #[test]
    fn test_fixed_period_ticks() {
        let mut clock = SimClock::periodic(0.1);
        clock.start();
        assert_eq!(clock.advance(0.05), 0);
        assert_eq!(clock.advance(0.06), 1);
        assert_eq!(clock.advance(0.25), 2);
        assert_eq!(clock.ticks(), 3);
    }

    #[test]
    fn test_catchup_is_capped() {
        let mut clock = SimClock::periodic(0.1);
        clock.start();
        assert_eq!(clock.advance(10.0), MAX_CATCHUP_TICKS);
        // Backlog was discarded, at most one more period carried over
        assert!(clock.advance(0.0001) <= 1);
    }

    #[test]
    fn test_bad_deltas_ignored() {
        let mut clock = SimClock::periodic(0.1);
        clock.start();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f32::NAN), 0);
        assert_eq!(clock.advance(0.1), 1);
    }

    #[test]
    fn test_manual_clock_never_ticks() {
        let mut clock = SimClock::manual();
        clock.start();
        assert!(clock.is_running());
        assert!(!clock.has_timer());
        assert_eq!(clock.advance(5.0), 0);
    }

    #[test]
    fn test_reset_restarts_count() {
        let mut clock = SimClock::periodic(0.1);
        clock.start();
        clock.advance(0.35);
        clock.end();
        clock.reset();
        assert_eq!(clock.ticks(), 0);
        assert_eq!(clock.advance(0.1), 1);
    }
}

//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads or read the clock itself - the caller passes the
//! current time (epoch milliseconds) to every command and calls `tick()`
//! periodically.
//!
//! Remaining time is tracked in *simulated* milliseconds. Real elapsed time
//! is multiplied by the [`Pace`] speedup before it is subtracted, so fast
//! mode shares every code path with a real-time run.
//!
//! ## State Transitions
//!
//! ```text
//! Pending -> Running(i) -> (Paused -> Running(i))* -> Running(i+1) ... -> Complete
//! ```
//!
//! With `auto_advance` off, a finished interval parks the engine in
//! `Pending` on the next interval until `start()` is called again.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pace::Pace;
use super::schedule::{Interval, Schedule};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Pending,
    Running,
    Paused,
    Complete,
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    schedule: Schedule,
    pace: Pace,
    auto_advance: bool,
    state: TimerState,
    index: usize,
    /// Simulated milliseconds left in the current interval.
    remaining_ms: u64,
    /// Epoch ms of the last flush while running.
    last_tick_ms: Option<u64>,
}

impl TimerEngine {
    /// Create a new timer engine with the given schedule.
    ///
    /// Starts in the `Pending` state with the first interval ready.
    pub fn new(schedule: Schedule, pace: Pace) -> Self {
        let remaining_ms = schedule.get(0).map(Interval::duration_ms).unwrap_or(0);
        Self {
            schedule,
            pace,
            auto_advance: true,
            state: TimerState::Pending,
            index: 0,
            remaining_ms,
            last_tick_ms: None,
        }
    }

    /// Whether a finished interval immediately starts the next one.
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pace(&self) -> Pace {
        self.pace
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn current(&self) -> Option<&Interval> {
        if self.state == TimerState::Complete {
            return None;
        }
        self.schedule.get(self.index)
    }

    /// Simulated milliseconds left in the current interval.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Wall-clock milliseconds left in the current interval.
    pub fn remaining_real_ms(&self) -> u64 {
        self.pace.real_ms(self.remaining_ms)
    }

    pub fn total_ms(&self) -> u64 {
        self.current().map(Interval::duration_ms).unwrap_or(0)
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn step_progress(&self) -> f64 {
        let total = self.total_ms();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / total as f64)
    }

    /// 0.0 .. 100.0 progress across the entire schedule.
    pub fn schedule_progress_pct(&self) -> f64 {
        if self.state == TimerState::Complete {
            return 100.0;
        }
        let total_min = self.schedule.total_duration_min() as f64;
        if total_min == 0.0 {
            return 0.0;
        }
        let completed_min = self.schedule.cumulative_min(self.index) as f64;
        let current_min = self
            .current()
            .map(|i| f64::from(i.duration_min))
            .unwrap_or(0.0);
        let current_elapsed_min = current_min * self.step_progress();
        ((completed_min + current_elapsed_min) / total_min * 100.0).min(100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let current = self.current();
        Event::StateSnapshot {
            state: self.state,
            index: self.index,
            kind: current.map(|i| i.kind),
            label: current.map(|i| i.label.clone()).unwrap_or_default(),
            remaining_ms: self.remaining_ms,
            total_ms: self.total_ms(),
            schedule_progress_pct: self.schedule_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the pending interval or resume a paused one.
    pub fn start(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            TimerState::Pending => {
                let interval = self.schedule.get(self.index)?;
                let event = Event::IntervalStarted {
                    index: self.index,
                    kind: interval.kind,
                    label: interval.label.clone(),
                    duration_min: interval.duration_min,
                    at: Utc::now(),
                };
                self.state = TimerState::Running;
                self.last_tick_ms = Some(now_ms);
                debug!(index = self.index, "interval started");
                Some(event)
            }
            TimerState::Paused => {
                self.state = TimerState::Running;
                self.last_tick_ms = Some(now_ms);
                Some(Event::IntervalResumed {
                    index: self.index,
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            TimerState::Running | TimerState::Complete => None,
        }
    }

    pub fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        // Flush elapsed time first.
        self.flush_elapsed(now_ms);
        self.state = TimerState::Paused;
        self.last_tick_ms = None;
        Some(Event::IntervalPaused {
            index: self.index,
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Pause when running, otherwise start or resume.
    pub fn toggle(&mut self, now_ms: u64) -> Option<Event> {
        if self.state == TimerState::Running {
            self.pause(now_ms)
        } else {
            self.start(now_ms)
        }
    }

    /// Abandon the current interval. The next one is left `Pending`.
    pub fn skip(&mut self) -> Option<Event> {
        if self.state == TimerState::Complete {
            return None;
        }
        let from = self.index;
        self.last_tick_ms = None;
        let to_index = if self.advance() {
            self.state = TimerState::Pending;
            Some(self.index)
        } else {
            self.state = TimerState::Complete;
            None
        };
        Some(Event::IntervalSkipped {
            from_index: from,
            to_index,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Pending;
        self.index = 0;
        self.last_tick_ms = None;
        self.remaining_ms = self.schedule.get(0).map(Interval::duration_ms).unwrap_or(0);
        Some(Event::SessionReset { at: Utc::now() })
    }

    /// Call periodically while running.
    ///
    /// Returns `IntervalCompleted` when the current interval runs out,
    /// followed by `IntervalStarted` for the next one (auto-advance) or
    /// `SessionCompleted` after the last.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != TimerState::Running {
            return events;
        }
        self.flush_elapsed(now_ms);
        if self.remaining_ms > 0 {
            return events;
        }

        let finished = self.index;
        if let Some(interval) = self.schedule.get(finished) {
            events.push(Event::IntervalCompleted {
                index: finished,
                kind: interval.kind,
                at: Utc::now(),
            });
        }
        debug!(index = finished, "interval completed");

        self.last_tick_ms = None;
        if self.advance() {
            self.state = TimerState::Pending;
            if self.auto_advance {
                events.extend(self.start(now_ms));
            }
        } else {
            self.state = TimerState::Complete;
            events.push(Event::SessionCompleted {
                intervals: self.schedule.len(),
                total_min: self.schedule.total_duration_min(),
                at: Utc::now(),
            });
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_ms: u64) {
        if let Some(last) = self.last_tick_ms {
            let elapsed = now_ms.saturating_sub(last);
            let simulated = elapsed.saturating_mul(self.pace.speedup());
            self.remaining_ms = self.remaining_ms.saturating_sub(simulated);
            self.last_tick_ms = Some(now_ms);
        }
    }

    /// Move to the next interval. Returns false when there is none.
    fn advance(&mut self) -> bool {
        match self.schedule.get(self.index + 1) {
            Some(next) => {
                self.remaining_ms = next.duration_ms();
                self.index += 1;
                true
            }
            None => {
                self.remaining_ms = 0;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::schedule::{build_schedule, IntervalKind};

    fn engine(pace: Pace) -> TimerEngine {
        TimerEngine::new(build_schedule(2, 1, 1, 1).unwrap(), pace)
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = engine(Pace::RealTime);
        assert_eq!(engine.state(), TimerState::Pending);

        assert!(engine.start(0).is_some());
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.start(0).is_none());

        assert!(engine.pause(10_000).is_some());
        assert_eq!(engine.state(), TimerState::Paused);
        assert_eq!(engine.remaining_ms(), 50_000);

        // Time spent paused does not count.
        assert!(matches!(
            engine.start(40_000),
            Some(Event::IntervalResumed { remaining_ms: 50_000, .. })
        ));
        assert!(engine.tick(45_000).is_empty());
        assert_eq!(engine.remaining_ms(), 45_000);
    }

    #[test]
    fn fast_pace_finishes_one_minute_in_one_second() {
        let mut engine = engine(Pace::Fast);
        engine.start(0);
        assert!(engine.tick(999).is_empty());
        assert_eq!(engine.remaining_real_ms(), 1);

        let events = engine.tick(1_000);
        assert!(matches!(
            events[0],
            Event::IntervalCompleted { index: 0, kind: IntervalKind::Focus, .. }
        ));
        assert!(matches!(events[1], Event::IntervalStarted { index: 1, .. }));
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn last_interval_completes_session() {
        let mut engine = engine(Pace::Fast);
        engine.start(0);
        engine.tick(1_000);
        engine.tick(2_000);
        let events = engine.tick(3_000);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Event::SessionCompleted { intervals: 3, total_min: 3, .. }));
        assert_eq!(engine.state(), TimerState::Complete);
        assert!(engine.current().is_none());
        assert_eq!(engine.schedule_progress_pct(), 100.0);
        assert!(engine.tick(4_000).is_empty());
    }

    #[test]
    fn without_auto_advance_parks_in_pending() {
        let mut engine = engine(Pace::Fast).with_auto_advance(false);
        engine.start(0);
        let events = engine.tick(1_500);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.state(), TimerState::Pending);
        assert_eq!(engine.index(), 1);
        assert_eq!(engine.remaining_ms(), 60_000);
    }

    #[test]
    fn skip_advances_interval() {
        let mut engine = engine(Pace::RealTime);
        assert_eq!(engine.index(), 0);
        engine.skip();
        assert_eq!(engine.index(), 1);
        assert_eq!(engine.state(), TimerState::Pending);
        engine.skip();
        let last = engine.skip();
        assert!(matches!(last, Some(Event::IntervalSkipped { from_index: 2, to_index: None, .. })));
        assert_eq!(engine.state(), TimerState::Complete);
        assert!(engine.skip().is_none());
    }

    #[test]
    fn reset_goes_to_beginning() {
        let mut engine = engine(Pace::RealTime);
        engine.skip();
        engine.skip();
        assert_eq!(engine.index(), 2);
        engine.reset();
        assert_eq!(engine.index(), 0);
        assert_eq!(engine.state(), TimerState::Pending);
        assert_eq!(engine.remaining_ms(), 60_000);
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let mut engine = engine(Pace::RealTime);
        assert!(matches!(engine.toggle(0), Some(Event::IntervalStarted { .. })));
        assert!(matches!(engine.toggle(5), Some(Event::IntervalPaused { .. })));
        assert!(matches!(engine.toggle(6), Some(Event::IntervalResumed { .. })));
    }

    #[test]
    fn progress_tracks_schedule() {
        let mut engine = engine(Pace::RealTime);
        engine.start(0);
        engine.tick(30_000);
        assert!((engine.step_progress() - 0.5).abs() < 1e-9);
        assert!((engine.schedule_progress_pct() - 50.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = engine(Pace::RealTime);
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                index,
                remaining_ms,
                kind,
                ..
            } => {
                assert_eq!(state, TimerState::Pending);
                assert_eq!(index, 0);
                assert_eq!(kind, Some(IntervalKind::Focus));
                assert_eq!(remaining_ms, 60 * 1000);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{IntervalKind, TimerState};

/// Every state change in a session produces an Event.
/// The runner renders them; `--json` prints them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    IntervalStarted {
        index: usize,
        kind: IntervalKind,
        label: String,
        duration_min: u32,
        at: DateTime<Utc>,
    },
    IntervalPaused {
        index: usize,
        /// Simulated milliseconds left.
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    IntervalResumed {
        index: usize,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    IntervalCompleted {
        index: usize,
        kind: IntervalKind,
        at: DateTime<Utc>,
    },
    IntervalSkipped {
        from_index: usize,
        /// `None` when the skipped interval was the last one.
        to_index: Option<usize>,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        intervals: usize,
        total_min: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        index: usize,
        kind: Option<IntervalKind>,
        label: String,
        remaining_ms: u64,
        total_ms: u64,
        schedule_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::IntervalStarted { .. } => "interval_started",
            Event::IntervalPaused { .. } => "interval_paused",
            Event::IntervalResumed { .. } => "interval_resumed",
            Event::IntervalCompleted { .. } => "interval_completed",
            Event::IntervalSkipped { .. } => "interval_skipped",
            Event::SessionReset { .. } => "session_reset",
            Event::SessionCompleted { .. } => "session_completed",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_serialization() {
        let event = Event::IntervalCompleted {
            index: 2,
            kind: IntervalKind::Focus,
            at: Utc::now(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
        assert_eq!(json["kind"], "focus");
        assert_eq!(json["index"], 2);
    }
}

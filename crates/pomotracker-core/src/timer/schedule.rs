//! Interval scheduling.
//!
//! A schedule alternates focus intervals with breaks. Every
//! `long_break_every`-th break (counted by completed focus intervals,
//! 1-based) is a long break; all others are short. No break follows the
//! final focus interval unless `trailing_break` is requested.
//!
//! With `cycles > 1` the block of `pomodoros` focus intervals repeats, and
//! a long break separates consecutive cycles.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ValidationError};

pub const DEFAULT_POMODOROS: u32 = 4;
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
pub const DEFAULT_LONG_BREAK_EVERY: u32 = 4;
pub const DEFAULT_CYCLES: u32 = 1;

/// Upper bound on focus intervals in one schedule, across all cycles.
pub const MAX_POMODOROS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl IntervalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalKind::Focus => "focus",
            IntervalKind::ShortBreak => "short_break",
            IntervalKind::LongBreak => "long_break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, IntervalKind::Focus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub kind: IntervalKind,
    /// Duration in minutes.
    pub duration_min: u32,
    /// Zero-based position in the schedule.
    pub index: usize,
    pub label: String,
}

impl Interval {
    /// Get interval duration in milliseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_min)
            .saturating_mul(60)
            .saturating_mul(1000)
    }

    /// Get interval duration in seconds.
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_min).saturating_mul(60)
    }
}

/// Inputs to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleParams {
    pub pomodoros: u32,
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    /// A long break replaces the short break after every N-th focus.
    pub long_break_every: u32,
    /// Append a long break after the final focus interval.
    pub trailing_break: bool,
    /// How many times the block of `pomodoros` focus intervals repeats.
    pub cycles: u32,
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            pomodoros: DEFAULT_POMODOROS,
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            short_break_minutes: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            long_break_every: DEFAULT_LONG_BREAK_EVERY,
            trailing_break: false,
            cycles: DEFAULT_CYCLES,
        }
    }
}

impl ScheduleParams {
    /// Check every parameter, reporting the first offending one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pomodoros == 0 {
            return Err(ValidationError::ZeroPomodoros);
        }
        for (field, value) in [
            ("focus_minutes", self.focus_minutes),
            ("short_break_minutes", self.short_break_minutes),
            ("long_break_minutes", self.long_break_minutes),
        ] {
            if value == 0 {
                return Err(ValidationError::NonPositiveDuration { field });
            }
        }
        if self.long_break_every == 0 {
            return Err(ValidationError::ZeroLongBreakEvery);
        }
        if self.cycles == 0 {
            return Err(ValidationError::ZeroCycles);
        }
        let requested = u64::from(self.pomodoros) * u64::from(self.cycles);
        if requested > u64::from(MAX_POMODOROS) {
            return Err(ValidationError::TooManyPomodoros {
                requested,
                max: MAX_POMODOROS,
            });
        }
        Ok(())
    }
}

/// An ordered, immutable sequence of intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    intervals: Vec<Interval>,
}

impl Schedule {
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn focus_count(&self) -> usize {
        self.intervals
            .iter()
            .filter(|i| i.kind == IntervalKind::Focus)
            .count()
    }

    pub fn break_count(&self) -> usize {
        self.intervals.len() - self.focus_count()
    }

    pub fn total_duration_min(&self) -> u64 {
        self.intervals.iter().map(|i| u64::from(i.duration_min)).sum()
    }

    pub fn total_secs(&self) -> u64 {
        self.intervals.iter().map(Interval::duration_secs).sum()
    }

    /// Cumulative minutes completed up to (but not including) `index`.
    pub fn cumulative_min(&self, index: usize) -> u64 {
        self.intervals
            .iter()
            .take(index)
            .map(|i| u64::from(i.duration_min))
            .sum()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

/// Build the standard schedule: long break every fourth focus, no trailing
/// break.
///
/// # Errors
///
/// Returns `CoreError::InvalidConfiguration` if any argument is zero or
/// `pomodoros` exceeds [`MAX_POMODOROS`].
pub fn build_schedule(
    pomodoros: u32,
    focus_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
) -> Result<Schedule> {
    build_schedule_with(&ScheduleParams {
        pomodoros,
        focus_minutes,
        short_break_minutes,
        long_break_minutes,
        ..ScheduleParams::default()
    })
}

/// Build a schedule from the full parameter set.
///
/// # Errors
///
/// Returns `CoreError::InvalidConfiguration` if `params` fails validation.
pub fn build_schedule_with(params: &ScheduleParams) -> Result<Schedule> {
    params.validate()?;

    // Bounded by MAX_POMODOROS after validation.
    let capacity = (params.pomodoros * params.cycles) as usize * 2;
    let mut intervals: Vec<Interval> = Vec::with_capacity(capacity);
    let mut push = |kind: IntervalKind, duration_min: u32, label: String| {
        let index = intervals.len();
        intervals.push(Interval {
            kind,
            duration_min,
            index,
            label,
        });
    };

    for cycle in 1..=params.cycles {
        let last_cycle = cycle == params.cycles;
        for k in 1..=params.pomodoros {
            push(
                IntervalKind::Focus,
                params.focus_minutes,
                format!("Focus {k}"),
            );

            if k == params.pomodoros {
                if !last_cycle || params.trailing_break {
                    push(
                        IntervalKind::LongBreak,
                        params.long_break_minutes,
                        "Long break".into(),
                    );
                }
            } else if k % params.long_break_every == 0 {
                push(
                    IntervalKind::LongBreak,
                    params.long_break_minutes,
                    "Long break".into(),
                );
            } else {
                push(
                    IntervalKind::ShortBreak,
                    params.short_break_minutes,
                    format!("Short break {k}"),
                );
            }
        }
    }

    debug!(
        pomodoros = params.pomodoros,
        cycles = params.cycles,
        intervals = intervals.len(),
        "built schedule"
    );
    Ok(Schedule { intervals })
}

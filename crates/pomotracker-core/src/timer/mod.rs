mod engine;
mod pace;
mod schedule;

pub use engine::{TimerEngine, TimerState};
pub use pace::Pace;
pub use schedule::{
    build_schedule, build_schedule_with, Interval, IntervalKind, Schedule, ScheduleParams,
    DEFAULT_CYCLES, DEFAULT_FOCUS_MINUTES, DEFAULT_LONG_BREAK_EVERY, DEFAULT_LONG_BREAK_MINUTES,
    DEFAULT_POMODOROS, DEFAULT_SHORT_BREAK_MINUTES, MAX_POMODOROS,
};

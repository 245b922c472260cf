//! # pomotracker Core Library
//!
//! Core logic for the pomotracker terminal Pomodoro timer. The CLI binary
//! and its dashboard are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Scheduler**: pure functions turning a handful of numbers into an
//!   ordered list of focus and break intervals
//! - **Timer Engine**: a wall-clock-delta state machine; the caller passes
//!   the time and invokes `tick()` for progress
//! - **Runner**: prints a schedule or counts it down on a terminal
//! - **Storage**: TOML defaults file
//!
//! ## Key Components
//!
//! - [`build_schedule`]: the scheduling rule
//! - [`TimerEngine`]: countdown state machine
//! - [`Runner`]: dry-run and live presenter
//! - [`Configuration`]: validated per-invocation settings

pub mod configuration;
pub mod error;
pub mod events;
pub mod runner;
pub mod storage;
pub mod timer;

pub use configuration::{Configuration, ConfigurationBuilder};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use runner::{Clock, RunOptions, RunReport, Runner, SystemClock};
pub use storage::Config;
pub use timer::{
    build_schedule, build_schedule_with, Interval, IntervalKind, Pace, Schedule, ScheduleParams,
    TimerEngine, TimerState, MAX_POMODOROS,
};

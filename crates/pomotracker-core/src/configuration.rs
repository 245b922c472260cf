//! Per-invocation settings.
//!
//! A [`Configuration`] is assembled once (file defaults, then command-line
//! overrides), validated, and handed to the scheduler and runner by
//! reference. It cannot be mutated afterwards.

use serde::Serialize;

use crate::error::Result;
use crate::storage::Config;
use crate::timer::{build_schedule_with, Pace, Schedule, ScheduleParams};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    params: ScheduleParams,
    fast: bool,
    dry_run: bool,
}

impl Configuration {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfiguration` if any schedule parameter
    /// is zero or the schedule would exceed `MAX_POMODOROS`.
    pub fn new(params: ScheduleParams, fast: bool, dry_run: bool) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            fast,
            dry_run,
        })
    }

    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn pomodoros(&self) -> u32 {
        self.params.pomodoros
    }

    pub fn focus_minutes(&self) -> u32 {
        self.params.focus_minutes
    }

    pub fn short_break_minutes(&self) -> u32 {
        self.params.short_break_minutes
    }

    pub fn long_break_minutes(&self) -> u32 {
        self.params.long_break_minutes
    }

    pub fn long_break_every(&self) -> u32 {
        self.params.long_break_every
    }

    pub fn trailing_break(&self) -> bool {
        self.params.trailing_break
    }

    pub fn cycles(&self) -> u32 {
        self.params.cycles
    }

    pub fn fast(&self) -> bool {
        self.fast
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn schedule_params(&self) -> &ScheduleParams {
        &self.params
    }

    pub fn pace(&self) -> Pace {
        Pace::from_fast(self.fast)
    }

    /// Build the schedule these settings describe.
    pub fn schedule(&self) -> Result<Schedule> {
        build_schedule_with(&self.params)
    }
}

/// Collects overrides on top of a base parameter set.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    params: ScheduleParams,
    fast: bool,
    dry_run: bool,
}

impl ConfigurationBuilder {
    /// Start from the schedule section of a config file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            params: config.schedule_params(),
            ..Self::default()
        }
    }

    pub fn pomodoros(mut self, pomodoros: u32) -> Self {
        self.params.pomodoros = pomodoros;
        self
    }

    pub fn focus_minutes(mut self, minutes: u32) -> Self {
        self.params.focus_minutes = minutes;
        self
    }

    pub fn short_break_minutes(mut self, minutes: u32) -> Self {
        self.params.short_break_minutes = minutes;
        self
    }

    pub fn long_break_minutes(mut self, minutes: u32) -> Self {
        self.params.long_break_minutes = minutes;
        self
    }

    pub fn long_break_every(mut self, every: u32) -> Self {
        self.params.long_break_every = every;
        self
    }

    pub fn trailing_break(mut self, trailing_break: bool) -> Self {
        self.params.trailing_break = trailing_break;
        self
    }

    pub fn cycles(mut self, cycles: u32) -> Self {
        self.params.cycles = cycles;
        self
    }

    pub fn fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Result<Configuration> {
        Configuration::new(self.params, self.fast, self.dry_run)
    }
}

pub mod completions;
pub mod config;
pub mod dashboard;
pub mod run;

use clap::Args;
use pomotracker_core::{Config, Configuration, ConfigurationBuilder};

/// Schedule flags shared by the default command and `dashboard`.
///
/// Unset flags fall back to the config file, then to the built-in
/// defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Number of focus sessions to run [default: 4]
    #[arg(long, value_name = "N")]
    pub pomodoros: Option<u32>,
    /// Minutes per focus session [default: 25]
    #[arg(long, value_name = "MINUTES")]
    pub focus_minutes: Option<u32>,
    /// Minutes per short break [default: 5]
    #[arg(long, value_name = "MINUTES")]
    pub short_break_minutes: Option<u32>,
    /// Minutes per long break [default: 15]
    #[arg(long, value_name = "MINUTES")]
    pub long_break_minutes: Option<u32>,
    /// Take a long break after every N-th focus session [default: 4]
    #[arg(long, value_name = "N")]
    pub long_break_every: Option<u32>,
    /// Also take a long break after the final focus session
    #[arg(long, overrides_with = "no_trailing_break")]
    pub trailing_break: bool,
    /// End on the final focus session even if the config file says otherwise
    #[arg(long, overrides_with = "trailing_break")]
    pub no_trailing_break: bool,
    /// Repeat the whole block of pomodoros this many times [default: 1]
    #[arg(long, value_name = "N")]
    pub cycles: Option<u32>,
    /// Treat one real second as one Pomodoro minute (handy for demos)
    #[arg(long)]
    pub fast: bool,
}

impl ScheduleArgs {
    /// Layer these flags over the config file and validate.
    pub fn configuration(
        &self,
        file: &Config,
        dry_run: bool,
    ) -> pomotracker_core::error::Result<Configuration> {
        let mut builder = ConfigurationBuilder::from_config(file)
            .fast(self.fast)
            .dry_run(dry_run);
        if let Some(n) = self.pomodoros {
            builder = builder.pomodoros(n);
        }
        if let Some(m) = self.focus_minutes {
            builder = builder.focus_minutes(m);
        }
        if let Some(m) = self.short_break_minutes {
            builder = builder.short_break_minutes(m);
        }
        if let Some(m) = self.long_break_minutes {
            builder = builder.long_break_minutes(m);
        }
        if let Some(n) = self.long_break_every {
            builder = builder.long_break_every(n);
        }
        if let Some(n) = self.cycles {
            builder = builder.cycles(n);
        }
        if self.trailing_break {
            builder = builder.trailing_break(true);
        } else if self.no_trailing_break {
            builder = builder.trailing_break(false);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_keep_file_values() {
        let mut file = Config::default();
        file.schedule.short_break_minutes = 7;
        file.schedule.trailing_break = true;
        let args = ScheduleArgs {
            focus_minutes: Some(40),
            ..ScheduleArgs::default()
        };
        let cfg = args.configuration(&file, false).unwrap();
        assert_eq!(cfg.focus_minutes(), 40);
        assert_eq!(cfg.short_break_minutes(), 7);
        assert!(cfg.trailing_break());
    }

    #[test]
    fn no_trailing_break_overrides_file() {
        let mut file = Config::default();
        file.schedule.trailing_break = true;
        let args = ScheduleArgs {
            no_trailing_break: true,
            ..ScheduleArgs::default()
        };
        let cfg = args.configuration(&file, false).unwrap();
        assert!(!cfg.trailing_break());
        assert_eq!(cfg.schedule().unwrap().len(), 7);
    }

    #[test]
    fn cycles_flag_overrides_file() {
        let mut file = Config::default();
        file.schedule.cycles = 4;
        let args = ScheduleArgs {
            pomodoros: Some(2),
            cycles: Some(2),
            ..ScheduleArgs::default()
        };
        let cfg = args.configuration(&file, true).unwrap();
        assert_eq!(cfg.cycles(), 2);
        assert_eq!(cfg.schedule().unwrap().focus_count(), 4);
    }

    #[test]
    fn zero_flag_is_rejected() {
        let args = ScheduleArgs {
            pomodoros: Some(0),
            ..ScheduleArgs::default()
        };
        assert!(args.configuration(&Config::default(), true).is_err());
    }
}

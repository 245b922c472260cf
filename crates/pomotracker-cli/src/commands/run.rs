use std::io::Write;

use clap::Args;
use pomotracker_core::{Config, RunOptions, Runner, SystemClock};
use tracing::debug;

use super::ScheduleArgs;

const BANNER: &str = r"
+--------------------------------------+
|   pomotracker  :  focus . rest . go  |
+--------------------------------------+
";

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,
    /// Show the schedule without running timers
    #[arg(long)]
    pub dry_run: bool,
    /// Print JSON (schedule or event stream) instead of the human display
    #[arg(long)]
    pub json: bool,
    /// Skip the banner and settings summary
    #[arg(long)]
    pub no_banner: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = Config::load()?;
    // Validate before anything is printed.
    let cfg = args.schedule.configuration(&file, args.dry_run)?;
    let schedule = cfg.schedule()?;
    debug!(?cfg, "resolved configuration");

    let mut out = std::io::stdout().lock();
    let show_banner = !args.json && !args.no_banner && file.display.banner;
    if show_banner {
        writeln!(out, "{BANNER}")?;
    }

    let mut runner = Runner::new(out, SystemClock::new());
    if show_banner {
        runner.write_summary(&cfg)?;
    }

    let opts = RunOptions {
        json: args.json,
        bell: file.display.bell,
        ..RunOptions::from(&cfg)
    };
    runner.run(&schedule, &opts)?;
    Ok(())
}

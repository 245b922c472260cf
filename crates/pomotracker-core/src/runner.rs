//! Schedule runner.
//!
//! Prints a schedule (dry run) or executes it by driving a [`TimerEngine`]
//! and redrawing a countdown line. The [`Clock`] is the only place the
//! runner blocks; tests substitute a manual clock so no real time passes.

use std::io::Write;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::configuration::Configuration;
use crate::error::Result;
use crate::events::Event;
use crate::timer::{Interval, Pace, Schedule, TimerEngine, TimerState};

/// Time source and sleeper.
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> u64;
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Wall clock backed by `Instant` and `thread::sleep`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub pace: Pace,
    pub dry_run: bool,
    /// Emit JSON instead of the human display.
    pub json: bool,
    /// Ring the terminal bell when an interval ends.
    pub bell: bool,
}

impl From<&Configuration> for RunOptions {
    fn from(cfg: &Configuration) -> Self {
        Self {
            pace: cfg.pace(),
            dry_run: cfg.dry_run(),
            json: false,
            bell: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub final_state: TimerState,
    /// Intervals that were displayed (dry run) or counted down.
    pub intervals_run: usize,
    pub events: Vec<Event>,
    pub real_elapsed_ms: u64,
}

#[derive(Serialize)]
struct PlannedSchedule<'a> {
    intervals: &'a [Interval],
    total_min: u64,
}

pub struct Runner<W, C> {
    out: W,
    clock: C,
}

impl<W: Write, C: Clock> Runner<W, C> {
    pub fn new(out: W, clock: C) -> Self {
        Self { out, clock }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print the parameters a session was built from.
    pub fn write_summary(&mut self, cfg: &Configuration) -> Result<()> {
        writeln!(self.out, "Pomodoros : {}", cfg.pomodoros())?;
        writeln!(self.out, "Focus     : {} minute(s)", cfg.focus_minutes())?;
        writeln!(self.out, "Short br. : {} minute(s)", cfg.short_break_minutes())?;
        writeln!(self.out, "Long br.  : {} minute(s)", cfg.long_break_minutes())?;
        if cfg.cycles() > 1 {
            writeln!(self.out, "Cycles    : {}", cfg.cycles())?;
        }
        if cfg.fast() {
            writeln!(self.out, "Pace      : fast (1 second = 1 minute)")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub fn run(&mut self, schedule: &Schedule, opts: &RunOptions) -> Result<RunReport> {
        if opts.dry_run {
            self.dry_run(schedule, opts)
        } else {
            self.live_run(schedule, opts)
        }
    }

    fn dry_run(&mut self, schedule: &Schedule, opts: &RunOptions) -> Result<RunReport> {
        if opts.json {
            let plan = PlannedSchedule {
                intervals: schedule.intervals(),
                total_min: schedule.total_duration_min(),
            };
            writeln!(self.out, "{}", serde_json::to_string_pretty(&plan)?)?;
        } else {
            writeln!(self.out, "Planned intervals:")?;
            for interval in schedule {
                writeln!(
                    self.out,
                    "{:>3}. {:<16} {:<12} {:>3} minute(s)",
                    interval.index + 1,
                    interval.label,
                    interval.kind.as_str(),
                    interval.duration_min
                )?;
            }
            writeln!(
                self.out,
                "Total: {} minute(s) across {} interval(s)",
                schedule.total_duration_min(),
                schedule.len()
            )?;
        }
        self.out.flush()?;

        Ok(RunReport {
            final_state: TimerState::Complete,
            intervals_run: schedule.len(),
            events: Vec::new(),
            real_elapsed_ms: 0,
        })
    }

    fn live_run(&mut self, schedule: &Schedule, opts: &RunOptions) -> Result<RunReport> {
        let mut engine = TimerEngine::new(schedule.clone(), opts.pace);
        let cadence_ms = opts.pace.tick_interval().as_millis() as u64;
        let started = self.clock.now_ms();
        let mut events = Vec::new();
        let mut intervals_run = 0;

        info!(
            intervals = schedule.len(),
            pace = ?opts.pace,
            "starting session"
        );
        if !opts.json {
            writeln!(self.out, "Press Ctrl+C to exit early. Running timers…")?;
        }

        if let Some(event) = engine.start(started) {
            self.emit(&engine, &event, opts)?;
            events.push(event);
        }

        loop {
            let now = self.clock.now_ms();
            for event in engine.tick(now) {
                if matches!(event, Event::IntervalCompleted { .. }) {
                    intervals_run += 1;
                }
                self.emit(&engine, &event, opts)?;
                events.push(event);
            }
            if engine.state() == TimerState::Complete {
                break;
            }

            if !opts.json {
                self.draw_countdown(engine.remaining_ms())?;
            }
            let wait = cadence_ms.min(engine.remaining_real_ms()).max(1);
            self.clock.sleep(Duration::from_millis(wait));
        }

        let real_elapsed_ms = self.clock.now_ms().saturating_sub(started);
        info!(real_elapsed_ms, "session complete");

        Ok(RunReport {
            final_state: engine.state(),
            intervals_run,
            events,
            real_elapsed_ms,
        })
    }

    fn emit(&mut self, engine: &TimerEngine, event: &Event, opts: &RunOptions) -> Result<()> {
        if opts.json {
            writeln!(self.out, "{}", serde_json::to_string(event)?)?;
            self.out.flush()?;
            return Ok(());
        }

        match event {
            Event::IntervalStarted {
                label,
                duration_min,
                ..
            } => {
                writeln!(self.out, "\n▶ {label} — {duration_min} minute(s)")?;
            }
            Event::IntervalCompleted { .. } => {
                self.draw_countdown(0)?;
                writeln!(self.out, "\n✓ Done!")?;
                if opts.bell {
                    write!(self.out, "\x07")?;
                }
            }
            Event::SessionCompleted {
                intervals,
                total_min,
                ..
            } => {
                writeln!(
                    self.out,
                    "\nSession complete: {intervals} interval(s), {total_min} minute(s)."
                )?;
            }
            _ => {
                debug!(event = event.name(), index = engine.index(), "unrendered event");
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn draw_countdown(&mut self, remaining_ms: u64) -> Result<()> {
        write!(self.out, "\r{} remaining", format_time(remaining_ms.div_ceil(1000)))?;
        self.out.flush()?;
        Ok(())
    }
}

/// `MM:SS`, with minutes allowed to exceed two digits.
pub fn format_time(seconds: u64) -> String {
    let (minutes, remainder) = (seconds / 60, seconds % 60);
    format!("{minutes:02}:{remainder:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::build_schedule;
    use std::cell::Cell;

    /// Clock whose `sleep` advances time instantly.
    #[derive(Default)]
    struct ManualClock {
        now: Cell<u64>,
        sleeps: Cell<usize>,
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.now.set(self.now.get() + duration.as_millis() as u64);
            self.sleeps.set(self.sleeps.get() + 1);
        }
    }

    fn run(schedule: &Schedule, opts: RunOptions) -> (String, RunReport, ManualClock) {
        let clock = ManualClock::default();
        let mut out = Vec::new();
        let report = Runner::new(&mut out, &clock).run(schedule, &opts).unwrap();
        (String::from_utf8(out).unwrap(), report, clock)
    }

    #[test]
    fn format_time_pads() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(25 * 60), "25:00");
        assert_eq!(format_time(120 * 60), "120:00");
    }

    #[test]
    fn dry_run_prints_every_interval_without_sleeping() {
        let schedule = build_schedule(4, 25, 5, 15).unwrap();
        let opts = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };
        let (out, report, clock) = run(&schedule, opts);

        assert_eq!(clock.sleeps.get(), 0);
        assert_eq!(report.final_state, TimerState::Complete);
        assert_eq!(report.intervals_run, 7);
        assert!(out.starts_with("Planned intervals:\n"));
        assert!(out.contains("  1. Focus 1"));
        assert!(out.contains("  7. Focus 4"));
        assert!(!out.contains("long_break"));
        assert!(out.contains("Total: 115 minute(s) across 7 interval(s)"));
    }

    #[test]
    fn dry_run_json_lists_intervals() {
        let schedule = build_schedule(2, 25, 5, 15).unwrap();
        let opts = RunOptions {
            dry_run: true,
            json: true,
            ..RunOptions::default()
        };
        let (out, _, _) = run(&schedule, opts);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["total_min"], 55);
        assert_eq!(json["intervals"][1]["kind"], "short_break");
        assert_eq!(json["intervals"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn live_run_counts_down_in_real_time() {
        let schedule = build_schedule(1, 1, 5, 15).unwrap();
        let (out, report, clock) = run(&schedule, RunOptions::default());

        assert_eq!(clock.now.get(), 60_000);
        assert_eq!(clock.sleeps.get(), 60);
        assert_eq!(report.final_state, TimerState::Complete);
        assert_eq!(report.intervals_run, 1);
        assert!(out.contains("▶ Focus 1 — 1 minute(s)"));
        assert!(out.contains("\r01:00 remaining"));
        assert!(out.contains("\r00:59 remaining"));
        assert!(out.contains("\r00:00 remaining\n✓ Done!"));
        assert!(out.contains("Session complete: 1 interval(s), 1 minute(s)."));
    }

    #[test]
    fn fast_run_takes_one_second_per_minute() {
        let schedule = build_schedule(2, 1, 1, 1).unwrap();
        let opts = RunOptions {
            pace: Pace::Fast,
            ..RunOptions::default()
        };
        let (out, report, clock) = run(&schedule, opts);

        assert_eq!(clock.now.get(), 3_000);
        assert_eq!(report.real_elapsed_ms, 3_000);
        assert_eq!(report.intervals_run, 3);
        assert_eq!(out.matches("✓ Done!").count(), 3);
        assert!(out.contains("▶ Short break 1 — 1 minute(s)"));
    }

    #[test]
    fn json_run_emits_one_event_per_line() {
        let schedule = build_schedule(1, 1, 1, 1).unwrap();
        let opts = RunOptions {
            pace: Pace::Fast,
            json: true,
            ..RunOptions::default()
        };
        let (out, report, _) = run(&schedule, opts);

        let types: Vec<String> = out
            .lines()
            .map(|line| {
                let v: serde_json::Value = serde_json::from_str(line).unwrap();
                v["type"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(
            types,
            vec!["interval_started", "interval_completed", "session_completed"]
        );
        assert_eq!(report.events.len(), 3);
    }

    #[test]
    fn bell_rings_after_each_interval() {
        let schedule = build_schedule(2, 1, 1, 1).unwrap();
        let opts = RunOptions {
            pace: Pace::Fast,
            bell: true,
            ..RunOptions::default()
        };
        let (out, _, _) = run(&schedule, opts);
        assert_eq!(out.matches('\x07').count(), 3);
    }

    #[test]
    fn summary_lists_parameters() {
        let cfg = Configuration::builder().fast(true).build().unwrap();
        let clock = ManualClock::default();
        let mut out = Vec::new();
        Runner::new(&mut out, &clock).write_summary(&cfg).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Pomodoros : 4"));
        assert!(out.contains("Long br.  : 15 minute(s)"));
        assert!(out.contains("fast"));
        assert!(!out.contains("Cycles"));
    }

    #[test]
    fn summary_mentions_repeated_cycles() {
        let cfg = Configuration::builder().cycles(3).build().unwrap();
        let clock = ManualClock::default();
        let mut out = Vec::new();
        Runner::new(&mut out, &clock).write_summary(&cfg).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Cycles    : 3"));
    }
}

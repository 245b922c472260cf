//! Full-screen dashboard over a planned schedule.
//!
//! Each interval waits for the user to start it. Keys: `space` start or
//! pause, `s` skip, `r` reset, `q`/`Esc` quit.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pomotracker_core::runner::format_time;
use pomotracker_core::{
    Clock, Config, Event, IntervalKind, Pace, Schedule, SystemClock, TimerEngine, TimerState,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame, Terminal,
};
use tracing::debug;

use super::ScheduleArgs;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Dashboard state. Rendering reads it; key presses and ticks mutate it.
pub struct DashboardApp {
    engine: TimerEngine,
    bell: bool,
    ring_pending: bool,
    should_quit: bool,
    status: String,
}

impl DashboardApp {
    pub fn new(schedule: Schedule, pace: Pace, bell: bool) -> Self {
        Self {
            engine: TimerEngine::new(schedule, pace).with_auto_advance(false),
            bell,
            ring_pending: false,
            should_quit: false,
            status: "Press space to start".into(),
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn on_key(&mut self, key: KeyEvent, now_ms: u64) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char(' ') => {
                // Catch up before pausing so the paused time is exact. A key
                // press that lands after the interval ran out only reveals
                // the completion; it must not start the next interval.
                if self.catch_up(now_ms) {
                    return;
                }
                if let Some(event) = self.engine.toggle(now_ms) {
                    self.apply(&event);
                }
            }
            KeyCode::Char('s') => {
                if let Some(event) = self.engine.skip() {
                    self.apply(&event);
                }
            }
            KeyCode::Char('r') => {
                if let Some(event) = self.engine.reset() {
                    self.apply(&event);
                }
            }
            _ => {}
        }
    }

    pub fn on_tick(&mut self, now_ms: u64) {
        self.catch_up(now_ms);
    }

    /// Apply elapsed time; true if an interval completed.
    fn catch_up(&mut self, now_ms: u64) -> bool {
        let mut completed = false;
        for event in self.engine.tick(now_ms) {
            completed |= matches!(event, Event::IntervalCompleted { .. });
            self.apply(&event);
        }
        completed
    }

    /// Whether the bell should ring; clears the request.
    pub fn take_ring(&mut self) -> bool {
        std::mem::take(&mut self.ring_pending)
    }

    fn apply(&mut self, event: &Event) {
        debug!(event = event.name(), "dashboard event");
        self.status = match event {
            Event::IntervalStarted { label, .. } => format!("▶ {label}"),
            Event::IntervalPaused { .. } => "Paused".into(),
            Event::IntervalResumed { .. } => "Resumed".into(),
            Event::IntervalCompleted { index, .. } => {
                self.ring_pending = self.bell;
                let label = self
                    .engine
                    .schedule()
                    .get(*index)
                    .map(|i| i.label.as_str())
                    .unwrap_or_default();
                format!("✓ {label} complete. Press space for the next interval")
            }
            Event::IntervalSkipped { to_index: None, .. } => "Skipped the last interval".into(),
            Event::IntervalSkipped { .. } => "Skipped".into(),
            Event::SessionReset { .. } => "Reset. Press space to start".into(),
            Event::SessionCompleted { .. } => "Session complete!".into(),
            Event::StateSnapshot { .. } => return,
        };
    }
}

fn kind_color(kind: IntervalKind) -> Color {
    match kind {
        IntervalKind::Focus => Color::Red,
        IntervalKind::ShortBreak => Color::Green,
        IntervalKind::LongBreak => Color::Cyan,
    }
}

/// Render the UI from current state
pub fn render(f: &mut Frame, app: &DashboardApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(8),    // Main content
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let title = Paragraph::new("Pomodoro Dashboard")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_plan(f, main[0], app);
    render_timer(f, main[1], app);

    let help = Paragraph::new("space: start/pause   s: skip   r: reset   q: quit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_plan(f: &mut Frame, area: Rect, app: &DashboardApp) {
    let engine = app.engine();
    let items: Vec<ListItem> = engine
        .schedule()
        .iter()
        .map(|interval| {
            let done = engine.state() == TimerState::Complete || interval.index < engine.index();
            let current = engine.state() != TimerState::Complete && interval.index == engine.index();
            let marker = if done {
                "✓"
            } else if current {
                "▶"
            } else {
                " "
            };
            let mut style = Style::default().fg(kind_color(interval.kind));
            if current {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            } else if done {
                style = style.add_modifier(Modifier::DIM);
            }
            ListItem::new(Line::from(vec![
                Span::raw(format!("{marker} ")),
                Span::styled(
                    format!("{}: {} min", interval.label, interval.duration_min),
                    style,
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Planned intervals"),
    );
    f.render_widget(list, area);
}

fn render_timer(f: &mut Frame, area: Rect, app: &DashboardApp) {
    let engine = app.engine();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    let (heading, color) = match engine.current() {
        Some(interval) => (interval.label.clone(), kind_color(interval.kind)),
        None => ("All done".to_string(), Color::Yellow),
    };
    let clock = format_time(engine.remaining_ms().div_ceil(1000));
    let state = match engine.state() {
        TimerState::Pending => "ready",
        TimerState::Running => "running",
        TimerState::Paused => "paused",
        TimerState::Complete => "complete",
    };
    let timer = Paragraph::new(vec![
        Line::from(Span::styled(
            heading,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            clock,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("[{state}] {}", app.status())),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Timer"));
    f.render_widget(timer, chunks[0]);

    let step = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Interval"))
        .gauge_style(Style::default().fg(color))
        .ratio(engine.step_progress().clamp(0.0, 1.0));
    f.render_widget(step, chunks[1]);

    let pct = engine.schedule_progress_pct();
    let overall = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Session"))
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio((pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{pct:.0}%"));
    f.render_widget(overall, chunks[2]);
}

/// Initialize terminal for the dashboard
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn event_loop(
    app: &mut DashboardApp,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    clock: &SystemClock,
) -> io::Result<()> {
    while !app.should_quit() {
        app.on_tick(clock.now_ms());
        if app.take_ring() {
            terminal.backend_mut().write_all(b"\x07")?;
            terminal.backend_mut().flush()?;
        }

        terminal.draw(|f| render(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let TermEvent::Key(key) = event::read()? {
                app.on_key(key, clock.now_ms());
            }
        }
    }
    Ok(())
}

pub fn run(args: &ScheduleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = Config::load()?;
    let cfg = args.configuration(&file, false)?;
    let schedule = cfg.schedule()?;

    let mut app = DashboardApp::new(schedule, cfg.pace(), file.display.bell);
    let clock = SystemClock::new();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut app, &mut terminal, &clock);
    restore_terminal(&mut terminal)?;
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomotracker_core::build_schedule;
    use ratatui::backend::TestBackend;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> DashboardApp {
        DashboardApp::new(build_schedule(2, 1, 1, 1).unwrap(), Pace::Fast, true)
    }

    fn screen(app: &DashboardApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn space_starts_and_pauses() {
        let mut app = app();
        app.on_key(press(KeyCode::Char(' ')), 0);
        assert_eq!(app.engine().state(), TimerState::Running);
        app.on_key(press(KeyCode::Char(' ')), 500);
        assert_eq!(app.engine().state(), TimerState::Paused);
        assert_eq!(app.engine().remaining_ms(), 30_000);
        assert_eq!(app.status(), "Paused");
    }

    #[test]
    fn completion_parks_and_rings() {
        let mut app = app();
        app.on_key(press(KeyCode::Char(' ')), 0);
        app.on_tick(1_000);
        assert_eq!(app.engine().state(), TimerState::Pending);
        assert_eq!(app.engine().index(), 1);
        assert!(app.take_ring());
        assert!(!app.take_ring());
        assert!(app.status().starts_with("✓ Focus 1 complete"));
    }

    #[test]
    fn late_space_shows_completion_instead_of_starting_next() {
        let mut app = app();
        app.on_key(press(KeyCode::Char(' ')), 0);
        app.on_key(press(KeyCode::Char(' ')), 1_050);
        assert_eq!(app.engine().state(), TimerState::Pending);
        assert_eq!(app.engine().index(), 1);
        assert!(app.status().starts_with("✓ Focus 1 complete"));

        app.on_key(press(KeyCode::Char(' ')), 1_100);
        assert_eq!(app.engine().state(), TimerState::Running);
        assert_eq!(app.status(), "▶ Short break 1");
    }

    #[test]
    fn skip_reset_and_quit() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('s')), 0);
        assert_eq!(app.engine().index(), 1);
        app.on_key(press(KeyCode::Char('r')), 0);
        assert_eq!(app.engine().index(), 0);
        assert!(!app.should_quit());
        app.on_key(press(KeyCode::Char('q')), 0);
        assert!(app.should_quit());
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = app();
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), 0);
        assert!(app.should_quit());
    }

    #[test]
    fn renders_plan_and_timer() {
        let app = app();
        let text = screen(&app);
        assert!(text.contains("Planned intervals"));
        assert!(text.contains("Focus 1: 1 min"));
        assert!(text.contains("Short break 1: 1 min"));
        assert!(text.contains("01:00"));
        assert!(text.contains("space: start/pause"));
    }

    #[test]
    fn renders_completion() {
        let mut app = app();
        for _ in 0..3 {
            app.on_key(press(KeyCode::Char('s')), 0);
        }
        assert_eq!(app.engine().state(), TimerState::Complete);
        let text = screen(&app);
        assert!(text.contains("All done"));
        assert!(text.contains("100%"));
    }
}

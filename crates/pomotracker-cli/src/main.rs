use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "pomotracker",
    version,
    about = "Run a simple Pomodoro timer in your terminal",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(flatten)]
    run: commands::run::RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive full-screen dashboard
    Dashboard {
        #[command(flatten)]
        schedule: commands::ScheduleArgs,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Logs go to stderr so schedules and JSON on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Dashboard { schedule }) => commands::dashboard::run(&schedule),
        Some(Commands::Config { action }) => commands::config::run(action),
        Some(Commands::Completions { shell }) => {
            commands::completions::run(shell, &mut Cli::command())
        }
        None => commands::run::run(cli.run),
    };

    if let Err(e) = result {
        // A closed pipe (`pomotracker --dry-run | head`) is a normal end.
        if is_broken_pipe(e.as_ref()) {
            return;
        }
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Whether `err` or anything in its source chain is an EPIPE write failure.
fn is_broken_pipe(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
        current = e.source();
    }
    false
}

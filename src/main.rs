mod app;
mod cli;
mod edit;
mod error;
mod maintenance;
mod model;
mod scan;
mod strategy;
mod tui;
mod ui;

use std::{env, io, process::ExitCode};

use anyhow::Result;
use app::App;
use clap::Parser;
use cli::{usage_exit_code, Cli, Locations};
use error::AppError;
use tracing_subscriber::EnvFilter;
use tui::{Crossterm, TerminalPicker};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SHELLCONF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    // Resolve where configuration lives
    let locations = Locations::from_env()?;

    // Maintenance flags never reach the interactive flow
    if let Some(task) = cli.maintenance() {
        return maintenance::run(task, &locations, &mut io::stdout());
    }

    let color = env::var_os("NO_COLOR").is_none();
    let app = App { locations, strategies: &strategy::BUILTIN, color };
    app.run(cli.open_type(), &mut TerminalPicker::new(Crossterm, io::stderr(), color), &mut io::stdout())?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(usage_exit_code(err.kind()));
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let hint = err.chain().find_map(|e| e.downcast_ref::<AppError>()).and_then(AppError::guidance);
            if let Some(hint) = hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

use std::process::ExitCode;

use clap::Parser;
use client::AlertKind;

mod cli;
mod commands;
mod config;
mod error;
mod prompt;
mod render;

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "expensa={level},client={level},engine={level}"
        ))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let settings = match config::load(&cli.overrides) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings.log_level);

    let session = match commands::Session::new(settings) {
        Ok(session) => session,
        Err(err) => {
            tracing::error!("failed to start: {err}");
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = commands::run(&session, cli.command, cli.json).await;
    if let Err(err) = &outcome {
        session.alerts.set(err.to_string(), AlertKind::Error).await;
    }
    if let Some(alert) = session.alerts.current().await {
        eprintln!("{}", render::alert_line(&alert));
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

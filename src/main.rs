//! `kickoff` command-line entry point

use clap::Parser;
use tokio_util::sync::CancellationToken;

use kickoff::cli::args::Cli;
use kickoff::cli::commands;
use kickoff::error::ExitCode;
use kickoff::observability::{LogFormat, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(LogFormat::Human, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();
    tokio::spawn(watch_signals(cancel.clone()));

    match commands::dispatch(cli, cancel).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// First SIGINT/SIGTERM stops the match gracefully; a second one exits.
#[cfg(unix)]
async fn watch_signals(cancel: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGTERM");
            None
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        Some(()) = recv_term(&mut sigterm) => {}
    }
    eprintln!("\nStopping the match... (press Ctrl+C again to force)");
    cancel.cancel();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
        Some(()) = recv_term(&mut sigterm) => std::process::exit(ExitCode::TERMINATED),
    }
}

#[cfg(unix)]
async fn recv_term(sigterm: &mut Option<tokio::signal::unix::Signal>) -> Option<()> {
    match sigterm {
        Some(s) => s.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(not(unix))]
async fn watch_signals(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("\nStopping the match... (press Ctrl+C again to force)");
        cancel.cancel();
    }
    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(ExitCode::INTERRUPTED);
    }
}

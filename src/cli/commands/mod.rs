//! Routes parsed arguments to their command handler.

pub mod catalog;
pub mod completions;
pub mod run;
pub mod validate;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::error::KickoffError;

/// Runs the command named by `cli`.
///
/// `cancel` is triggered on SIGINT/SIGTERM; long-running commands stop
/// gracefully when it fires.
///
/// # Errors
///
/// Returns whatever the dispatched handler fails with.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), KickoffError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cli.quiet, cancel).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Catalog(args) => catalog::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

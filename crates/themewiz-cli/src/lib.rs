pub mod cli;
pub mod diagnostics;
pub mod dispatch;

use anyhow::Result;
use clap::Parser;
use themewiz_core::command_runner::SystemCommandRunner;

use crate::cli::Cli;
use crate::diagnostics::DiagnosticsSession;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let diagnostics = DiagnosticsSession::initialize(cli.diagnostics)?;

    let command_runner = SystemCommandRunner::new();
    let result = dispatch::run_with_deps(cli, &command_runner);

    if let Err(error) = &result {
        tracing::debug!(error = %format!("{error:#}"), "command failed");
        if let Some(path) = diagnostics.path() {
            eprintln!("Diagnostics written to {}", path.display());
        }
    }

    result
}

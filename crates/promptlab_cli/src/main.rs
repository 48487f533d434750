//! promptlab CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or unknown prompt, set or version
//! - 3: Render error
//! - 4: Completion error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, CommandError, Commands, Context};
use promptlab_core::CoreError;
use promptlab_runner::RunnerError;
use promptlab_templates::TemplateError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const RENDER_ERROR: u8 = 3;
    pub const COMPLETION_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "promptlab=debug" } else { "promptlab=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},warn", default_level)));

    // Logging may already be initialized; carry on either way.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let ctx = Context::new(cli.workspace.clone(), cli.quiet);

    let result = match cli.command {
        Commands::Prompt(args) => commands::prompt::execute(args, &ctx).await,
        Commands::Vars(args) => commands::vars::execute(args, &ctx).await,
        Commands::Set(args) => commands::set::execute(args, &ctx).await,
        Commands::Preview(args) => commands::preview::execute(args, &ctx).await,
        Commands::Run(args) => commands::run::execute(args, &ctx).await,
        Commands::History(args) => commands::history::execute(args, &ctx).await,
        Commands::Version(args) => commands::version::execute(args, &ctx).await,
        Commands::Convert(args) => commands::convert::execute(args, &ctx).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<CommandError>() {
            return match err {
                CommandError::InvalidArgument(_) => ExitCodes::INVALID_ARGS,
                CommandError::RenderFailed { .. } | CommandError::NothingToRun => {
                    ExitCodes::RENDER_ERROR
                }
                CommandError::CompletionFailed { .. } => ExitCodes::COMPLETION_ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            return match err {
                CoreError::PromptNotFound(_)
                | CoreError::VersionNotFound(_)
                | CoreError::VariableSetNotFound(_)
                | CoreError::NoPromptSelected
                | CoreError::InvalidSettings(_) => ExitCodes::INVALID_ARGS,
                CoreError::Runner(_) => ExitCodes::COMPLETION_ERROR,
                CoreError::Io(_) | CoreError::Json(_) => ExitCodes::GENERAL_ERROR,
            };
        }
        if cause.downcast_ref::<TemplateError>().is_some() {
            return ExitCodes::RENDER_ERROR;
        }
        if cause.downcast_ref::<RunnerError>().is_some() {
            return ExitCodes::COMPLETION_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}

//! CLI command definitions.
//!
//! Every invocation loads the playground from `<workspace>/.promptlab/`,
//! applies one command and exits. Commands that act on a prompt take
//! `--prompt <id|name>` and otherwise use the current (first stored) prompt.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use promptlab_core::{Playground, Settings};
use promptlab_store::FileStore;
use promptlab_templates::TemplateRenderer;
use thiserror::Error;

pub mod convert;
pub mod history;
pub mod preview;
pub mod prompt;
pub mod run;
pub mod set;
pub mod vars;
pub mod version;

/// promptlab - prompt template playground
#[derive(Parser)]
#[command(name = "promptlab")]
#[command(version, about = "promptlab - prompt template playground")]
#[command(long_about = r#"
promptlab renders prompt templates against named variable sets and runs the
rendered prompts through a completion service as one concurrent batch.

WORKFLOW:
  prompt new    → Create a prompt
  prompt edit   → Write its template
  vars          → List the variables the template references
  set add       → Add a variable set seeded with those variables
  set set       → Fill in values (JSON or plain text)
  preview       → Render every set
  run           → Send every valid preview to the completion service
  history       → Show earlier batches, newest first

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or unknown prompt, set or version
  3 - Render error
  4 - Completion error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace directory holding `.promptlab/`
    #[arg(short, long, global = true, default_value = ".", env = "PROMPTLAB_WORKSPACE")]
    pub workspace: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, inspect and edit prompts
    Prompt(prompt::PromptArgs),

    /// List the variables a prompt's template references
    Vars(vars::VarsArgs),

    /// Manage a prompt's variable sets
    Set(set::SetArgs),

    /// Render the prompt against every variable set
    Preview(preview::PreviewArgs),

    /// Run every valid preview as one batch
    Run(run::RunArgs),

    /// Show batch history, newest first
    History(history::HistoryArgs),

    /// Save, list and restore prompt versions
    Version(version::VersionArgs),

    /// Convert helper source code into a template
    Convert(convert::ConvertArgs),
}

/// Failures reported by commands themselves.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{failed} of {total} variable set(s) failed to render")]
    RenderFailed { failed: usize, total: usize },

    #[error("Nothing to run: no variable set renders a non-empty preview")]
    NothingToRun,

    #[error("{failed} of {total} completion(s) failed")]
    CompletionFailed { failed: usize, total: usize },
}

/// State shared by all commands.
pub struct Context {
    pub workspace: PathBuf,
    pub quiet: bool,
}

impl Context {
    pub fn new(workspace: PathBuf, quiet: bool) -> Self {
        Self { workspace, quiet }
    }

    /// Load settings for the workspace.
    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.workspace).context("Failed to load settings")
    }

    /// Open the playground with the configured renderer.
    pub fn playground(&self, settings: &Settings) -> Playground {
        let store = FileStore::new(&self.workspace);
        Playground::load(Arc::new(store))
            .with_renderer(TemplateRenderer::with_options(settings.render.clone()))
    }

    /// Print a status line unless `--quiet` was given.
    pub fn status(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

/// Resolve `--prompt`, falling back to the current prompt.
pub fn resolve_prompt(playground: &Playground, key: Option<&str>) -> Result<String> {
    let prompt = match key {
        Some(key) => playground.find_prompt(key)?,
        None => playground.current_prompt()?,
    };
    Ok(prompt.id.clone())
}

/// Shorten a multi-line text to its first line for listings.
pub fn first_line(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max {
        let cut: String = line.chars().take(max).collect();
        format!("{}…", cut)
    } else if text.lines().nth(1).is_some() {
        format!("{}…", line)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlab_core::CoreError;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_prompt() {
        let mut playground = Playground::ephemeral();
        assert!(resolve_prompt(&playground, None).is_err());

        let first = playground.create_prompt("First");
        let second = playground.create_prompt("Second");

        assert_eq!(resolve_prompt(&playground, Some("First")).unwrap(), first.id);
        assert_eq!(resolve_prompt(&playground, Some(&second.id)).unwrap(), second.id);

        let err = resolve_prompt(&playground, Some("Third")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::PromptNotFound(_))
        ));
    }

    #[test]
    fn test_context_opens_workspace() {
        let temp = tempdir().unwrap();
        let ctx = Context::new(temp.path().to_path_buf(), true);

        let mut playground = ctx.playground(&Settings::default());
        playground.create_prompt("Saved");

        let reopened = ctx.playground(&Settings::default());
        assert_eq!(reopened.current_prompt().unwrap().name, "Saved");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("short", 10), "short");
        assert_eq!(first_line("one\ntwo", 10), "one…");
        assert_eq!(first_line("abcdefghij", 4), "abcd…");
        assert_eq!(first_line("", 4), "");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["promptlab", "-q", "run", "--prompt", "Greeter"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Run(_)));

        assert!(Cli::try_parse_from(["promptlab", "bogus"]).is_err());
    }
}

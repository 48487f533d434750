//! Prompt command - Create, inspect and edit prompts.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use promptlab_store::PromptUpdate;
use tracing::info;

use super::{first_line, resolve_prompt, CommandError, Context};

#[derive(Args)]
pub struct PromptArgs {
    #[command(subcommand)]
    command: PromptCommand,
}

#[derive(Subcommand)]
enum PromptCommand {
    /// Create a prompt
    New {
        /// Name of the prompt
        name: String,

        /// Initial template text
        #[arg(short, long)]
        template: Option<String>,
    },

    /// List all prompts
    List,

    /// Show a prompt's template and variables
    Show {
        /// Prompt id or name (defaults to the current prompt)
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Replace a prompt's template (from --template, --file or stdin)
    Edit {
        /// Prompt id or name (defaults to the current prompt)
        #[arg(short, long)]
        prompt: Option<String>,

        /// Template text
        #[arg(short, long, conflicts_with = "file")]
        template: Option<String>,

        /// Read the template from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Replace the prompt's free-form variables JSON
        #[arg(long)]
        variables: Option<String>,
    },

    /// Rename a prompt
    Rename {
        /// New name
        name: String,

        /// Prompt id or name (defaults to the current prompt)
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Delete a prompt with its versions, variable sets and history
    Delete {
        /// Prompt id or name
        prompt: String,
    },
}

pub async fn execute(args: PromptArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let mut playground = ctx.playground(&settings);

    match args.command {
        PromptCommand::New { name, template } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CommandError::InvalidArgument("prompt name is empty".to_string()).into());
            }

            let prompt = playground.create_prompt(name);
            if let Some(template) = template {
                playground.update_prompt(&prompt.id, PromptUpdate::new().template(template))?;
            }
            ctx.status(format!("✅ Created prompt '{}'", prompt.name));
            println!("{}", prompt.id);
        }

        PromptCommand::List => {
            let current = playground.current_prompt_id().map(str::to_string);
            if playground.prompts().is_empty() {
                ctx.status("No prompts yet. Create one with `promptlab prompt new <name>`.");
            }
            for prompt in playground.prompts() {
                let marker = if current.as_deref() == Some(prompt.id.as_str()) { "*" } else { " " };
                println!(
                    "{} {}  {:<24} {}  {}",
                    marker,
                    prompt.id,
                    prompt.name,
                    prompt.updated_at.format("%Y-%m-%d %H:%M"),
                    first_line(&prompt.template, 40)
                );
            }
        }

        PromptCommand::Show { prompt } => {
            let id = resolve_prompt(&playground, prompt.as_deref())?;
            let prompt = playground.prompt(&id)?;
            println!("Name:     {}", prompt.name);
            println!("Id:       {}", prompt.id);
            println!("Created:  {}", prompt.created_at.to_rfc3339());
            println!("Updated:  {}", prompt.updated_at.to_rfc3339());
            println!("Versions: {}", playground.versions_for(&id).len());
            println!("Sets:     {}", playground.variable_sets_for(&id).len());
            println!();
            println!("{}", prompt.template);
            if prompt.variables.trim() != "{}" {
                println!();
                println!("Variables: {}", prompt.variables);
            }
        }

        PromptCommand::Edit {
            prompt,
            template,
            file,
            variables,
        } => {
            let id = resolve_prompt(&playground, prompt.as_deref())?;

            let mut update = PromptUpdate::new();
            if let Some(variables) = variables {
                serde_json::from_str::<serde_json::Value>(&variables).map_err(|e| {
                    CommandError::InvalidArgument(format!("--variables is not JSON: {}", e))
                })?;
                update = update.variables(variables);
            }

            let template = match (template, file) {
                (Some(text), _) => Some(text),
                (None, Some(path)) => Some(
                    fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                (None, None) if update.variables.is_none() => {
                    let mut text = String::new();
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .context("Failed to read template from stdin")?;
                    Some(text)
                }
                (None, None) => None,
            };
            if let Some(template) = template {
                update = update.template(template);
            }

            let prompt = playground.update_prompt(&id, update)?;
            info!("Updated prompt {}", prompt.id);
            ctx.status(format!("✅ Updated prompt '{}'", prompt.name));
        }

        PromptCommand::Rename { name, prompt } => {
            let id = resolve_prompt(&playground, prompt.as_deref())?;
            let prompt = playground.update_prompt(&id, PromptUpdate::new().name(name))?;
            ctx.status(format!("✅ Renamed prompt to '{}'", prompt.name));
        }

        PromptCommand::Delete { prompt } => {
            let id = resolve_prompt(&playground, Some(&prompt))?;
            playground.delete_prompt(&id)?;
            ctx.status(format!("🗑️  Deleted prompt {}", id));
        }
    }

    Ok(())
}

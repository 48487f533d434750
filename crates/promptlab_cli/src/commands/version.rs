//! Version command - Save, list and restore prompt versions.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{first_line, resolve_prompt, Context};

#[derive(Args)]
pub struct VersionArgs {
    /// Prompt id or name (defaults to the current prompt)
    #[arg(short, long, global = true)]
    prompt: Option<String>,

    #[command(subcommand)]
    command: VersionCommand,
}

#[derive(Subcommand)]
enum VersionCommand {
    /// Snapshot the prompt's template and variables
    Save {
        /// Note describing the version
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List the prompt's versions, oldest first
    List,

    /// Write a version back into its prompt
    Restore {
        /// Version id
        version: String,
    },

    /// Delete a version
    Delete {
        /// Version id
        version: String,
    },
}

pub async fn execute(args: VersionArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let mut playground = ctx.playground(&settings);

    match args.command {
        VersionCommand::Save { note } => {
            let id = resolve_prompt(&playground, args.prompt.as_deref())?;
            let version = playground.save_version(&id, note.as_deref())?;
            ctx.status("✅ Saved version");
            println!("{}", version.id);
        }

        VersionCommand::List => {
            let id = resolve_prompt(&playground, args.prompt.as_deref())?;
            let versions = playground.versions_for(&id);
            if versions.is_empty() {
                ctx.status("No saved versions.");
            }
            for version in versions {
                let label = if version.note.is_empty() {
                    first_line(&version.template, 40)
                } else {
                    version.note.clone()
                };
                println!(
                    "{}  {}  {}",
                    version.id,
                    version.created_at.format("%Y-%m-%d %H:%M"),
                    label
                );
            }
        }

        VersionCommand::Restore { version } => {
            let prompt = playground.restore_version(&version)?;
            ctx.status(format!("✅ Restored '{}' from version {}", prompt.name, version));
        }

        VersionCommand::Delete { version } => {
            playground.delete_version(&version)?;
            ctx.status(format!("🗑️  Deleted version {}", version));
        }
    }

    Ok(())
}

//! Set command - Manage a prompt's variable sets.

use anyhow::Result;
use clap::{Args, Subcommand};
use promptlab_templates::VariableValue;

use super::{first_line, resolve_prompt, CommandError, Context};

#[derive(Args)]
pub struct SetArgs {
    /// Prompt id or name (defaults to the current prompt)
    #[arg(short, long, global = true)]
    prompt: Option<String>,

    #[command(subcommand)]
    command: SetCommand,
}

#[derive(Subcommand)]
enum SetCommand {
    /// List variable sets with their values
    List,

    /// Add a set seeded with the template's variables
    Add {
        /// Set name (defaults to "Set N")
        #[arg(short, long)]
        name: Option<String>,

        /// Initial values as name=value
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },

    /// Duplicate a set
    Dup {
        /// Set id or name
        set: String,
    },

    /// Assign one variable (the value may be JSON text)
    Set {
        /// Set id or name
        set: String,
        /// Variable name
        variable: String,
        /// Raw value
        value: String,
    },

    /// Rename a set
    Rename {
        /// Set id or name
        set: String,
        /// New name
        name: String,
    },

    /// Delete a set
    Delete {
        /// Set id or name
        set: String,
    },
}

/// Split a `name=value` pair.
fn parse_assignment(raw: &str) -> Result<(String, String), CommandError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(CommandError::InvalidArgument(format!(
            "expected NAME=VALUE, got '{}'",
            raw
        ))),
    }
}

pub async fn execute(args: SetArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let mut playground = ctx.playground(&settings);
    let prompt_id = resolve_prompt(&playground, args.prompt.as_deref())?;

    match args.command {
        SetCommand::List => {
            let sets = playground.variable_sets_for(&prompt_id);
            if sets.is_empty() {
                ctx.status("No variable sets. Add one with `promptlab set add`.");
            }
            for set in sets {
                println!("{}  {}", set.id, set.name);
                for (name, raw) in &set.variables {
                    let kind = VariableValue::parse(raw).kind();
                    println!("    {:<20} {:<8} {}", name, kind, first_line(raw, 60));
                }
            }
        }

        SetCommand::Add { name, vars } => {
            let assignments = vars
                .iter()
                .map(|raw| parse_assignment(raw))
                .collect::<Result<Vec<_>, _>>()?;

            let set = playground.create_variable_set(&prompt_id, name.as_deref())?;
            for (variable, value) in assignments {
                playground.update_variable_value(&prompt_id, &set.id, &variable, &value)?;
            }
            ctx.status(format!("✅ Added variable set '{}'", set.name));
            println!("{}", set.id);
        }

        SetCommand::Dup { set } => {
            let source = playground.find_variable_set(&prompt_id, &set)?.id.clone();
            let copy = playground.duplicate_variable_set(&prompt_id, &source)?;
            ctx.status(format!("✅ Added variable set '{}'", copy.name));
            println!("{}", copy.id);
        }

        SetCommand::Set {
            set,
            variable,
            value,
        } => {
            let set_id = playground.find_variable_set(&prompt_id, &set)?.id.clone();
            playground.update_variable_value(&prompt_id, &set_id, &variable, &value)?;
            ctx.status(format!(
                "✅ {} = {} ({})",
                variable,
                first_line(&value, 40),
                VariableValue::parse(&value).kind()
            ));
        }

        SetCommand::Rename { set, name } => {
            let set_id = playground.find_variable_set(&prompt_id, &set)?.id.clone();
            playground.rename_variable_set(&prompt_id, &set_id, &name)?;
            ctx.status(format!("✅ Renamed variable set to '{}'", name));
        }

        SetCommand::Delete { set } => {
            let set_id = playground.find_variable_set(&prompt_id, &set)?.id.clone();
            playground.delete_variable_set(&prompt_id, &set_id)?;
            ctx.status(format!("🗑️  Deleted variable set {}", set_id));
        }
    }

    Ok(())
}

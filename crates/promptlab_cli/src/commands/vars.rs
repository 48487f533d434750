//! Vars command - List the variables a template references.

use anyhow::Result;
use clap::Args;

use super::{resolve_prompt, Context};

#[derive(Args)]
pub struct VarsArgs {
    /// Prompt id or name (defaults to the current prompt)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Print as a JSON array
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: VarsArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let playground = ctx.playground(&settings);

    let id = resolve_prompt(&playground, args.prompt.as_deref())?;
    let variables = playground.extracted_variables(&id)?;

    if args.json {
        println!("{}", serde_json::to_string(&variables)?);
    } else if variables.is_empty() {
        ctx.status("Template references no variables.");
    } else {
        for name in variables {
            println!("{}", name);
        }
    }
    Ok(())
}

//! Preview command - Render the template against every variable set.

use anyhow::Result;
use clap::Args;
use promptlab_templates::RenderOutcome;

use super::{resolve_prompt, CommandError, Context};

#[derive(Args)]
pub struct PreviewArgs {
    /// Prompt id or name (defaults to the current prompt)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: PreviewArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let playground = ctx.playground(&settings);

    let id = resolve_prompt(&playground, args.prompt.as_deref())?;
    let previews = playground.previews(&id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
    } else if previews.is_empty() {
        ctx.status("No variable sets. Add one with `promptlab set add`.");
    } else {
        print_previews(&previews);
    }

    let failed = previews.iter().filter(|p| p.error().is_some()).count();
    if failed > 0 {
        return Err(CommandError::RenderFailed {
            failed,
            total: previews.len(),
        }
        .into());
    }
    Ok(())
}

fn print_previews(previews: &[RenderOutcome]) {
    for outcome in previews {
        println!("── {} ──", outcome.set_name());
        match outcome {
            RenderOutcome::Rendered { preview, .. } if preview.is_empty() => {
                println!("(empty, will not run)");
            }
            RenderOutcome::Rendered { preview, .. } => println!("{}", preview),
            RenderOutcome::Failed { error, .. } => println!("❌ {}", error),
        }
        println!();
    }
}

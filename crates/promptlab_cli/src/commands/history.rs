//! History command - Show earlier batches, newest first.

use anyhow::Result;
use clap::Args;

use super::run::print_batch;
use super::{resolve_prompt, Context};

#[derive(Args)]
pub struct HistoryArgs {
    /// Prompt id or name (defaults to the current prompt)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Show at most this many batches
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print batches as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: HistoryArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let playground = ctx.playground(&settings);
    let id = resolve_prompt(&playground, args.prompt.as_deref())?;

    let mut batches = playground.outputs_for(&id);
    if let Some(limit) = args.limit {
        batches.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batches)?);
        return Ok(());
    }

    if batches.is_empty() {
        ctx.status("No runs yet.");
    }
    for batch in batches {
        println!(
            "═══ Batch {} ({} output(s), {} failed) ═══",
            batch.id,
            batch.outputs.len(),
            batch.failed_count()
        );
        print_batch(batch);
    }
    Ok(())
}

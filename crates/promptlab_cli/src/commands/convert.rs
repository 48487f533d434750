//! Convert command - Turn helper source code into a template.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use promptlab_core::{conversion_prompt, convert_source};
use promptlab_store::PromptUpdate;

use super::{resolve_prompt, Context};

#[derive(Args)]
pub struct ConvertArgs {
    /// File containing the helper functions
    file: PathBuf,

    /// Write the template into this prompt (id or name)
    #[arg(long, value_name = "PROMPT")]
    apply: Option<String>,

    /// Print the conversion request instead of sending it
    #[arg(long)]
    print_prompt: bool,
}

pub async fn execute(args: ConvertArgs, ctx: &Context) -> Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    if args.print_prompt {
        println!("{}", conversion_prompt(&source));
        return Ok(());
    }

    let settings = ctx.settings()?;
    let mut playground = ctx.playground(&settings);
    let target = match args.apply.as_deref() {
        Some(key) => Some(resolve_prompt(&playground, Some(key))?),
        None => None,
    };

    let service = settings.build_service()?;
    ctx.status(format!("🔄 Converting {} via {}...", args.file.display(), service.name()));
    let template = convert_source(service.as_ref(), &source)
        .await
        .context("Conversion failed")?;

    match target {
        Some(id) => {
            let prompt = playground.update_prompt(&id, PromptUpdate::new().template(template))?;
            ctx.status(format!("✅ Updated template of '{}'", prompt.name));
        }
        None => println!("{}", template),
    }
    Ok(())
}

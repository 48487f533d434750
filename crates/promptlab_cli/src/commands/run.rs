//! Run command - Send every valid preview to the completion service.

use anyhow::Result;
use clap::Args;
use promptlab_runner::{BatchExecutor, BatchResult};
use tracing::info;

use super::{resolve_prompt, CommandError, Context};

#[derive(Args)]
pub struct RunArgs {
    /// Prompt id or name (defaults to the current prompt)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Print the batch as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: RunArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let mut playground = ctx.playground(&settings);
    let id = resolve_prompt(&playground, args.prompt.as_deref())?;

    let executor = BatchExecutor::new(settings.build_service()?);
    info!("Running prompt {} via {}", id, executor.service().name());

    let Some(batch) = playground.run(&executor, &id).await? else {
        return Err(CommandError::NothingToRun.into());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        print_batch(&batch);
        ctx.status(format!(
            "{} succeeded, {} failed, {} token(s)",
            batch.succeeded_count(),
            batch.failed_count(),
            batch.total_tokens()
        ));
    }

    let failed = batch.failed_count();
    if failed > 0 {
        return Err(CommandError::CompletionFailed {
            failed,
            total: batch.outputs.len(),
        }
        .into());
    }
    Ok(())
}

/// Print every output of a batch.
pub fn print_batch(batch: &BatchResult) {
    for output in &batch.outputs {
        let icon = if output.error { "❌" } else { "✅" };
        println!(
            "{} {} ({})",
            icon,
            output.set_name,
            output.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
        println!("{}", output.content);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlab_core::{Backend, Settings};
    use promptlab_store::PromptUpdate;
    use promptlab_templates::VariableSet;
    use tempfile::tempdir;

    fn workspace_with_mock_backend() -> (tempfile::TempDir, Context) {
        let temp = tempdir().unwrap();
        let settings = Settings {
            backend: Backend::Mock,
            ..Settings::default()
        };
        settings.save(temp.path()).unwrap();
        let ctx = Context::new(temp.path().to_path_buf(), true);
        (temp, ctx)
    }

    #[tokio::test]
    async fn test_run_records_history() {
        let (_temp, ctx) = workspace_with_mock_backend();
        {
            let mut playground = ctx.playground(&Settings::default());
            let prompt = playground.create_prompt("Greeter");
            playground
                .update_prompt(&prompt.id, PromptUpdate::new().template("Hello {{ name }}"))
                .unwrap();
            playground
                .replace_variable_sets(
                    &prompt.id,
                    vec![VariableSet::new("A").with_variable("name", "World")],
                )
                .unwrap();
        }

        execute(RunArgs { prompt: None, json: true }, &ctx).await.unwrap();

        let playground = ctx.playground(&Settings::default());
        let id = playground.current_prompt_id().unwrap().to_string();
        let history = playground.outputs_for(&id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].outputs[0].content, "echo: Hello World");
    }

    #[tokio::test]
    async fn test_nothing_to_run() {
        let (_temp, ctx) = workspace_with_mock_backend();
        ctx.playground(&Settings::default()).create_prompt("Empty");

        let err = execute(RunArgs { prompt: None, json: false }, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CommandError>(),
            Some(CommandError::NothingToRun)
        ));
    }
}

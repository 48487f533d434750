//! Integration tests for the playground against real stores.

use std::sync::Arc;

use promptlab_core::Playground;
use promptlab_runner::{BatchExecutor, MockCompletionService, MockReply};
use promptlab_store::{FileStore, MemoryStore, PlaygroundStore, PromptUpdate};
use promptlab_templates::{RenderOptions, TemplateRenderer, UndefinedPolicy};
use tempfile::tempdir;

const TEMPLATE: &str = "Write a tagline for {{ business }}.{% if tone %} Tone: {{ tone }}.{% endif %}";

#[tokio::test]
async fn test_full_session_survives_reload() {
    let temp = tempdir().unwrap();
    let executor = BatchExecutor::new(Arc::new(
        MockCompletionService::new().add_reply(MockReply::success("Fresh bread, daily.")),
    ));

    let prompt_id = {
        let mut playground = Playground::load(Arc::new(FileStore::new(temp.path())));
        let prompt = playground.create_prompt("Taglines");
        playground
            .update_prompt(&prompt.id, PromptUpdate::new().template(TEMPLATE))
            .unwrap();
        playground.save_version(&prompt.id, Some("  first draft  ")).unwrap();

        let set = playground.create_variable_set(&prompt.id, None).unwrap();
        assert_eq!(
            set.variables.keys().cloned().collect::<Vec<_>>(),
            vec!["business".to_string(), "tone".to_string()]
        );
        playground
            .update_variable_value(&prompt.id, &set.id, "business", "a bakery")
            .unwrap();

        let batch = playground.run(&executor, &prompt.id).await.unwrap().unwrap();
        assert_eq!(batch.outputs.len(), 1);
        assert_eq!(batch.outputs[0].prompt, "Write a tagline for a bakery.");
        prompt.id
    };

    let playground = Playground::load(Arc::new(FileStore::new(temp.path())));
    let prompt = playground.current_prompt().unwrap();
    assert_eq!(prompt.id, prompt_id);
    assert_eq!(prompt.template, TEMPLATE);

    let versions = playground.versions_for(&prompt_id);
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].note, "first draft");

    assert_eq!(playground.variable_sets_for(&prompt_id).len(), 1);

    let history = playground.outputs_for(&prompt_id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].outputs[0].content, "Fresh bread, daily.");
}

#[tokio::test]
async fn test_history_is_newest_first_after_reload() {
    let temp = tempdir().unwrap();
    let executor = BatchExecutor::new(Arc::new(MockCompletionService::new()));

    let mut playground = Playground::load(Arc::new(FileStore::new(temp.path())));
    let prompt = playground.create_prompt("Echo");
    playground
        .update_prompt(&prompt.id, PromptUpdate::new().template("Say {{ word }}"))
        .unwrap();
    let set = playground.create_variable_set(&prompt.id, None).unwrap();

    let mut ids = Vec::new();
    for word in ["one", "two", "three"] {
        playground
            .update_variable_value(&prompt.id, &set.id, "word", word)
            .unwrap();
        let batch = playground.run(&executor, &prompt.id).await.unwrap().unwrap();
        ids.push(batch.id);
    }

    let reloaded = Playground::load(Arc::new(FileStore::new(temp.path())));
    let history: Vec<_> = reloaded
        .outputs_for(&prompt.id)
        .into_iter()
        .map(|b| b.id.clone())
        .collect();
    ids.reverse();
    assert_eq!(history, ids);
    assert_eq!(
        reloaded.outputs_for(&prompt.id)[0].outputs[0].content,
        "echo: Say three"
    );
}

#[tokio::test]
async fn test_failures_stay_per_set() {
    let store = MemoryStore::new();
    let mut playground = Playground::load(Arc::new(store.clone()));
    let prompt = playground.create_prompt("Taglines");
    playground
        .update_prompt(&prompt.id, PromptUpdate::new().template(TEMPLATE))
        .unwrap();

    for (name, business) in [("Bakery", "a bakery"), ("Florist", "a florist"), ("Blank", "")] {
        let set = playground.create_variable_set(&prompt.id, Some(name)).unwrap();
        if !business.is_empty() {
            playground
                .update_variable_value(&prompt.id, &set.id, "business", business)
                .unwrap();
        }
    }

    let service = MockCompletionService::new()
        .on_prompt("Write a tagline for a florist.", MockReply::application_error("quota exceeded"));
    let executor = BatchExecutor::new(Arc::new(service));

    let batch = playground.run(&executor, &prompt.id).await.unwrap().unwrap();
    let names: Vec<_> = batch.outputs.iter().map(|o| o.set_name.as_str()).collect();
    assert_eq!(names, vec!["Bakery", "Florist", "Blank"]);
    assert!(!batch.outputs[0].error);
    assert!(batch.outputs[1].error);
    assert_eq!(batch.outputs[1].content, "Error: quota exceeded");
    assert!(!batch.outputs[2].error);
    assert_eq!(batch.outputs[2].prompt, "Write a tagline for .");

    assert_eq!(store.load_outputs().len(), 1);
}

#[test]
fn test_lenient_renderer_previews_missing_values() {
    let mut playground = Playground::load(Arc::new(MemoryStore::new())).with_renderer(
        TemplateRenderer::with_options(RenderOptions::new().undefined(UndefinedPolicy::Lenient)),
    );
    let prompt = playground.create_prompt("Taglines");
    playground
        .update_prompt(&prompt.id, PromptUpdate::new().template("For {{ business }}!"))
        .unwrap();
    playground
        .replace_variable_sets(&prompt.id, vec![promptlab_templates::VariableSet::new("Empty")])
        .unwrap();

    let previews = playground.previews(&prompt.id).unwrap();
    assert_eq!(previews[0].preview(), "For !");
    assert!(previews[0].is_runnable());
}

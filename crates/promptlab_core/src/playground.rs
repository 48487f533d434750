//! Playground state.
//!
//! Holds prompts, their versions, variable sets and batch history in memory
//! and writes every change through to the [`PlaygroundStore`] it was built
//! with. The store is injected, so tests run against a `MemoryStore` and a
//! missing backend degrades to a `NoopStore`.

use std::collections::BTreeSet;
use std::sync::Arc;

use promptlab_runner::{BatchExecutor, BatchResult, CompletionRequest};
use promptlab_store::{
    NoopStore, PlaygroundStore, Prompt, PromptUpdate, PromptVersion, VariableSetMap,
};
use promptlab_templates::{
    extract_variables, PreviewPipeline, RenderOutcome, TemplateRenderer, VariableSet,
};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};

/// The prompt playground.
pub struct Playground {
    store: Arc<dyn PlaygroundStore>,
    pipeline: PreviewPipeline,
    prompts: Vec<Prompt>,
    versions: Vec<PromptVersion>,
    variable_sets: VariableSetMap,
    /// Newest first
    outputs: Vec<BatchResult>,
    current_prompt_id: Option<String>,
}

impl Playground {
    /// Load playground state from a store.
    ///
    /// The first stored prompt becomes the current one.
    pub fn load(store: Arc<dyn PlaygroundStore>) -> Self {
        let prompts = store.load_prompts();
        let versions = store.load_versions();
        let variable_sets = store.load_variable_sets();
        let mut outputs = store.load_outputs();
        outputs.reverse();

        debug!(
            "Loaded {} prompt(s), {} version(s), {} batch(es)",
            prompts.len(),
            versions.len(),
            outputs.len()
        );

        let current_prompt_id = prompts.first().map(|p| p.id.clone());
        Self {
            store,
            pipeline: PreviewPipeline::default(),
            prompts,
            versions,
            variable_sets,
            outputs,
            current_prompt_id,
        }
    }

    /// Playground with nothing persisted.
    pub fn ephemeral() -> Self {
        Self::load(Arc::new(NoopStore))
    }

    /// Use a specific renderer for previews.
    pub fn with_renderer(mut self, renderer: TemplateRenderer) -> Self {
        self.pipeline = PreviewPipeline::new(renderer);
        self
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn prompt(&self, id: &str) -> CoreResult<&Prompt> {
        self.prompts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::PromptNotFound(id.to_string()))
    }

    /// Find a prompt by id, falling back to an exact name match.
    pub fn find_prompt(&self, key: &str) -> CoreResult<&Prompt> {
        self.prompts
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.prompts.iter().find(|p| p.name == key))
            .ok_or_else(|| CoreError::PromptNotFound(key.to_string()))
    }

    pub fn current_prompt_id(&self) -> Option<&str> {
        self.current_prompt_id.as_deref()
    }

    pub fn current_prompt(&self) -> CoreResult<&Prompt> {
        let id = self.current_prompt_id.as_deref().ok_or(CoreError::NoPromptSelected)?;
        self.prompt(id)
    }

    pub fn select_prompt(&mut self, id: &str) -> CoreResult<()> {
        self.prompt(id)?;
        self.current_prompt_id = Some(id.to_string());
        Ok(())
    }

    /// Create an empty prompt and make it current.
    pub fn create_prompt(&mut self, name: impl Into<String>) -> Prompt {
        let prompt = Prompt::new(name);
        info!("Created prompt '{}' ({})", prompt.name, prompt.id);

        self.prompts.push(prompt.clone());
        self.store.save_prompts(&self.prompts);
        self.current_prompt_id = Some(prompt.id.clone());
        prompt
    }

    pub fn update_prompt(&mut self, id: &str, update: PromptUpdate) -> CoreResult<Prompt> {
        let prompt = self
            .prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::PromptNotFound(id.to_string()))?;
        prompt.apply(update);
        let updated = prompt.clone();

        self.store.save_prompts(&self.prompts);
        Ok(updated)
    }

    /// Delete a prompt along with its versions, variable sets and outputs.
    pub fn delete_prompt(&mut self, id: &str) -> CoreResult<()> {
        self.prompt(id)?;

        self.prompts.retain(|p| p.id != id);
        self.store.save_prompts(&self.prompts);

        self.versions.retain(|v| v.prompt_id != id);
        self.store.save_versions(&self.versions);

        self.variable_sets.remove(id);
        self.store.save_variable_sets(&self.variable_sets);

        self.outputs.retain(|b| b.prompt_id != id);
        self.store.remove_outputs(id);

        if self.current_prompt_id.as_deref() == Some(id) {
            self.current_prompt_id = self.prompts.first().map(|p| p.id.clone());
        }

        info!("Deleted prompt {}", id);
        Ok(())
    }

    /// Variables referenced by a prompt's template.
    pub fn extracted_variables(&self, prompt_id: &str) -> CoreResult<BTreeSet<String>> {
        Ok(extract_variables(&self.prompt(prompt_id)?.template))
    }

    // =========================================================================
    // Versions
    // =========================================================================

    /// Snapshot a prompt's current template and variables.
    pub fn save_version(&mut self, prompt_id: &str, note: Option<&str>) -> CoreResult<PromptVersion> {
        let version = PromptVersion::snapshot(self.prompt(prompt_id)?, note);
        self.versions.push(version.clone());
        self.store.save_versions(&self.versions);

        info!("Saved version {} of prompt {}", version.id, prompt_id);
        Ok(version)
    }

    /// Versions of one prompt, oldest first.
    pub fn versions_for(&self, prompt_id: &str) -> Vec<&PromptVersion> {
        self.versions
            .iter()
            .filter(|v| v.prompt_id == prompt_id)
            .collect()
    }

    pub fn version(&self, version_id: &str) -> CoreResult<&PromptVersion> {
        self.versions
            .iter()
            .find(|v| v.id == version_id)
            .ok_or_else(|| CoreError::VersionNotFound(version_id.to_string()))
    }

    /// Write a version's template and variables back into its prompt.
    pub fn restore_version(&mut self, version_id: &str) -> CoreResult<Prompt> {
        let version = self.version(version_id)?.clone();
        let update = PromptUpdate::new()
            .template(version.template)
            .variables(version.variables);
        self.update_prompt(&version.prompt_id, update)
    }

    pub fn delete_version(&mut self, version_id: &str) -> CoreResult<()> {
        self.version(version_id)?;
        self.versions.retain(|v| v.id != version_id);
        self.store.save_versions(&self.versions);
        Ok(())
    }

    // =========================================================================
    // Variable sets
    // =========================================================================

    pub fn variable_sets_for(&self, prompt_id: &str) -> &[VariableSet] {
        self.variable_sets
            .get(prompt_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn variable_set(&self, prompt_id: &str, set_id: &str) -> CoreResult<&VariableSet> {
        self.variable_sets_for(prompt_id)
            .iter()
            .find(|s| s.id == set_id)
            .ok_or_else(|| CoreError::VariableSetNotFound(set_id.to_string()))
    }

    /// Find a set by id, falling back to an exact name match.
    pub fn find_variable_set(&self, prompt_id: &str, key: &str) -> CoreResult<&VariableSet> {
        let sets = self.variable_sets_for(prompt_id);
        sets.iter()
            .find(|s| s.id == key)
            .or_else(|| sets.iter().find(|s| s.name == key))
            .ok_or_else(|| CoreError::VariableSetNotFound(key.to_string()))
    }

    /// Replace all sets of a prompt.
    pub fn replace_variable_sets(&mut self, prompt_id: &str, sets: Vec<VariableSet>) -> CoreResult<()> {
        self.prompt(prompt_id)?;
        self.variable_sets.insert(prompt_id.to_string(), sets);
        self.store.save_variable_sets(&self.variable_sets);
        Ok(())
    }

    /// Add a set seeded with an empty value for every extracted variable.
    ///
    /// Without a name the set is called `Set N`.
    pub fn create_variable_set(&mut self, prompt_id: &str, name: Option<&str>) -> CoreResult<VariableSet> {
        let variables = self.extracted_variables(prompt_id)?;
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("Set {}", self.variable_sets_for(prompt_id).len() + 1),
        };

        let set = VariableSet::seeded(name, variables);
        self.modify_sets(prompt_id, |sets| sets.push(set.clone()))?;
        Ok(set)
    }

    pub fn duplicate_variable_set(&mut self, prompt_id: &str, set_id: &str) -> CoreResult<VariableSet> {
        let copy = self.variable_set(prompt_id, set_id)?.duplicate();
        self.modify_sets(prompt_id, |sets| sets.push(copy.clone()))?;
        Ok(copy)
    }

    pub fn rename_variable_set(&mut self, prompt_id: &str, set_id: &str, name: &str) -> CoreResult<()> {
        self.variable_set(prompt_id, set_id)?;
        self.modify_sets(prompt_id, |sets| {
            if let Some(set) = sets.iter_mut().find(|s| s.id == set_id) {
                set.name = name.to_string();
            }
        })
    }

    pub fn update_variable_value(
        &mut self,
        prompt_id: &str,
        set_id: &str,
        variable: &str,
        value: &str,
    ) -> CoreResult<()> {
        self.variable_set(prompt_id, set_id)?;
        self.modify_sets(prompt_id, |sets| {
            if let Some(set) = sets.iter_mut().find(|s| s.id == set_id) {
                set.variables.insert(variable.to_string(), value.to_string());
            }
        })
    }

    pub fn delete_variable_set(&mut self, prompt_id: &str, set_id: &str) -> CoreResult<()> {
        self.variable_set(prompt_id, set_id)?;
        self.modify_sets(prompt_id, |sets| sets.retain(|s| s.id != set_id))
    }

    fn modify_sets<F>(&mut self, prompt_id: &str, change: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Vec<VariableSet>),
    {
        self.prompt(prompt_id)?;
        change(self.variable_sets.entry(prompt_id.to_string()).or_default());
        self.store.save_variable_sets(&self.variable_sets);
        Ok(())
    }

    // =========================================================================
    // Previews and runs
    // =========================================================================

    /// Render outcomes for every variable set of a prompt.
    pub fn previews(&self, prompt_id: &str) -> CoreResult<Vec<RenderOutcome>> {
        let prompt = self.prompt(prompt_id)?;
        Ok(self
            .pipeline
            .compute(&prompt.template, self.variable_sets_for(prompt_id)))
    }

    /// Run every runnable preview of a prompt as one batch.
    ///
    /// Returns `None` without dispatching anything when no preview is runnable.
    pub async fn run(&mut self, executor: &BatchExecutor, prompt_id: &str) -> CoreResult<Option<BatchResult>> {
        let requests = CompletionRequest::from_previews(&self.previews(prompt_id)?);
        if requests.is_empty() {
            info!("Nothing to run for prompt {}: no valid previews", prompt_id);
            return Ok(None);
        }

        let batch = executor.run_batch(prompt_id, requests).await;
        self.record_batch(batch.clone());
        Ok(Some(batch))
    }

    /// Add a batch to the front of the history.
    pub fn record_batch(&mut self, batch: BatchResult) {
        self.store.append_output(&batch);
        self.outputs.insert(0, batch);
    }

    /// Batch history for a prompt, newest first.
    pub fn outputs_for(&self, prompt_id: &str) -> Vec<&BatchResult> {
        self.outputs
            .iter()
            .filter(|b| b.prompt_id == prompt_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlab_runner::{MockCompletionService, MockReply};
    use promptlab_store::MemoryStore;

    fn playground() -> (Playground, MemoryStore) {
        let store = MemoryStore::new();
        (Playground::load(Arc::new(store.clone())), store)
    }

    #[test]
    fn test_create_prompt_becomes_current() {
        let (mut pg, store) = playground();
        let first = pg.create_prompt("First");
        let second = pg.create_prompt("Second");

        assert_eq!(pg.current_prompt_id(), Some(second.id.as_str()));
        assert_eq!(store.load_prompts().len(), 2);

        pg.select_prompt(&first.id).unwrap();
        assert_eq!(pg.current_prompt().unwrap().name, "First");
        assert!(pg.select_prompt("nope").is_err());
    }

    #[test]
    fn test_load_selects_first_prompt() {
        let store = MemoryStore::new();
        store.save_prompts(&[Prompt::new("a"), Prompt::new("b")]);

        let pg = Playground::load(Arc::new(store));
        assert_eq!(pg.current_prompt().unwrap().name, "a");
    }

    #[test]
    fn test_update_prompt() {
        let (mut pg, store) = playground();
        let prompt = pg.create_prompt("Greeter");

        let updated = pg
            .update_prompt(&prompt.id, PromptUpdate::new().template("Hi {{ name }}"))
            .unwrap();
        assert_eq!(updated.template, "Hi {{ name }}");
        assert_eq!(store.load_prompts()[0].template, "Hi {{ name }}");
        assert!(pg.update_prompt("missing", PromptUpdate::new()).is_err());
    }

    #[test]
    fn test_delete_prompt_cascades() {
        let (mut pg, store) = playground();
        let keep = pg.create_prompt("Keep");
        let doomed = pg.create_prompt("Doomed");

        pg.save_version(&doomed.id, Some("v1")).unwrap();
        pg.save_version(&keep.id, None).unwrap();
        pg.create_variable_set(&doomed.id, None).unwrap();
        pg.record_batch(BatchResult::new(doomed.id.clone(), Vec::new()));

        pg.delete_prompt(&doomed.id).unwrap();

        assert_eq!(pg.prompts().len(), 1);
        assert!(pg.versions_for(&doomed.id).is_empty());
        assert_eq!(pg.versions_for(&keep.id).len(), 1);
        assert!(pg.variable_sets_for(&doomed.id).is_empty());
        assert!(pg.outputs_for(&doomed.id).is_empty());
        assert_eq!(pg.current_prompt_id(), Some(keep.id.as_str()));

        assert_eq!(store.load_versions().len(), 1);
        assert!(!store.load_variable_sets().contains_key(&doomed.id));
        assert!(store.load_outputs().is_empty());
    }

    #[test]
    fn test_delete_last_prompt_clears_selection() {
        let (mut pg, _) = playground();
        let only = pg.create_prompt("Only");
        pg.delete_prompt(&only.id).unwrap();
        assert!(pg.current_prompt_id().is_none());
        assert!(matches!(pg.current_prompt(), Err(CoreError::NoPromptSelected)));
    }

    #[test]
    fn test_versions_restore_and_delete() {
        let (mut pg, _) = playground();
        let prompt = pg.create_prompt("Greeter");
        pg.update_prompt(&prompt.id, PromptUpdate::new().template("v1 {{ a }}"))
            .unwrap();
        let v1 = pg.save_version(&prompt.id, Some("first")).unwrap();

        pg.update_prompt(&prompt.id, PromptUpdate::new().template("v2 {{ b }}"))
            .unwrap();
        assert_eq!(pg.versions_for(&prompt.id).len(), 1);

        let restored = pg.restore_version(&v1.id).unwrap();
        assert_eq!(restored.template, "v1 {{ a }}");
        assert_eq!(pg.prompt(&prompt.id).unwrap().template, "v1 {{ a }}");

        pg.delete_version(&v1.id).unwrap();
        assert!(pg.versions_for(&prompt.id).is_empty());
        assert!(matches!(
            pg.restore_version(&v1.id),
            Err(CoreError::VersionNotFound(_))
        ));
    }

    #[test]
    fn test_variable_set_lifecycle() {
        let (mut pg, store) = playground();
        let prompt = pg.create_prompt("Greeter");
        pg.update_prompt(
            &prompt.id,
            PromptUpdate::new().template("{{ greeting }}, {{ name }}!"),
        )
        .unwrap();

        let set = pg.create_variable_set(&prompt.id, None).unwrap();
        assert_eq!(set.name, "Set 1");
        assert_eq!(set.variables.keys().collect::<Vec<_>>(), vec!["greeting", "name"]);

        pg.update_variable_value(&prompt.id, &set.id, "greeting", "Hello")
            .unwrap();
        pg.update_variable_value(&prompt.id, &set.id, "name", "Ada")
            .unwrap();

        let copy = pg.duplicate_variable_set(&prompt.id, &set.id).unwrap();
        assert_eq!(copy.name, "Set 1 (Copy)");
        assert_eq!(copy.variables["name"], "Ada");

        let named = pg.create_variable_set(&prompt.id, Some("Formal")).unwrap();
        assert_eq!(named.name, "Formal");
        assert_eq!(pg.variable_sets_for(&prompt.id).len(), 3);

        pg.rename_variable_set(&prompt.id, &copy.id, "Casual").unwrap();
        assert_eq!(pg.find_variable_set(&prompt.id, "Casual").unwrap().id, copy.id);

        pg.delete_variable_set(&prompt.id, &named.id).unwrap();
        assert_eq!(store.load_variable_sets()[&prompt.id].len(), 2);
        assert!(pg.delete_variable_set(&prompt.id, &named.id).is_err());
    }

    #[test]
    fn test_previews_follow_set_order() {
        let (mut pg, _) = playground();
        let prompt = pg.create_prompt("Greeter");
        pg.update_prompt(&prompt.id, PromptUpdate::new().template("Hello {{ name }}"))
            .unwrap();
        pg.replace_variable_sets(
            &prompt.id,
            vec![
                VariableSet::new("A").with_variable("name", "World"),
                VariableSet::new("B"),
            ],
        )
        .unwrap();

        let previews = pg.previews(&prompt.id).unwrap();
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].preview(), "Hello World");
        assert!(previews[1].error().is_some());
    }

    #[tokio::test]
    async fn test_run_records_batch_newest_first() {
        let (mut pg, store) = playground();
        let prompt = pg.create_prompt("Greeter");
        pg.update_prompt(&prompt.id, PromptUpdate::new().template("Hello {{ name }}"))
            .unwrap();
        pg.replace_variable_sets(
            &prompt.id,
            vec![
                VariableSet::new("A").with_variable("name", "World"),
                VariableSet::new("Broken"),
                VariableSet::new("C").with_variable("name", "Moon"),
            ],
        )
        .unwrap();

        let service = MockCompletionService::new()
            .on_prompt("Hello World", MockReply::success("Hi!"))
            .on_prompt("Hello Moon", MockReply::status(502));
        let executor = BatchExecutor::new(Arc::new(service.clone()));

        let first = pg.run(&executor, &prompt.id).await.unwrap().unwrap();
        assert_eq!(first.outputs.len(), 2);
        assert_eq!(first.outputs[0].set_name, "A");
        assert_eq!(first.outputs[0].content, "Hi!");
        assert_eq!(first.outputs[1].set_name, "C");
        assert!(first.outputs[1].error);

        let second = pg.run(&executor, &prompt.id).await.unwrap().unwrap();
        let history = pg.outputs_for(&prompt.id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
        assert_eq!(store.load_outputs().len(), 2);
        assert_eq!(service.call_count(), 4);
    }

    #[tokio::test]
    async fn test_run_without_valid_previews_dispatches_nothing() {
        let (mut pg, _) = playground();
        let prompt = pg.create_prompt("Empty");
        pg.create_variable_set(&prompt.id, None).unwrap();

        let service = MockCompletionService::new();
        let executor = BatchExecutor::new(Arc::new(service.clone()));

        assert!(pg.run(&executor, &prompt.id).await.unwrap().is_none());
        assert_eq!(service.call_count(), 0);
        assert!(pg.outputs_for(&prompt.id).is_empty());
    }

    #[test]
    fn test_ephemeral_playground() {
        let mut pg = Playground::ephemeral();
        let prompt = pg.create_prompt("Scratch");
        assert_eq!(pg.prompts().len(), 1);
        assert_eq!(pg.current_prompt().unwrap().id, prompt.id);
    }
}

//! The persistence collaborator.

use std::collections::BTreeMap;

use promptlab_runner::BatchResult;
use promptlab_templates::VariableSet;

use crate::models::{Prompt, PromptVersion};

/// Variable sets keyed by prompt id.
pub type VariableSetMap = BTreeMap<String, Vec<VariableSet>>;

/// Key-value persistence for the playground.
///
/// Reads return the last successfully written value or an empty default; they
/// never fail. Writes are fire-and-forget: backends log failures and carry on.
pub trait PlaygroundStore: Send + Sync {
    fn load_prompts(&self) -> Vec<Prompt>;
    fn save_prompts(&self, prompts: &[Prompt]);

    fn load_versions(&self) -> Vec<PromptVersion>;
    fn save_versions(&self, versions: &[PromptVersion]);

    fn load_variable_sets(&self) -> VariableSetMap;
    fn save_variable_sets(&self, sets: &VariableSetMap);

    /// Stored batch history, oldest first.
    fn load_outputs(&self) -> Vec<BatchResult> {
        Vec::new()
    }

    /// Record a finished batch.
    fn append_output(&self, _batch: &BatchResult) {}

    /// Drop recorded batches for a prompt.
    fn remove_outputs(&self, _prompt_id: &str) {}
}

/// Store used when no backend is available: reads are empty, writes vanish.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl PlaygroundStore for NoopStore {
    fn load_prompts(&self) -> Vec<Prompt> {
        Vec::new()
    }

    fn save_prompts(&self, _prompts: &[Prompt]) {}

    fn load_versions(&self) -> Vec<PromptVersion> {
        Vec::new()
    }

    fn save_versions(&self, _versions: &[PromptVersion]) {}

    fn load_variable_sets(&self) -> VariableSetMap {
        VariableSetMap::new()
    }

    fn save_variable_sets(&self, _sets: &VariableSetMap) {}
}

//! In-memory store.

use std::sync::Arc;

use parking_lot::RwLock;
use promptlab_runner::BatchResult;

use crate::models::{Prompt, PromptVersion};
use crate::store::{PlaygroundStore, VariableSetMap};

#[derive(Debug, Default)]
struct MemoryState {
    prompts: Vec<Prompt>,
    versions: Vec<PromptVersion>,
    variable_sets: VariableSetMap,
    outputs: Vec<BatchResult>,
    writes: usize,
}

/// Store keeping everything in process memory.
///
/// Clones share state, so a test can hand one clone to the playground and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write calls received.
    pub fn write_count(&self) -> usize {
        self.state.read().writes
    }
}

impl PlaygroundStore for MemoryStore {
    fn load_prompts(&self) -> Vec<Prompt> {
        self.state.read().prompts.clone()
    }

    fn save_prompts(&self, prompts: &[Prompt]) {
        let mut state = self.state.write();
        state.prompts = prompts.to_vec();
        state.writes += 1;
    }

    fn load_versions(&self) -> Vec<PromptVersion> {
        self.state.read().versions.clone()
    }

    fn save_versions(&self, versions: &[PromptVersion]) {
        let mut state = self.state.write();
        state.versions = versions.to_vec();
        state.writes += 1;
    }

    fn load_variable_sets(&self) -> VariableSetMap {
        self.state.read().variable_sets.clone()
    }

    fn save_variable_sets(&self, sets: &VariableSetMap) {
        let mut state = self.state.write();
        state.variable_sets = sets.clone();
        state.writes += 1;
    }

    fn load_outputs(&self) -> Vec<BatchResult> {
        self.state.read().outputs.clone()
    }

    fn append_output(&self, batch: &BatchResult) {
        let mut state = self.state.write();
        state.outputs.push(batch.clone());
        state.writes += 1;
    }

    fn remove_outputs(&self, prompt_id: &str) {
        let mut state = self.state.write();
        state.outputs.retain(|b| b.prompt_id != prompt_id);
        state.writes += 1;
    }
}

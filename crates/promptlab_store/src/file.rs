//! File-backed store.
//!
//! Playground data is stored in the workspace under `.promptlab/`:
//! ```text
//! .promptlab/
//! ├── prompts.json         # All prompts
//! ├── versions.json        # All prompt versions
//! ├── variable_sets.json   # Variable sets keyed by prompt id
//! └── outputs.jsonl        # Append-only batch history
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use promptlab_runner::BatchResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

use crate::error::StoreResult;
use crate::models::{Prompt, PromptVersion};
use crate::store::{PlaygroundStore, VariableSetMap};

const PROMPTS_FILE: &str = "prompts.json";
const VERSIONS_FILE: &str = "versions.json";
const VARIABLE_SETS_FILE: &str = "variable_sets.json";
const OUTPUTS_FILE: &str = "outputs.jsonl";

/// Store persisting JSON documents in a workspace directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Root path of the workspace
    workspace_root: PathBuf,
}

impl FileStore {
    /// Create a store for a workspace.
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            workspace_root: workspace_root.as_ref().to_path_buf(),
        }
    }

    /// Get the workspace root path
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Directory holding the data files
    pub fn data_dir(&self) -> PathBuf {
        self.workspace_root.join(".promptlab")
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir().join(file)
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> StoreResult<Option<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(value)?;
        self.write_atomic(file, content.as_bytes())?;
        debug!("Saved {}", file);
        Ok(())
    }

    /// Replace a data file in one step: write a sibling temp file, then
    /// rename it over the target. Readers see the old or the new content,
    /// never a partial write.
    fn write_atomic(&self, file: &str, content: &[u8]) -> StoreResult<()> {
        let dir = self.data_dir();
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(content)?;
        temp.as_file().sync_all()?;
        temp.persist(self.path(file)).map_err(|e| e.error)?;
        Ok(())
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        match self.read_json(file) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                error!("Failed to load {}: {}", file, e);
                T::default()
            }
        }
    }

    fn save_or_log<T: Serialize + ?Sized>(&self, file: &str, value: &T) {
        if let Err(e) = self.write_json(file, value) {
            error!("Failed to save {}: {}", file, e);
        }
    }

    fn read_outputs(&self) -> StoreResult<Vec<BatchResult>> {
        let path = self.path(OUTPUTS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut outputs = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<BatchResult>(&line) {
                Ok(batch) => outputs.push(batch),
                Err(e) => warn!("Skipping unreadable batch record: {}", e),
            }
        }
        Ok(outputs)
    }

    fn append_line(&self, batch: &BatchResult) -> StoreResult<()> {
        fs::create_dir_all(self.data_dir())?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(OUTPUTS_FILE))?;

        let json = serde_json::to_string(batch)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    fn rewrite_outputs(&self, outputs: &[BatchResult]) -> StoreResult<()> {
        let mut content = String::new();
        for batch in outputs {
            content.push_str(&serde_json::to_string(batch)?);
            content.push('\n');
        }
        self.write_atomic(OUTPUTS_FILE, content.as_bytes())
    }
}

impl PlaygroundStore for FileStore {
    fn load_prompts(&self) -> Vec<Prompt> {
        self.load_or_default(PROMPTS_FILE)
    }

    fn save_prompts(&self, prompts: &[Prompt]) {
        self.save_or_log(PROMPTS_FILE, prompts);
    }

    fn load_versions(&self) -> Vec<PromptVersion> {
        self.load_or_default(VERSIONS_FILE)
    }

    fn save_versions(&self, versions: &[PromptVersion]) {
        self.save_or_log(VERSIONS_FILE, versions);
    }

    fn load_variable_sets(&self) -> VariableSetMap {
        self.load_or_default(VARIABLE_SETS_FILE)
    }

    fn save_variable_sets(&self, sets: &VariableSetMap) {
        self.save_or_log(VARIABLE_SETS_FILE, sets);
    }

    fn load_outputs(&self) -> Vec<BatchResult> {
        self.read_outputs().unwrap_or_else(|e| {
            error!("Failed to load {}: {}", OUTPUTS_FILE, e);
            Vec::new()
        })
    }

    fn append_output(&self, batch: &BatchResult) {
        if let Err(e) = self.append_line(batch) {
            error!("Failed to append to {}: {}", OUTPUTS_FILE, e);
        }
    }

    fn remove_outputs(&self, prompt_id: &str) {
        let mut outputs = self.load_outputs();
        let before = outputs.len();
        outputs.retain(|b| b.prompt_id != prompt_id);
        if outputs.len() == before {
            return;
        }
        if let Err(e) = self.rewrite_outputs(&outputs) {
            error!("Failed to rewrite {}: {}", OUTPUTS_FILE, e);
        }
    }
}

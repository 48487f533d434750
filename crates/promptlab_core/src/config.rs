//! Workspace settings.
//!
//! Loaded from `<workspace>/.promptlab/settings.json`, then overridden by the
//! environment:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `OPENAI_API_KEY` (or `OPEN_AI_API_KEY`) | API key for the `openai` backend |
//! | `PROMPTLAB_BACKEND` | `openai`, `endpoint` or `mock` |
//! | `PROMPTLAB_MODEL` | model override |
//! | `PROMPTLAB_ENDPOINT` | URL for the `endpoint` backend |

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use promptlab_runner::{
    CompletionService, EndpointService, MockCompletionService, OpenAiService, RunnerError,
    DEFAULT_MAX_TOKENS,
};
use promptlab_templates::RenderOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};

/// Completion backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// OpenAI chat completions, called directly
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// A `{ prompt }` completion endpoint
    Endpoint,
    /// Offline echo service
    Mock,
}

impl std::str::FromStr for Backend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "endpoint" => Ok(Self::Endpoint),
            "mock" => Ok(Self::Mock),
            other => Err(CoreError::InvalidSettings(format!("unknown backend '{}'", other))),
        }
    }
}

/// Playground settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub render: RenderOptions,
    /// Only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            model: None,
            endpoint: None,
            openai_base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            render: RenderOptions::default(),
            api_key: None,
        }
    }
}

impl Settings {
    /// Settings file location for a workspace.
    pub fn path(workspace_root: &Path) -> PathBuf {
        workspace_root.join(".promptlab").join("settings.json")
    }

    /// Load settings for a workspace and apply environment overrides.
    pub fn load(workspace_root: &Path) -> CoreResult<Self> {
        let mut settings = Self::load_file(workspace_root)?;
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Load the settings file only; a missing file yields defaults.
    pub fn load_file(workspace_root: &Path) -> CoreResult<Self> {
        let path = Self::path(workspace_root);
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::InvalidSettings(format!("{}: {}", path.display(), e)))
    }

    /// Write the settings file.
    pub fn save(&self, workspace_root: &Path) -> CoreResult<()> {
        let path = Self::path(workspace_root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY").or_else(|| non_empty("OPEN_AI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(backend) = non_empty("PROMPTLAB_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(model) = non_empty("PROMPTLAB_MODEL") {
            self.model = Some(model);
        }
        if let Some(endpoint) = non_empty("PROMPTLAB_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        Ok(())
    }

    /// Build the configured completion service.
    pub fn build_service(&self) -> CoreResult<Arc<dyn CompletionService>> {
        let service: Arc<dyn CompletionService> = match self.backend {
            Backend::OpenAi => {
                let api_key = self.api_key.clone().ok_or_else(|| {
                    RunnerError::NotConfigured("set OPENAI_API_KEY".to_string())
                })?;
                let mut service =
                    OpenAiService::new(api_key, self.model.clone()).with_max_tokens(self.max_tokens);
                if let Some(base_url) = &self.openai_base_url {
                    service = service.with_base_url(base_url.as_str());
                }
                info!("Using OpenAI model {}", service.model());
                Arc::new(service)
            }
            Backend::Endpoint => {
                let url = self.endpoint.clone().ok_or_else(|| {
                    RunnerError::NotConfigured(
                        "set PROMPTLAB_ENDPOINT or \"endpoint\" in settings.json".to_string(),
                    )
                })?;
                info!("Using completion endpoint {}", url);
                Arc::new(EndpointService::new(url))
            }
            Backend::Mock => {
                info!("Using offline mock completion service");
                Arc::new(MockCompletionService::new())
            }
        };
        Ok(service)
    }
}

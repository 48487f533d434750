//! Persisted playground models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub template: String,
    /// Free-form JSON text kept alongside the template
    pub variables: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prompt {
    /// Create an empty prompt.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            template: String::new(),
            variables: "{}".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Apply a partial update and bump `updated_at`.
    pub fn apply(&mut self, update: PromptUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(template) = update.template {
            self.template = template;
        }
        if let Some(variables) = update.variables {
            self.variables = variables;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update of a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptUpdate {
    pub name: Option<String>,
    pub template: Option<String>,
    pub variables: Option<String>,
}

impl PromptUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn variables(mut self, variables: impl Into<String>) -> Self {
        self.variables = Some(variables.into());
        self
    }
}

/// Immutable snapshot of a prompt's template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVersion {
    pub id: String,
    pub prompt_id: String,
    pub template: String,
    pub variables: String,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl PromptVersion {
    /// Snapshot a prompt. A blank note is stored as empty.
    pub fn snapshot(prompt: &Prompt, note: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt_id: prompt.id.clone(),
            template: prompt.template.clone(),
            variables: prompt.variables.clone(),
            note: note.map(str::trim).unwrap_or_default().to_string(),
            created_at: Utc::now(),
        }
    }
}

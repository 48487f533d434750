//! Preview pipeline.
//!
//! Renders one template against every variable set. A failing set is reported
//! as data in its own outcome and never affects the other sets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::VariableSet;
use crate::renderer::TemplateRenderer;

/// Outcome of rendering the template for a single variable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderOutcome {
    #[serde(rename_all = "camelCase")]
    Failed { set_name: String, error: String },
    #[serde(rename_all = "camelCase")]
    Rendered { set_name: String, preview: String },
}

impl RenderOutcome {
    pub fn set_name(&self) -> &str {
        match self {
            Self::Rendered { set_name, .. } | Self::Failed { set_name, .. } => set_name,
        }
    }

    /// Rendered text; empty for failed outcomes.
    pub fn preview(&self) -> &str {
        match self {
            Self::Rendered { preview, .. } => preview,
            Self::Failed { .. } => "",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Rendered { .. } => None,
        }
    }

    /// Whether this outcome may be sent for completion.
    pub fn is_runnable(&self) -> bool {
        matches!(self, Self::Rendered { preview, .. } if !preview.is_empty())
    }
}

/// Computes render outcomes for all variable sets of a template.
#[derive(Debug, Clone, Default)]
pub struct PreviewPipeline {
    renderer: TemplateRenderer,
}

impl PreviewPipeline {
    pub fn new(renderer: TemplateRenderer) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Render the template once per set, preserving set order.
    pub fn compute(&self, template: &str, sets: &[VariableSet]) -> Vec<RenderOutcome> {
        sets.iter()
            .map(|set| match self.renderer.render(template, &set.variables) {
                Ok(preview) => RenderOutcome::Rendered {
                    set_name: set.name.clone(),
                    preview,
                },
                Err(err) => {
                    debug!("Preview for set '{}' failed: {}", set.name, err);
                    RenderOutcome::Failed {
                        set_name: set.name.clone(),
                        error: err.message().to_string(),
                    }
                }
            })
            .collect()
    }
}

/// Compute previews with a default renderer.
pub fn compute_previews(template: &str, sets: &[VariableSet]) -> Vec<RenderOutcome> {
    PreviewPipeline::default().compute(template, sets)
}

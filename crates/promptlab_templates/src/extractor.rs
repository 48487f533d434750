//! Variable extraction from template source.
//!
//! Only the head identifier of each `{{ ... }}` expression is collected:
//! `{{ user.name | upper }}` contributes `user`, `{{ 'literal' }}` contributes
//! nothing. Control-flow tags (`{% ... %}`) are not scanned.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static DEFAULT_EXTRACTOR: LazyLock<VariableExtractor> = LazyLock::new(VariableExtractor::new);

/// Extract the sorted, de-duplicated variable names referenced by a template.
pub fn extract_variables(template: &str) -> BTreeSet<String> {
    DEFAULT_EXTRACTOR.extract(template)
}

/// Scans templates for variable references.
#[derive(Debug, Clone)]
pub struct VariableExtractor {
    expression_pattern: Regex,
    identifier_pattern: Regex,
}

impl Default for VariableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self {
            // Shortest match up to the first closing `}}`, newlines included
            expression_pattern: Regex::new(r"(?s)\{\{(.*?)\}\}")
                .expect("expression pattern is a valid regex"),
            identifier_pattern: Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*")
                .expect("identifier pattern is a valid regex"),
        }
    }

    /// Extract variable names from a template.
    ///
    /// Total over any input: a template without expressions yields an empty set.
    pub fn extract(&self, template: &str) -> BTreeSet<String> {
        self.expression_pattern
            .captures_iter(template)
            .filter_map(|caps| {
                let expression = caps.get(1)?.as_str().trim();
                self.identifier_pattern
                    .find(expression)
                    .map(|m| m.as_str().to_string())
            })
            .collect()
    }
}

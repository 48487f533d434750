//! Variable set model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named mapping of variable name to raw string value.
///
/// Keys are not kept in sync with the variables a template references: stale
/// keys are ignored by rendering and missing ones render as undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl VariableSet {
    /// Create a set with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Seed an empty value for each of the given variable names.
    pub fn seeded<I, S>(name: impl Into<String>, variable_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(name);
        for var in variable_names {
            set.variables.insert(var.into(), String::new());
        }
        set
    }

    /// Builder-style value assignment.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Copy of this set under a fresh id and a `(Copy)` name.
    pub fn duplicate(&self) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: format!("{} (Copy)", self.name),
            variables: self.variables.clone(),
        }
    }
}

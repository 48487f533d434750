//! # promptlab_templates
//!
//! Template handling for promptlab.
//!
//! - **Extraction**: the variables a template references, sorted and unique
//! - **Values**: loose JSON-or-string decoding of variable set values
//! - **Rendering**: Jinja-style templates rendered per variable set
//! - **Previews**: one isolated render outcome per variable set
//!
//! ## Example
//!
//! ```rust
//! use promptlab_templates::{extract_variables, compute_previews, VariableSet};
//!
//! let template = "Write a {{ tone }} haiku about {{ topic }}.";
//! let vars: Vec<_> = extract_variables(template).into_iter().collect();
//! assert_eq!(vars, vec!["tone", "topic"]);
//!
//! let sets = vec![VariableSet::new("calm")
//!     .with_variable("tone", "calm")
//!     .with_variable("topic", "rain")];
//! let previews = compute_previews(template, &sets);
//! assert_eq!(previews[0].preview(), "Write a calm haiku about rain.");
//! ```

pub mod error;
pub mod extractor;
pub mod format;
pub mod models;
pub mod preview;
pub mod renderer;
pub mod value;

pub use error::{TemplateError, TemplateResult};
pub use extractor::{extract_variables, VariableExtractor};
pub use models::VariableSet;
pub use preview::{compute_previews, PreviewPipeline, RenderOutcome};
pub use renderer::{RenderOptions, TemplateRenderer, UndefinedPolicy};
pub use value::{decode_variables, VariableValue};

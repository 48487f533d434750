//! # promptlab_core
//!
//! Playground state for promptlab. A [`Playground`] owns the prompts, their
//! saved versions, the variable sets attached to each prompt and the batch
//! history, and persists every change through a
//! [`PlaygroundStore`](promptlab_store::PlaygroundStore).
//!
//! ```
//! use promptlab_core::Playground;
//! use promptlab_store::PromptUpdate;
//!
//! let mut playground = Playground::ephemeral();
//! let prompt = playground.create_prompt("Greeter");
//! playground
//!     .update_prompt(&prompt.id, PromptUpdate::new().template("Hello {{ name }}"))
//!     .unwrap();
//!
//! let set = playground.create_variable_set(&prompt.id, None).unwrap();
//! playground
//!     .update_variable_value(&prompt.id, &set.id, "name", "World")
//!     .unwrap();
//!
//! let previews = playground.previews(&prompt.id).unwrap();
//! assert_eq!(previews[0].preview(), "Hello World");
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod playground;

pub use config::{Backend, Settings};
pub use convert::{conversion_prompt, convert_source, strip_code_fence};
pub use error::{CoreError, CoreResult};
pub use playground::Playground;

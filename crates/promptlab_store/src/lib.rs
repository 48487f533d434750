//! # promptlab_store
//!
//! Persistence for promptlab: prompts, their version history, variable sets and
//! batch output history.
//!
//! The playground only talks to the [`PlaygroundStore`] trait. Backends:
//!
//! - [`FileStore`]: JSON files under `<workspace>/.promptlab/`
//! - [`MemoryStore`]: shared in-process state, for tests and embedding
//! - [`NoopStore`]: used when no backend is available

pub mod error;
pub mod file;
pub mod memory;
pub mod models;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use models::{Prompt, PromptUpdate, PromptVersion};
pub use store::{NoopStore, PlaygroundStore, VariableSetMap};

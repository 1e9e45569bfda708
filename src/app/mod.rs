//! Application layer
//!
//! The state store that owns the dataset in memory, and the context that
//! wires it to persistence and remote backup.

pub mod context;
pub mod store;

pub use context::AppContext;
pub use store::{AppStore, ChangeListener};

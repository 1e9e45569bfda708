//! Synchronization between local storage and the remote backup

pub mod coordinator;
pub mod debounce;

pub use coordinator::{SyncCoordinator, SyncState};
pub use debounce::Debouncer;

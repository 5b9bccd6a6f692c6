//! Tabula Store - stateful orchestration around the pure engine
//!
//! - [`TableStore`] owns the active table's canonical data and presentation state
//! - [`TableEditService`] drives optimistic edits and column migrations against a backend
//! - [`TabulaSettings`] holds grid and search preferences

mod error;
mod pending;
mod service;
mod settings;
mod store;
mod view;

pub use error::{StoreError, StoreResult};
pub use pending::PendingUpdates;
pub use service::{EditOutcome, TableEditService};
pub use settings::*;
pub use store::TableStore;
pub use view::ViewState;

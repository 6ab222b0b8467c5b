//! cadence-store: persistence for users and tasks.
//!
//! A single JSON document on disk, in the same spirit as the CLI's other `~/.cadence/*`
//! state files. The engine never writes; this crate applies its decisions.

pub mod error;
pub mod query;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use query::{NewTask, RecurrenceInput, StatusFilter, TaskEdit, MAX_CUSTOM_DAYS};
pub use store::{CompletionOutcome, Store, StoreDoc, STORE_FILE};

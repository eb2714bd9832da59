//! Core business logic - framework-agnostic roster state, persistence and sharing.

/// Text collaborator boundary and published ledger analysis
pub mod assistant;
/// Startup choice between a share link and the local store
pub mod bootstrap;
/// Validated construction of new records
pub mod forms;
/// Ledger totals and the dashboard digest
pub mod ledger;
/// Address handling for share links
pub mod location;
/// Roster controller and mutation operations
pub mod roster;
/// Share-token encoding and decoding
pub mod snapshot;
/// Persistent per-collection store
pub mod store;

pub use bootstrap::{BootstrapOutcome, ConfirmAdoption, InboundLink};
pub use roster::{Roster, RosterChange};
pub use store::{DatabaseStore, EmptyWritePolicy, KeyValueStore, MemoryStore, RosterStore};

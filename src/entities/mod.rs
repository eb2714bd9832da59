//! Entity module - `SeaORM` entity definitions for the database backend.
//! Roster collections are stored as JSON documents in a single key-value table.

pub mod kv_entry;

pub use kv_entry::{Column as KvEntryColumn, Entity as KvEntry, Model as KvEntryModel};

//! Fallback Journal Store
//!
//! An in-process, ordered list of journal entries that the gateway serves
//! when the backend cannot be reached or reports an error.
//!
//! ## Properties
//! - **Ordering**: Entries are kept in insertion order; listing is a plain slice.
//! - **Lookup**: Linear scan on `id`. The store is small and lives only as long as the process.
//! - **Locking**: Every operation holds the store lock for its whole duration.
//! - **Durability**: None. Contents are lost on restart and re-seeded with two sample entries.

pub mod store;
pub mod types;

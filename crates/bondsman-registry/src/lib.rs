//! Bondsman registry
//!
//! The bond registry, its persistence seam, and the [`BondEngine`] context
//! that wires a registry to a fee ledger and a store.

pub mod engine;
pub mod error;
pub mod registry;
pub mod store;

pub use engine::{BondEngine, NOTIFICATION_CAPACITY};
pub use error::RegistryError;
pub use registry::BondRegistry;
pub use store::{BondStore, MemoryStore, StoreError, StoreJournal};

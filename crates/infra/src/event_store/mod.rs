//! Append-only event store boundary.
//!
//! This module defines an infrastructure-facing abstraction for storing and
//! loading per-aggregate event streams without making any storage assumptions.
//! The in-memory implementation backs tests and single-process deployments; a
//! database-backed implementation can slot in behind the same trait.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

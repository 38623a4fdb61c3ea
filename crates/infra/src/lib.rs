//! Infrastructure layer: event persistence and command orchestration.
//!
//! Domain crates stay pure; this crate owns the event store boundary and the
//! dispatch pipeline that loads, rehydrates, decides and persists.

pub mod command_dispatcher;
pub mod event_store;


pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use event_store::{EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent};

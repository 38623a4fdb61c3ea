//! Command execution pipeline (application-level orchestration).
//!
//! Implements the command dispatch pattern for event-sourced aggregates:
//!
//! ```text
//! Command
//!   ↓
//! 1. Load events from store
//!   ↓
//! 2. Rehydrate aggregate (apply history to rebuild state)
//!   ↓
//! 3. Handle command (pure decision logic, produces events)
//!   ↓
//! 4. Persist events (append-only, optimistic concurrency check)
//! ```
//!
//! The pipeline is identical for every aggregate, so it lives here once
//! instead of being duplicated per handler. It is also where per-invoice
//! serializability is enforced: the append carries the exact stream version
//! the command was decided against, so two concurrent mutations of the same
//! invoice cannot race past each other. The loser gets a concurrency error
//! and retries against the refreshed stream, and no payment's effect on the
//! balance is ever silently lost.
//!
//! This module contains no IO itself; it composes the `EventStore` trait.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use fleetbooks_core::{Aggregate, AggregateId, DomainError, Event, ExpectedVersion};

use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug)]
pub enum DispatchError {
    /// Optimistic concurrency failure (e.g. stale aggregate version).
    Concurrency(String),
    /// Domain validation failure (deterministic).
    Validation(String),
    /// Operation illegal for the aggregate's current state.
    InvalidState(String),
    /// Domain-level not found.
    NotFound,
    /// External dataset record missing an expected field.
    DataIntegrity(String),
    /// Failed to deserialize historical event payloads into the aggregate event type.
    Deserialize(String),
    /// Persisting to the event store failed.
    Store(EventStoreError),
}

impl From<EventStoreError> for DispatchError {
    fn from(value: EventStoreError) -> Self {
        match &value {
            EventStoreError::Concurrency(msg) => DispatchError::Concurrency(msg.clone()),
            _ => DispatchError::Store(value),
        }
    }
}

impl From<DomainError> for DispatchError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => DispatchError::Validation(msg),
            DomainError::InvalidState(msg) => DispatchError::InvalidState(msg),
            DomainError::InvalidId(msg) => DispatchError::Validation(msg),
            DomainError::NotFound => DispatchError::NotFound,
            DomainError::Conflict(msg) => DispatchError::Concurrency(msg),
            DomainError::DataIntegrity(msg) => DispatchError::DataIntegrity(msg),
        }
    }
}

/// Reusable command execution engine for event-sourced aggregates.
///
/// Sits between callers (HTTP handlers, schedulers, imports) and the event
/// store, giving every command the same execution model while domain code
/// stays pure. The `make_aggregate` factory closure lets the dispatcher work
/// with any aggregate type without knowing how to construct one
/// (e.g. `Invoice::empty(id)`).
///
/// ## Execution guarantees
///
/// - Events are decided against the loaded stream version and appended with
///   `ExpectedVersion::Exact` of that version; a concurrent writer makes the
///   append fail with [`DispatchError::Concurrency`], and the caller retries
///   by re-dispatching (load, decide, append run again against fresh state).
/// - An aggregate's whole decision (e.g. payment plus derived status) lands in
///   one append, so readers never observe a half-applied mutation.
#[derive(Debug)]
pub struct CommandDispatcher<S> {
    store: S,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> CommandDispatcher<S>
where
    S: EventStore,
{
    /// Dispatch a command through the full pipeline: load, rehydrate, decide,
    /// persist. Returns the committed events with their assigned sequence
    /// numbers.
    pub fn dispatch<A>(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        command: A::Command,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<Vec<StoredEvent>, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Event: Event + Serialize + DeserializeOwned,
    {
        // 1) Load history
        let history = self.store.load_stream(aggregate_id)?;
        validate_loaded_stream(aggregate_id, &history)?;
        let expected = ExpectedVersion::Exact(stream_version(&history));

        // 2) Rehydrate aggregate
        let mut aggregate = make_aggregate(aggregate_id);
        apply_history::<A>(&mut aggregate, &history)?;

        // 3) Decide events (no mutation)
        let decided = aggregate.handle(&command).map_err(DispatchError::from)?;
        if decided.is_empty() {
            return Ok(vec![]);
        }

        // 4) Persist (append-only, optimistic)
        let aggregate_type = aggregate_type.into();
        let uncommitted = decided
            .iter()
            .map(|ev| {
                UncommittedEvent::from_typed(aggregate_id, aggregate_type.clone(), Uuid::now_v7(), ev)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let committed = self.store.append(uncommitted, expected)?;

        tracing::debug!(
            %aggregate_id,
            aggregate_type = %aggregate_type,
            events = committed.len(),
            stream_version = committed.last().map(|e| e.sequence_number).unwrap_or(0),
            "command dispatched"
        );

        Ok(committed)
    }

    /// Rebuild an aggregate's current state from its stream (read path).
    pub fn rehydrate<A>(
        &self,
        aggregate_id: AggregateId,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<A, DispatchError>
    where
        A: Aggregate,
        A::Event: DeserializeOwned,
    {
        let history = self.store.load_stream(aggregate_id)?;
        validate_loaded_stream(aggregate_id, &history)?;

        let mut aggregate = make_aggregate(aggregate_id);
        apply_history::<A>(&mut aggregate, &history)?;
        Ok(aggregate)
    }
}

fn stream_version(stream: &[StoredEvent]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

fn validate_loaded_stream(
    aggregate_id: AggregateId,
    stream: &[StoredEvent],
) -> Result<(), DispatchError> {
    // A loaded stream must belong to the requested aggregate and be
    // strictly increasing by sequence number.
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.aggregate_id != aggregate_id {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(
                format!("loaded stream contains wrong aggregate_id at index {idx}"),
            )));
        }
        if e.sequence_number == 0 {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(
                "stored event has sequence_number=0".to_string(),
            )));
        }
        if e.sequence_number <= last {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            ))));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history<A>(aggregate: &mut A, history: &[StoredEvent]) -> Result<(), DispatchError>
where
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    // Ensure deterministic ordering.
    let mut sorted = history.to_vec();
    sorted.sort_by_key(|e| e.sequence_number);

    for stored in sorted {
        let ev: A::Event = serde_json::from_value(stored.payload)
            .map_err(|e| DispatchError::Deserialize(e.to_string()))?;
        aggregate.apply(&ev);
    }

    Ok(())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use fleetbooks_core::{AggregateId, Event, ExpectedVersion};
use std::sync::Arc;

/// An event ready to be appended to a stream (not yet assigned a sequence
/// number).
///
/// Built from a typed domain event via [`UncommittedEvent::from_typed`], which
/// serializes the payload to JSON and captures the metadata needed to
/// deserialize it again later (`event_type`, `event_version`, `occurred_at`).
/// The store assigns sequence numbers during append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub event_id: Uuid,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

/// A persisted event with its assigned stream position.
///
/// ## Sequence numbers
///
/// Assigned by the store during append, scoped per aggregate stream, and
/// monotonically increasing (1, 2, 3, ...) with no gaps. They give the replay
/// ordering and are what optimistic concurrency checks compare against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,

    /// Monotonically increasing position in the aggregate stream.
    pub sequence_number: u64,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl StoredEvent {
    pub fn stream_version(&self) -> u64 {
        self.sequence_number
    }
}

/// Event store operation error.
///
/// Infrastructure failures (storage, concurrency, stream shape), as opposed to
/// domain errors the aggregates raise themselves.
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("aggregate type mismatch: {0}")]
    AggregateTypeMismatch(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),
}

/// Append-only event store.
///
/// Events are organized into streams, one stream per aggregate instance,
/// keyed by `aggregate_id`. Within a stream, sequence numbers increase
/// monotonically from 1.
///
/// ## Append semantics
///
/// `append()` validates that the whole batch targets one aggregate and one
/// aggregate type, checks optimistic concurrency against the current stream
/// version, assigns sequence numbers starting at `current_version + 1`, and
/// persists the batch atomically (all or nothing). Appends to the same invoice
/// therefore serialize: of two concurrent payments, exactly one wins and the
/// other fails the version check and retries against the refreshed stream.
///
/// ## Load semantics
///
/// `load_stream()` returns the full stream in sequence order; an absent
/// stream is an empty vector, not an error (the aggregate was never created).
pub trait EventStore: Send + Sync {
    /// Append events to an aggregate stream (append-only).
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Load the full stream for an aggregate.
    fn load_stream(&self, aggregate_id: AggregateId) -> Result<Vec<StoredEvent>, EventStoreError>;
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).append(events, expected_version)
    }

    fn load_stream(&self, aggregate_id: AggregateId) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_stream(aggregate_id)
    }
}

impl UncommittedEvent {
    /// Convenience constructor from a typed domain event.
    ///
    /// Keeps infra decoupled from business code while still capturing the
    /// metadata needed for future deserialization.
    pub fn from_typed<E>(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        event_id: Uuid,
        event: &E,
    ) -> Result<Self, EventStoreError>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(event).map_err(|e| {
            EventStoreError::InvalidAppend(format!("payload serialization failed: {e}"))
        })?;

        Ok(Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }
}

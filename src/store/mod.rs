use std::future::Future;

use snafu::{Location, Snafu};

use crate::model::{Counter, EventId};

pub use memory::MemoryStore;
pub use surreal::SurrealStore;

mod memory;
mod surreal;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("event `{event}` does not exist"))]
    NotFound {
        event: EventId,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to update `{counter}` of event `{event}`: {source}"))]
    Query {
        event: EventId,
        counter: Counter,
        source: crate::database::DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },
}

/// A document store that can atomically add to a numeric field of an event.
///
/// Implementations must apply the delta in a single operation on the store side. Concurrent calls for the same
/// event and counter must never lose an update, which rules out reading the current value and writing it back.
pub trait CounterStore: Send + Sync {
    /// Add `delta` (which may be negative) to `counter` of `event`.
    ///
    /// Fails with [StoreError::NotFound] if the event does not exist. Nothing is created in that case.
    fn increment(
        &self,
        event: &EventId,
        counter: Counter,
        delta: i64,
    ) -> impl Future<Output = Result<()>> + Send;
}

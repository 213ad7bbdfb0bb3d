use derive_new::new;
use snafu::{OptionExt as _, ResultExt as _};
use tracing::instrument;

use super::{CounterStore, NotFoundSnafu, QuerySnafu, Result};
use crate::database::{Database, Sql as _};
use crate::model::{Counter, Event, EventId};

// Targets the record directly. The guard fails for a record that does not exist yet, so a missing event is never
// created and the statement returns nothing.
const INCREMENT_VIEWS: &str = "UPDATE $event SET viewsCount += $delta WHERE id != NONE RETURN AFTER";
const INCREMENT_LIKES: &str = "UPDATE $event SET likesCount += $delta WHERE id != NONE RETURN AFTER";
const INCREMENT_COMMENTS: &str = "UPDATE $event SET commentsCount += $delta WHERE id != NONE RETURN AFTER";

/// A [CounterStore] backed by SurrealDB. Every increment is a single `UPDATE` statement.
#[derive(Debug, Clone, new)]
pub struct SurrealStore {
    database: Database,
}

impl CounterStore for SurrealStore {
    #[instrument(skip(self, event), fields(event = %event))]
    async fn increment(&self, event: &EventId, counter: Counter, delta: i64) -> Result<()> {
        let query = match counter {
            Counter::Views => INCREMENT_VIEWS,
            Counter::Likes => INCREMENT_LIKES,
            Counter::Comments => INCREMENT_COMMENTS,
        };

        let updated: Vec<Event> = self
            .database
            .sql(query)
            .bind(("event", event.thing()))
            .bind(("delta", delta))
            .fetch_first()
            .await
            .context(QuerySnafu { event: event.clone(), counter })?;

        let updated = updated
            .first()
            .context(NotFoundSnafu { event: event.clone() })?;

        tracing::debug!(%counter, delta, value = updated.get(counter), "updated counter");
        Ok(())
    }
}

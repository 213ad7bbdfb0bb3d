//! Keeps `likesCount` and `commentsCount` of an event in step with its `likes` and `comments` subcollections.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt as _;
use snafu::{OptionExt as _, ResultExt as _};
use tracing::instrument;

use crate::model::{Counter, EventId};
use crate::store::CounterStore;
use crate::trigger::{
    Change, InvalidParamSnafu, MissingParamSnafu, Params, PathError, StoreSnafu, TriggerError, TriggerHandler,
    Triggers,
};

pub const LIKES: &str = "events/{eventId}/likes/{userId}";
pub const COMMENTS: &str = "events/{eventId}/comments/{commentId}";

const EVENT_ID: &str = "eventId";

/// How a write to a child document moves its parent's counter.
///
/// | before | after  | transition  |
/// |--------|--------|-------------|
/// | absent | exists | `Increment` |
/// | exists | absent | `Decrement` |
/// | exists | exists | `Ignore`    |
/// | absent | absent | `Ignore`    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Increment,
    Decrement,
    Ignore,
}

impl Transition {
    pub fn of(change: Change) -> Self {
        match (change.before.exists(), change.after.exists()) {
            (false, true) => Transition::Increment,
            (true, false) => Transition::Decrement,
            _ => Transition::Ignore,
        }
    }

    pub fn delta(self) -> Option<i64> {
        match self {
            Transition::Increment => Some(1),
            Transition::Decrement => Some(-1),
            Transition::Ignore => None,
        }
    }
}

/// Counts the children of an event in one counter field.
///
/// Every created child adds one and every deleted child removes one. Redelivery of the same write is counted again.
#[derive(Debug)]
pub struct CounterSync<S> {
    store: Arc<S>,
    counter: Counter,
}

impl<S: CounterStore> CounterSync<S> {
    pub fn new(store: Arc<S>, counter: Counter) -> Self {
        Self { store, counter }
    }

    #[instrument(skip(self, params), fields(counter = %self.counter))]
    pub async fn apply(&self, change: Change, params: &Params) -> Result<Transition, TriggerError> {
        let event = params
            .get(EVENT_ID)
            .context(MissingParamSnafu { name: EVENT_ID })?
            .parse::<EventId>()
            .context(InvalidParamSnafu { name: EVENT_ID })?;

        let transition = Transition::of(change);
        let Some(delta) = transition.delta() else {
            tracing::debug!(%event, "content-only change, counter untouched");
            return Ok(transition);
        };

        self.store
            .increment(&event, self.counter, delta)
            .await
            .context(StoreSnafu)?;

        tracing::info!(%event, delta, "synced counter");
        Ok(transition)
    }
}

impl<S: CounterStore + 'static> TriggerHandler for CounterSync<S> {
    fn on_write<'a>(&'a self, change: Change, params: &'a Params) -> BoxFuture<'a, Result<(), TriggerError>> {
        self.apply(change, params).map(|result| result.map(drop)).boxed()
    }
}

/// Keeps `likesCount` in sync with `events/{eventId}/likes/{userId}`.
pub fn like_count_sync<S: CounterStore>(store: Arc<S>) -> CounterSync<S> {
    CounterSync::new(store, Counter::Likes)
}

/// Keeps `commentsCount` in sync with `events/{eventId}/comments/{commentId}`.
pub fn comment_count_sync<S: CounterStore>(store: Arc<S>) -> CounterSync<S> {
    CounterSync::new(store, Counter::Comments)
}

/// Registers both counter syncs on their subcollections.
pub fn triggers<S: CounterStore + 'static>(store: Arc<S>) -> Result<Triggers, PathError> {
    Triggers::new()
        .on_write(LIKES, like_count_sync(store.clone()))?
        .on_write(COMMENTS, comment_count_sync(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Event;
    use crate::store::MemoryStore;
    use crate::trigger::{DocumentPath, Snapshot};

    fn event_id() -> EventId {
        "e1".parse().unwrap()
    }

    fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert(event_id(), Event::new(0, 2, 2));
        Arc::new(store)
    }

    fn params() -> Params {
        [("eventId", "e1"), ("userId", "u1")].into_iter().collect()
    }

    fn counts(store: &MemoryStore) -> Event {
        store.get(&event_id()).unwrap()
    }

    #[test]
    fn transition_table() {
        use Snapshot::*;

        let cases = [
            (Absent, Exists, Transition::Increment),
            (Exists, Absent, Transition::Decrement),
            (Exists, Exists, Transition::Ignore),
            (Absent, Absent, Transition::Ignore),
        ];

        for (before, after, expected) in cases {
            assert_eq!(Transition::of(Change { before, after }), expected, "{before:?} -> {after:?}");
        }
    }

    #[tokio::test]
    async fn like_created_increments() {
        let store = store();
        let sync = like_count_sync(store.clone());

        sync.apply(Change::created(), &params()).await.unwrap();

        assert_eq!(counts(&store), Event::new(0, 3, 2));
    }

    #[tokio::test]
    async fn like_deleted_decrements() {
        let store = store();
        let sync = like_count_sync(store.clone());

        sync.apply(Change::deleted(), &params()).await.unwrap();

        assert_eq!(counts(&store), Event::new(0, 1, 2));
    }

    #[tokio::test]
    async fn like_edited_is_ignored() {
        let store = store();
        let sync = like_count_sync(store.clone());

        let transition = sync.apply(Change::updated(), &params()).await.unwrap();

        assert_eq!(transition, Transition::Ignore);
        assert_eq!(counts(&store), Event::new(0, 2, 2));
    }

    #[tokio::test]
    async fn comments_are_counted_independently_of_likes() {
        let store = store();
        let comments = comment_count_sync(store.clone());
        let params: Params = [("eventId", "e1"), ("commentId", "c1")].into_iter().collect();

        comments.apply(Change::created(), &params).await.unwrap();
        comments.apply(Change::created(), &params).await.unwrap();
        comments.apply(Change::deleted(), &params).await.unwrap();
        comments.apply(Change::updated(), &params).await.unwrap();

        assert_eq!(counts(&store), Event::new(0, 2, 3));
    }

    #[tokio::test]
    async fn missing_event_is_reported() {
        let store = Arc::new(MemoryStore::new());
        let sync = like_count_sync(store);

        let result = sync.apply(Change::created(), &params()).await;

        assert!(matches!(result, Err(TriggerError::Store { .. })));
    }

    #[tokio::test]
    async fn missing_event_param_is_reported() {
        let sync = like_count_sync(store());
        let params: Params = [("userId", "u1")].into_iter().collect();

        let result = sync.apply(Change::created(), &params).await;

        assert!(matches!(result, Err(TriggerError::MissingParam { .. })));
    }

    #[tokio::test]
    async fn registered_triggers_route_by_collection() {
        let store = store();
        let triggers = triggers(store.clone()).unwrap();

        let like: DocumentPath = "events/e1/likes/u1".parse().unwrap();
        let comment: DocumentPath = "events/e1/comments/c1".parse().unwrap();

        triggers.dispatch(&like, Change::created()).await.unwrap();
        triggers.dispatch(&comment, Change::deleted()).await.unwrap();

        assert_eq!(counts(&store), Event::new(0, 3, 1));
    }
}

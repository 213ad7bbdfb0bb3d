use std::sync::Arc;

use serde::{Deserialize, Serialize};
use snafu::{Location, OptionExt as _, Snafu};
use tracing::instrument;

use crate::auth::Caller;
use crate::model::{Counter, EventId};
use crate::store::{CounterStore, StoreError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ViewError {
    #[snafu(display("Sign in first."))]
    Unauthenticated {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("eventId is required"))]
    InvalidArgument {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(transparent)]
    Store { source: StoreError },
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ViewRequest {
    #[serde(rename = "eventId", default)]
    event_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

/// Counts a view of an event for an authenticated caller.
///
/// There is no deduplication: each successful call adds exactly one view.
#[derive(Debug)]
pub struct ViewIncrementer<S> {
    store: Arc<S>,
}

impl<S> Clone for ViewIncrementer<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: CounterStore> ViewIncrementer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Handle a call whose payload is `{"eventId": "<id>"}`.
    ///
    /// The caller is checked before the payload, so an anonymous call is rejected whatever it carries.
    #[instrument(skip(self, data), fields(uid = caller.map(|caller| caller.uid.as_str())))]
    pub async fn call(&self, caller: Option<&Caller>, data: serde_json::Value) -> Result<Ack, ViewError> {
        caller.context(UnauthenticatedSnafu)?;

        let event = serde_json::from_value::<ViewRequest>(data)
            .ok()
            .and_then(|request| request.event_id)
            .and_then(|id| id.parse::<EventId>().ok())
            .context(InvalidArgumentSnafu)?;

        self.store.increment(&event, Counter::Views, 1).await?;

        tracing::info!(%event, "counted view");
        Ok(Ack { ok: true })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Event;
    use crate::store::MemoryStore;

    fn caller() -> Caller {
        Caller { uid: "u1".to_string() }
    }

    fn setup() -> (Arc<MemoryStore>, ViewIncrementer<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.insert("e1".parse().unwrap(), Event::default());
        (store.clone(), ViewIncrementer::new(store))
    }

    fn views(store: &MemoryStore) -> Event {
        store.get(&"e1".parse().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn counts_one_view_per_call() {
        let (store, views_of) = setup();

        let ack = views_of.call(Some(&caller()), json!({ "eventId": "e1" })).await.unwrap();

        assert_eq!(ack, Ack { ok: true });
        assert_eq!(views(&store), Event::new(1, 0, 0));
    }

    #[tokio::test]
    async fn anonymous_calls_are_rejected_whatever_the_payload() {
        let (store, views_of) = setup();

        for data in [json!({ "eventId": "e1" }), json!({ "eventId": "" }), json!(null)] {
            let result = views_of.call(None, data).await;
            assert!(matches!(result, Err(ViewError::Unauthenticated { .. })));
        }

        assert_eq!(views(&store), Event::default());
    }

    #[tokio::test]
    async fn missing_or_empty_event_id_is_invalid() {
        let (store, views_of) = setup();

        for data in [json!({}), json!({ "eventId": "" }), json!({ "eventId": 5 }), json!(null)] {
            let result = views_of.call(Some(&caller()), data.clone()).await;
            assert!(
                matches!(result, Err(ViewError::InvalidArgument { .. })),
                "payload {data} should be rejected"
            );
        }

        assert_eq!(views(&store), Event::default());
    }

    #[tokio::test]
    async fn unknown_event_is_propagated() {
        let (_, views_of) = setup();

        let result = views_of.call(Some(&caller()), json!({ "eventId": "ghost" })).await;

        assert!(matches!(
            result,
            Err(ViewError::Store {
                source: StoreError::NotFound { .. }
            })
        ));
    }
}

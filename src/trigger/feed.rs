//! Delivers writes to child tables as [Change]s using SurrealDB live queries.
//!
//! Child documents are keyed by an array id holding the wildcard values of their path, so
//! `likes:['e1', 'u1']` is the document at `events/e1/likes/u1`.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt as _;
use serde::Deserialize;
use snafu::{Location, ResultExt as _, Snafu};
use surrealdb::sql::{Id, Thing, Value};
use surrealdb::{Action, Notification};
use tokio::task::JoinHandle;

use super::{Change, DocumentPath, PathPattern, Triggers};
use crate::database::Database;

#[derive(Debug, Snafu)]
pub enum FeedError {
    #[snafu(display("failed to subscribe to changes on `{table}`: {source}"))]
    Subscription {
        table: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Deserialize)]
struct Child {
    id: Thing,
}

/// Maps a live query action to the existence change it represents.
pub fn change_of(action: Action) -> Option<Change> {
    match action {
        Action::Create => Some(Change::created()),
        Action::Update => Some(Change::updated()),
        Action::Delete => Some(Change::deleted()),
        _ => None,
    }
}

/// Resolves the path of a child document from its record id.
pub fn path_of(pattern: &PathPattern, thing: &Thing) -> Option<DocumentPath> {
    if pattern.collection() != Some(thing.tb.as_str()) {
        return None;
    }

    let Id::Array(parts) = &thing.id else {
        return None;
    };

    // only string parts name documents, `likes:[1, 'u1']` is not under `events:1`
    let values = parts
        .iter()
        .map(|part| match part {
            Value::Strand(text) => Some(text.as_str().to_owned()),
            _ => None,
        })
        .collect::<Option<Vec<String>>>()?;

    pattern.fill(values)
}

/// Subscribe to every table watched by `triggers` and dispatch their writes in background tasks.
///
/// A failing trigger is logged and the feed moves on to the next write.
pub async fn spawn(database: &Database, triggers: Arc<Triggers>) -> Result<Vec<JoinHandle<()>>, FeedError> {
    let mut watched = HashSet::new();
    let mut tasks = Vec::new();

    let patterns: Vec<PathPattern> = triggers.patterns().cloned().collect();
    for pattern in patterns {
        let Some(table) = pattern.collection().map(str::to_owned) else {
            continue;
        };

        if !watched.insert(table.clone()) {
            continue;
        }

        let stream = database
            .select::<Vec<Child>>(table.as_str())
            .live()
            .into_owned()
            .await
            .context(SubscriptionSnafu { table: &table })?;

        tracing::info!(%table, %pattern, "watching for changes");

        let triggers = triggers.clone();
        tasks.push(tokio::spawn(async move {
            futures::pin_mut!(stream);

            while let Some(notification) = stream.next().await {
                let Notification { action, data, .. } = match notification {
                    Ok(notification) => notification,
                    Err(error) => {
                        tracing::error!(%table, %error, "could not receive change notification");
                        continue;
                    }
                };

                let Some(change) = change_of(action) else {
                    continue;
                };

                let Some(path) = path_of(&pattern, &data.id) else {
                    tracing::warn!(record = %data.id, %pattern, "record id does not map to a document path");
                    continue;
                };

                if let Err(error) = triggers.dispatch(&path, change).await {
                    tracing::error!(%path, ?change, %error, "failed to process change");
                }
            }

            tracing::warn!(%table, "change feed ended");
        }));
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use surrealdb::sql::Array;

    use super::*;
    use crate::trigger::Snapshot;

    fn likes() -> PathPattern {
        PathPattern::parse("events/{eventId}/likes/{userId}").unwrap()
    }

    fn record(table: &str, parts: Vec<&str>) -> Thing {
        let parts: Vec<Value> = parts.into_iter().map(Value::from).collect();

        Thing {
            tb: table.to_string(),
            id: Id::Array(Array::from(parts)),
        }
    }

    #[test]
    fn actions_map_to_existence_changes() {
        let created = change_of(Action::Create).unwrap();
        assert_eq!((created.before, created.after), (Snapshot::Absent, Snapshot::Exists));

        let deleted = change_of(Action::Delete).unwrap();
        assert_eq!((deleted.before, deleted.after), (Snapshot::Exists, Snapshot::Absent));

        let updated = change_of(Action::Update).unwrap();
        assert_eq!((updated.before, updated.after), (Snapshot::Exists, Snapshot::Exists));
    }

    #[test]
    fn array_id_resolves_to_path() {
        let path = path_of(&likes(), &record("likes", vec!["e1", "u1"])).unwrap();
        assert_eq!(path.to_string(), "events/e1/likes/u1");
    }

    #[test]
    fn foreign_table_is_ignored() {
        assert_eq!(path_of(&likes(), &record("comments", vec!["e1", "c1"])), None);
    }

    #[test]
    fn non_string_key_part_is_ignored() {
        let parts = vec![Value::from(1i64), Value::from("u1")];
        let thing = Thing {
            tb: "likes".to_string(),
            id: Id::Array(Array::from(parts)),
        };

        assert_eq!(path_of(&likes(), &thing), None);
    }

    #[test]
    fn plain_id_is_ignored() {
        let thing = Thing::from(("likes".to_string(), "u1".to_string()));
        assert_eq!(path_of(&likes(), &thing), None);
    }
}

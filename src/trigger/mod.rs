//! Subscriptions of handlers to writes under a document path.
//!
//! A [Triggers] registry maps [PathPattern]s to [TriggerHandler]s. Whatever delivers the writes (the live feed in
//! [feed], or a test feeding synthetic snapshots) hands each one to [Triggers::dispatch] as a [DocumentPath] and a
//! [Change].

use std::sync::Arc;

use futures::future::BoxFuture;
use snafu::{Location, Snafu};

use crate::model::EmptyEventId;
use crate::store::StoreError;

pub use path::{DocumentPath, Params, PathError, PathPattern};

pub mod feed;
mod path;

/// State of a document on one side of a write. Only existence matters, the content is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    Absent,
    Exists,
}

impl Snapshot {
    pub fn exists(self) -> bool {
        matches!(self, Snapshot::Exists)
    }
}

/// A single write to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub before: Snapshot,
    pub after: Snapshot,
}

impl Change {
    pub fn created() -> Self {
        Self {
            before: Snapshot::Absent,
            after: Snapshot::Exists,
        }
    }

    pub fn deleted() -> Self {
        Self {
            before: Snapshot::Exists,
            after: Snapshot::Absent,
        }
    }

    pub fn updated() -> Self {
        Self {
            before: Snapshot::Exists,
            after: Snapshot::Exists,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TriggerError {
    #[snafu(display("path parameter `{name}` is missing"))]
    MissingParam {
        name: &'static str,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("path parameter `{name}` is not a valid event id: {source}"))]
    InvalidParam {
        name: &'static str,
        source: EmptyEventId,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to apply change: {source}"))]
    Store {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Reacts to writes of documents under a subscribed [PathPattern].
pub trait TriggerHandler: Send + Sync {
    /// Called once per delivered write with the wildcard values of the document's path.
    fn on_write<'a>(&'a self, change: Change, params: &'a Params) -> BoxFuture<'a, Result<(), TriggerError>>;
}

struct Subscription {
    pattern: PathPattern,
    handler: Arc<dyn TriggerHandler>,
}

#[derive(Default)]
pub struct Triggers {
    subscriptions: Vec<Subscription>,
}

impl Triggers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to every write under `pattern`.
    pub fn on_write(
        mut self,
        pattern: &str,
        handler: impl TriggerHandler + 'static,
    ) -> Result<Self, PathError> {
        let pattern = PathPattern::parse(pattern)?;
        tracing::debug!(%pattern, "registered trigger");

        self.subscriptions.push(Subscription {
            pattern,
            handler: Arc::new(handler),
        });

        Ok(self)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &PathPattern> {
        self.subscriptions.iter().map(|subscription| &subscription.pattern)
    }

    /// Run every handler subscribed to a pattern matching `path` and return how many ran.
    ///
    /// Handlers are independent of each other: all of them run even if one fails, and the first failure is returned.
    #[tracing::instrument(skip(self, path), fields(path = %path))]
    pub async fn dispatch(&self, path: &DocumentPath, change: Change) -> Result<usize, TriggerError> {
        let mut ran = 0;
        let mut failure = None;

        for subscription in &self.subscriptions {
            let Some(params) = subscription.pattern.matches(path) else {
                continue;
            };

            ran += 1;
            if let Err(error) = subscription.handler.on_write(change, &params).await {
                tracing::error!(pattern = %subscription.pattern, %error, "trigger failed");
                failure.get_or_insert(error);
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(ran),
        }
    }
}

impl std::fmt::Debug for Triggers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}

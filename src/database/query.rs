use serde::de::DeserializeOwned;
use snafu::{Location, ResultExt as _, Snafu};
use surrealdb::opt::QueryResult;

use super::Database;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseQueryError {
    #[snafu(display("failed to execute the query: {source}"))]
    MalformedQuery {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to deserialize the database response: {source}"))]
    Deserialize {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// An extension trait that allows you to execute raw SQL queries. Parameters can be bound using the [Bindings::bind]
/// method which takes any serializable data structure.
///
/// # Example
/// ```ignore
/// let events: Vec<Event> = database.sql("SELECT * FROM events WHERE likesCount > $likes")
///     .bind(("likes", 10))
///     .fetch_first()
///     .await?;
/// ```
pub trait Sql {
    fn sql(&self, query: &str) -> Bindings<'_>;
}

impl Sql for Database {
    fn sql(&self, query: &str) -> Bindings<'_> {
        Bindings {
            query: self.query(query.to_owned()),
        }
    }
}

#[derive(Debug)]
pub struct Bindings<'a> {
    query: surrealdb::method::Query<'a, surrealdb::engine::any::Any>,
}

impl Bindings<'_> {
    pub fn bind(mut self, params: impl serde::Serialize) -> Self {
        self.query = self.query.bind(params);
        self
    }

    /// Execute the query and return a [surrealdb::Response] which is SurrealDB's way to represent a list of
    /// statements returned from the database.
    pub async fn execute(self) -> Result<surrealdb::Response, DatabaseQueryError> {
        let response = self.query.await.context(MalformedQuerySnafu)?;
        tracing::trace!(?response, "executed query");
        Ok(response)
    }

    /// Execute the query and return the result of the first statement as a deserialized value.
    pub async fn fetch_first<T: DeserializeOwned>(self) -> Result<T, DatabaseQueryError>
    where
        usize: QueryResult<T>,
    {
        let mut statements = self.execute().await?;
        statements.take::<T>(0).context(DeserializeSnafu)
    }
}

use std::ops::Deref;

use serde::Deserialize;
use snafu::{Location, ResultExt as _, Snafu};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth;
use surrealdb::Surreal;
use tracing::instrument;
use url::Url;

/// Helper for executing arbitrary SurrealQL queries.
pub mod query;

pub use query::{Bindings, DatabaseQueryError, Sql};

/// Tables, fields and their defaults. Applied every time a connection is made.
const SETUP: &str = include_str!("../../schema.surrealql");

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseConnectionError {
    #[snafu(display("cannot connect to the database `{url}`: {source}"))]
    Connect {
        url: Url,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot sign in to the database as `{username}`: {source}"))]
    SignIn {
        username: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot select namespace `{namespace}` and database `{database}`: {source}"))]
    Select {
        namespace: String,
        database: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to apply the database schema: {source}"))]
    Setup {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "surreal_url")]
    pub url: Url,
    #[serde(rename = "surreal_ns")]
    pub namespace: String,
    #[serde(rename = "surreal_db")]
    pub database: String,
    #[serde(rename = "surreal_user", default)]
    pub username: Option<String>,
    #[serde(rename = "surreal_pass", default)]
    pub password: Option<String>,
}

/// A cheap-to-clone handle to the document store.
#[derive(Debug, Clone)]
pub struct Database {
    database: Surreal<Any>,
}

impl Database {
    /// Connects to the database described by `config`, signs in when credentials are given and applies the schema.
    ///
    /// `mem://` is accepted as a url for an in-process database.
    #[instrument(skip_all, fields(url = %config.url, ns = %config.namespace, db = %config.database))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseConnectionError> {
        let database = surrealdb::engine::any::connect(config.url.as_str())
            .await
            .context(ConnectSnafu { url: config.url.clone() })?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            database
                .signin(auth::Root { username, password })
                .await
                .context(SignInSnafu { username })?;
        }

        database
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .context(SelectSnafu {
                namespace: &config.namespace,
                database: &config.database,
            })?;

        database
            .query(SETUP)
            .await
            .and_then(|response| response.check())
            .context(SetupSnafu)?;

        tracing::info!("connected to the database");

        Ok(Self { database })
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}

use std::sync::Arc;

use dotenvy::dotenv;
use snafu::ResultExt as _;

use tally::api::{create_app, create_router};
use tally::config::Config;
use tally::database::Database;
use tally::error::{
    ApplicationError, BindAddressSnafu, ConnectDatabaseSnafu, RegisterTriggersSnafu, WatchChangesSnafu,
    WebServerSnafu,
};
use tally::store::SurrealStore;
use tally::{counter, logger, trigger};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let _guard = logger::init(&config)?;

    let database = Database::connect(&config.database)
        .await
        .context(ConnectDatabaseSnafu)?;
    let store = Arc::new(SurrealStore::new(database.clone()));

    let triggers = counter::triggers(store.clone()).context(RegisterTriggersSnafu)?;
    let _feeds = trigger::feed::spawn(&database, Arc::new(triggers))
        .await
        .context(WatchChangesSnafu)?;

    let app = create_app(store, config.authenticator());
    let router = create_router(app);

    let listener = tokio::net::TcpListener::bind(config.host)
        .await
        .context(BindAddressSnafu { address: config.host })?;
    tracing::info!(address = %config.host, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown())
        .await
        .context(WebServerSnafu)
}

async fn shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down");
}

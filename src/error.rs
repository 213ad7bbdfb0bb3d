use std::net::SocketAddr;

use snafu::{Location, Snafu};

use crate::database::DatabaseConnectionError;
use crate::trigger::feed::FeedError;
use crate::trigger::PathError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApplicationError {
    /// could not read the configuration from the environment
    ConfigLoad {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },

    ConnectDatabase {
        source: DatabaseConnectionError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not register the counter triggers
    RegisterTriggers {
        source: PathError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not listen to subcollection changes
    WatchChanges {
        source: FeedError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not bind to the given address, check if it's already in use
    BindAddress {
        address: SocketAddr,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not serve the application
    WebServer {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

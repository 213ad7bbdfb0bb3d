#![allow(dead_code)]

use std::time::Duration;

use secrecy::SecretString;
use tally::auth::Authenticator;
use tally::database::{Database, DatabaseConfig, Sql as _};
use tally::model::Event;
use url::Url;

pub const SECRET: &str = "test-secret";

pub async fn database() -> Database {
    let config = DatabaseConfig {
        url: Url::parse("mem://").unwrap(),
        namespace: "test".to_string(),
        database: "test".to_string(),
        username: None,
        password: None,
    };

    Database::connect(&config).await.expect("in-memory database should start")
}

pub async fn create_event(database: &Database, id: &str) {
    database
        .sql("CREATE type::thing('events', $id) SET viewsCount = 0, likesCount = 0, commentsCount = 0")
        .bind(("id", id))
        .execute()
        .await
        .unwrap()
        .check()
        .unwrap();
}

pub async fn event(database: &Database, id: &str) -> Option<Event> {
    database
        .sql("SELECT * FROM type::thing('events', $id)")
        .bind(("id", id))
        .fetch_first()
        .await
        .unwrap()
}

pub async fn run(database: &Database, query: &str) {
    database.sql(query).execute().await.unwrap().check().unwrap();
}

/// Waits until the event's counters equal `expected`, failing after a few seconds.
pub async fn wait_for(database: &Database, id: &str, expected: Event) {
    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if event(database, id).await.as_ref() == Some(&expected) {
                return;
            }

            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    if reached.is_err() {
        let actual = event(database, id).await;
        panic!("event `{id}` never reached {expected:?}, last seen {actual:?}");
    }
}

pub fn authenticator() -> Authenticator {
    Authenticator::new(SecretString::new(SECRET.to_string()), jsonwebtoken::Algorithm::HS256)
}

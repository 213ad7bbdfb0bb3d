use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::CounterStore;
use crate::views::{Ack, ViewError};

mod error;
mod state;

pub use error::Status;
pub use state::{create_app, App};

/// Envelope of a callable request, `{"data": ...}`.
#[derive(Debug, Default, Deserialize)]
pub struct CallRequest {
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Envelope of a successful callable response, `{"result": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallResponse<T> {
    pub result: T,
}

pub fn create_router<S: CounterStore + 'static>(app: App<S>) -> Router {
    Router::new()
        .route("/incrementEventView", post(increment_event_view::<S>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app)
}

async fn increment_event_view<S: CounterStore>(
    State(app): State<App<S>>,
    headers: HeaderMap,
    body: Result<Json<CallRequest>, JsonRejection>,
) -> Result<Json<CallResponse<Ack>>, ViewError> {
    let caller = match app.authenticator.authenticate(&headers) {
        Ok(caller) => Some(caller),
        Err(error) => {
            tracing::debug!(%error, "anonymous call");
            None
        }
    };

    // a body that cannot be read is treated the same as one without an eventId
    let data = match body {
        Ok(Json(request)) => request.data,
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable call body");
            serde_json::Value::Null
        }
    };

    let result = app.views.call(caller.as_ref(), data).await?;
    Ok(Json(CallResponse { result }))
}

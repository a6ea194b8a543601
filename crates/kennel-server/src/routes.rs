use axum::extract::State;
use axum::middleware;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use kennel_core::Dog;

use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::telemetry::{self, TracerConfig};
use crate::views;

/// Build the application router. The request-span layer is only added when the
/// tracer is enabled.
pub fn router(state: AppState, tracer: &TracerConfig) -> Router {
    let app = Router::new().route("/", get(index)).with_state(state);

    if tracer.enabled {
        app.layer(middleware::from_fn_with_state(
            tracer.service_name.clone(),
            telemetry::trace_requests,
        ))
    } else {
        app
    }
}

/// List every dog.
#[tracing::instrument(skip_all)]
async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let dogs = list_dogs(&state).await?;
    tracing::debug!(count = dogs.len(), "loaded dogs");

    let template = state.views.index_template().await?;
    Ok(Html(views::render_index(&template, &dogs)?))
}

async fn list_dogs(state: &AppState) -> Result<Vec<Dog>> {
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<Vec<Dog>> {
        let db = db.lock().map_err(|_| ServerError::LockPoisoned)?;
        Ok(db.list_dogs()?)
    })
    .await?
}

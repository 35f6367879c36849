use axum::{extract::State, response::Html, routing::get, Router};
use std::sync::Arc;
use tracing::debug;

use crate::error::AppResult;
use crate::views::View;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/admin/requests", get(list_requests))
}

// GET /admin/requests - только чтение, без пагинации
async fn list_requests(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let requests = state.store.list_newest_first().await?;
    debug!("Listing {} booking requests", requests.len());

    let html = state.renderer.render(&View::RequestList {
        requests: &requests,
    })?;
    Ok(Html(html))
}

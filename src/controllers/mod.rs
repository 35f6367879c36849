pub mod admin;
pub mod quote;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(quote::routes())
        .merge(admin::routes())
}

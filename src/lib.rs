pub mod config;
pub mod controllers;
pub mod csrf;
pub mod database;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod services;
pub mod views;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::csrf::CsrfGuard;
use crate::repository::BookingStore;
use crate::services::mailer::Mailer;
use crate::services::submission::SubmissionWorkflow;
use crate::views::Renderer;

// Shared state для всего приложения, собирается один раз в main
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub workflow: SubmissionWorkflow,
    pub renderer: Arc<dyn Renderer>,
    pub csrf: CsrfGuard,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BookingStore>,
        mailer: Arc<dyn Mailer>,
        renderer: Arc<dyn Renderer>,
        csrf: CsrfGuard,
        admin_email: String,
    ) -> Arc<Self> {
        let workflow = SubmissionWorkflow::new(store.clone(), mailer, admin_email);
        Arc::new(Self {
            store,
            workflow,
            renderer,
            csrf,
        })
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

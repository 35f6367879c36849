//! quote.rs
//!
//! Публичная форма заявки: `GET /` отдаёт пустую форму, `POST /` принимает
//! заявку и либо перенаправляет на подтверждение, либо показывает форму с
//! ошибками. Токен формы привязан к cookie клиента `jq_csrf`.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::csrf::{self, CsrfGuard};
use crate::error::AppResult;
use crate::forms::{BookingForm, FormErrors};
use crate::services::submission::{SubmissionFailure, SubmissionOutcome, SUCCESS_MESSAGE};
use crate::views::{Flash, View};
use crate::AppState;

pub const CONFIRMATION_PATH: &str = "/?submitted=1";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(show_form).post(submit_form))
}

#[derive(Debug, Deserialize)]
struct IndexQuery {
    submitted: Option<String>,
}

// GET /
async fn show_form(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<IndexQuery>,
) -> AppResult<(CookieJar, Html<String>)> {
    let (jar, nonce) = client_nonce(jar);
    let form = BookingForm::blank(state.csrf.issue(&nonce));
    let flash = query
        .submitted
        .is_some()
        .then(|| Flash::success(SUCCESS_MESSAGE));

    let html = render_form(&state, &form, &FormErrors::new(), flash.as_ref())?;
    Ok((jar, html))
}

// POST /
async fn submit_form(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(mut form): Form<BookingForm>,
) -> AppResult<Response> {
    let cookie_nonce = jar.get(csrf::COOKIE).map(|c| c.value().to_string());

    if let Err(rejection) = state.csrf.verify(&form.csrf_token, cookie_nonce.as_deref()) {
        warn!("Rejected quote request: {}", rejection.message());
        let mut errors = FormErrors::new();
        errors.add(csrf::FIELD, rejection.message());
        if let Err(field_errors) = form.validate() {
            errors.merge(field_errors);
        }
        let (jar, nonce) = client_nonce(jar);
        form.csrf_token = state.csrf.issue(&nonce);
        let html = render_form(&state, &form, &errors, None)?;
        return Ok((jar, html).into_response());
    }

    match state.workflow.submit(&form).await {
        SubmissionOutcome::Completed { .. } => {
            Ok(Redirect::to(CONFIRMATION_PATH).into_response())
        }
        SubmissionOutcome::Failed(failure) => {
            let flash = failure.flash_message().map(Flash::error);
            let errors = match failure {
                SubmissionFailure::Validation(errors) => errors,
                SubmissionFailure::Persistence(_) => FormErrors::new(),
            };
            // Новый токен: старый мог почти истечь
            let (jar, nonce) = client_nonce(jar);
            form.csrf_token = state.csrf.issue(&nonce);
            let html = render_form(&state, &form, &errors, flash.as_ref())?;
            Ok((jar, html).into_response())
        }
    }
}

/// Nonce клиента из cookie; если cookie нет, выдаём новый.
fn client_nonce(jar: CookieJar) -> (CookieJar, String) {
    if let Some(nonce) = jar
        .get(csrf::COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
    {
        return (jar, nonce);
    }

    let nonce = CsrfGuard::new_nonce();
    let cookie = Cookie::build((csrf::COOKIE, nonce.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), nonce)
}

fn render_form(
    state: &AppState,
    form: &BookingForm,
    errors: &FormErrors,
    flash: Option<&Flash>,
) -> AppResult<Html<String>> {
    let html = state.renderer.render(&View::BookingForm {
        form,
        errors,
        flash,
    })?;
    Ok(Html(html))
}

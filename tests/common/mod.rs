#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use jetquote::{
    app,
    csrf::{self, CsrfGuard},
    forms::BookingForm,
    models::{BookingRequest, NewBookingRequest},
    repository::{BookingStore, PersistenceError},
    services::mailer::{EmailMessage, MailError, Mailer},
    views::HtmlRenderer,
    AppState,
};

pub const SECRET: &str = "test-secret";
pub const ADMIN: &str = "ops@example.com";
pub const CLIENT_NONCE: &str = "test-client-nonce";

#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<Vec<BookingRequest>>,
    pub fail_with: Option<String>,
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert(&self, request: &NewBookingRequest) -> Result<BookingRequest, PersistenceError> {
        if let Some(reason) = &self.fail_with {
            return Err(PersistenceError::Unavailable(reason.clone()));
        }
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        // Каждая следующая запись на минуту позже
        let created_at = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(id);
        let record = BookingRequest::from_new(id, created_at, request.clone());
        rows.push(record.clone());
        Ok(record)
    }

    async fn list_newest_first(&self) -> Result<Vec<BookingRequest>, PersistenceError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Unavailable("connection refused".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub csrf: CsrfGuard,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(MemoryStore::default(), RecordingMailer::default())
    }

    pub fn with(store: MemoryStore, mailer: RecordingMailer) -> Self {
        let store = Arc::new(store);
        let mailer = Arc::new(mailer);
        let csrf = CsrfGuard::new(SECRET).unwrap();
        let state = AppState::new(
            store.clone(),
            mailer.clone(),
            Arc::new(HtmlRenderer::new()),
            csrf.clone(),
            ADMIN.to_string(),
        );

        Self {
            router: app(state),
            store,
            mailer,
            csrf,
        }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// POST от клиента с cookie [`CLIENT_NONCE`].
    pub async fn post_form(&self, form: &BookingForm) -> Response<Body> {
        self.post_form_with_cookie(form, Some(CLIENT_NONCE)).await
    }

    pub async fn post_form_with_cookie(&self, form: &BookingForm, nonce: Option<&str>) -> Response<Body> {
        let body = serde_urlencoded::to_string(form).unwrap();
        let mut request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(nonce) = nonce {
            request = request.header(header::COOKIE, format!("{}={}", csrf::COOKIE, nonce));
        }
        self.router
            .clone()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    pub fn row_count(&self) -> usize {
        self.store.rows.lock().unwrap().len()
    }

    pub fn sent_count(&self) -> usize {
        self.mailer.sent.lock().unwrap().len()
    }

    /// Заявка Jane Doe с действительным CSRF-токеном.
    pub fn jane(&self) -> BookingForm {
        BookingForm {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "+1-555-0100".into(),
            jet_category: "Midsize Jet".into(),
            departure: "JFK".into(),
            arrival: "LAX".into(),
            departure_date: "2025-06-15".into(),
            passengers: "4".into(),
            special_requests: String::new(),
            csrf_token: self.csrf.issue(CLIENT_NONCE),
        }
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Значение cookie `jq_csrf` из ответа, если сервер его выставил.
pub fn csrf_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix(&format!("{}=", csrf::COOKIE)).map(str::to_string))
        .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
}

/// Значение скрытого поля `csrf_token` из отрендеренной формы.
pub fn csrf_token(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).unwrap() + marker.len();
    let end = start + html[start..].find('"').unwrap();
    html[start..end].to_string()
}

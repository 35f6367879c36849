//! submission.rs
//!
//! Воркфлоу обработки заявки:
//! `Received → Validated → Persisted → Notified → Completed`,
//! с выходом в `Failed` после любого шага, начиная с проверки.
//!
//! Уведомление администратора отправляется по принципу best-effort: если
//! почта недоступна, уже зафиксированная запись остаётся, ошибка пишется в
//! лог, а пользователь видит подтверждение.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::forms::{BookingForm, FormErrors};
use crate::models::BookingRequest;
use crate::repository::{BookingStore, PersistenceError};
use crate::services::mailer::{EmailMessage, Mailer};

pub const SUCCESS_MESSAGE: &str =
    "Thank you! Your quote request has been received and saved. We’ll contact you shortly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Persisted,
    Notified,
    Completed,
}

#[derive(Debug, Error)]
pub enum SubmissionFailure {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FormErrors),

    #[error("persistence failed: {0}")]
    Persistence(PersistenceError),
}

impl SubmissionFailure {
    /// Сообщение для баннера над формой. Ошибки проверки показываются
    /// у полей, поэтому баннера у них нет.
    pub fn flash_message(&self) -> Option<String> {
        match self {
            SubmissionFailure::Validation(_) => None,
            SubmissionFailure::Persistence(e) => Some(format!(
                "An error occurred while processing your request. Please try again. ({})",
                e
            )),
        }
    }
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    Completed {
        record: BookingRequest,
        notified: bool,
    },
    Failed(SubmissionFailure),
}

pub struct SubmissionWorkflow {
    store: Arc<dyn BookingStore>,
    mailer: Arc<dyn Mailer>,
    admin_email: String,
}

impl SubmissionWorkflow {
    pub fn new(store: Arc<dyn BookingStore>, mailer: Arc<dyn Mailer>, admin_email: String) -> Self {
        Self {
            store,
            mailer,
            admin_email,
        }
    }

    #[tracing::instrument(name = "Submit quote request", skip(self, form))]
    pub async fn submit(&self, form: &BookingForm) -> SubmissionOutcome {
        debug!(stage = ?Stage::Received, "Quote request received");

        let new_request = match form.validate() {
            Ok(request) => request,
            Err(errors) => {
                info!("Quote request rejected: {} invalid field(s)", errors.len());
                return SubmissionOutcome::Failed(SubmissionFailure::Validation(errors));
            }
        };
        debug!(stage = ?Stage::Validated, "Quote request validated");

        // Транзакция внутри insert: при ошибке строка не остаётся
        let record = match self.store.insert(&new_request).await {
            Ok(record) => record,
            Err(e) => {
                error!("Failed to persist quote request: {}", e);
                return SubmissionOutcome::Failed(SubmissionFailure::Persistence(e));
            }
        };
        debug!(stage = ?Stage::Persisted, id = record.id, "Quote request saved");

        let message = compose_notification(&record, &self.admin_email);
        let notified = match self.mailer.send(&message).await {
            Ok(()) => {
                debug!(stage = ?Stage::Notified, id = record.id, "Administrator notified");
                true
            }
            Err(e) => {
                // Запись уже зафиксирована, не откатываем
                error!(id = record.id, "Failed to notify administrator: {}", e);
                false
            }
        };

        if !notified {
            warn!(id = record.id, "Quote request saved without notification");
        }
        info!(stage = ?Stage::Completed, id = record.id, notified, "Quote request completed");

        SubmissionOutcome::Completed { record, notified }
    }
}

/// Письмо администратору о новой заявке.
pub fn compose_notification(record: &BookingRequest, admin_email: &str) -> EmailMessage {
    let subject = format!(
        "New Quote Request – {} → {}",
        record.departure, record.arrival
    );

    let body = format!(
        "New Private Jet Quote Request #{id}\n\
         ──────────────────────────────\n\
         Name:          {name}\n\
         Email:         {email}\n\
         Phone:         {phone}\n\
         Jet Category:  {jet}\n\
         Passengers:    {passengers}\n\
         Departure:     {departure}\n\
         Arrival:       {arrival}\n\
         Date:          {date}\n\
         \n\
         Special requests:\n\
         {special}\n\
         Created:       {created}",
        id = record.id,
        name = record.full_name,
        email = record.email,
        phone = record.phone,
        jet = record.jet_category,
        passengers = record.passengers,
        departure = record.departure,
        arrival = record.arrival,
        date = record.departure_date.format("%Y-%m-%d"),
        special = record.special_requests.as_deref().unwrap_or("None"),
        created = record.created_at.format("%Y-%m-%d %H:%M UTC"),
    );

    EmailMessage {
        to: admin_email.to_string(),
        subject,
        body,
    }
}

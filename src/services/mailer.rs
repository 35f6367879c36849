//! mailer.rs
//!
//! Отправка уведомлений администратору через HTTP-почтовый релей.
//!
//! Релей принимает `POST {base_url}/send` с JSON `{from, to, subject, text}`
//! и отвечает 2xx при успехе. Любой другой ответ или сетевая ошибка
//! превращается в [`MailError`].

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

pub struct HttpMailer {
    client: reqwest::Client,
    base_url: String,
    sender: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            sender: config.default_sender.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[tracing::instrument(name = "Send notification", skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: &self.sender,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let mut request = self
            .client
            .post(format!("{}/send", self.base_url))
            .json(&payload);

        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        debug!("Posting message to mail relay {}", self.base_url);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Notification delivered to relay");
        Ok(())
    }
}

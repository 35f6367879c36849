pub mod html;

use thiserror::Error;

use crate::forms::{BookingForm, FormErrors};
use crate::models::BookingRequest;

pub use html::HtmlRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }
}

/// Что рендерить и с какими данными.
#[derive(Debug)]
pub enum View<'a> {
    BookingForm {
        form: &'a BookingForm,
        errors: &'a FormErrors,
        flash: Option<&'a Flash>,
    },
    RequestList {
        requests: &'a [BookingRequest],
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write template output")]
    Format(#[from] std::fmt::Error),
}

/// Шаблонизатор за трейтом: контроллеры не знают, чем рендерится HTML.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError>;
}

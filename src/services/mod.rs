pub mod mailer;
pub mod submission;

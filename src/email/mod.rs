//! Outbound email: the delivery trait, a logging sender and the Brevo API client.

mod brevo;

pub use brevo::{BrevoMailer, BREVO_SEND_URL};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

pub const RESET_SUBJECT: &str = "Password Reset Request";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("email request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Email delivery abstraction. No retries: a failure goes straight back to the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError>;
}

/// Local dev sender that logs the message instead of delivering it.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        info!(to = %message.to, subject = %message.subject, "email send stub");
        // The body carries a live reset link; keep it out of info logs.
        debug!(to = %message.to, html = %message.html, "email send stub body");
        Ok(())
    }
}

/// Build the password-reset email pointing at `reset_link`.
pub fn reset_email(to: &str, reset_link: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: RESET_SUBJECT.to_string(),
        html: format!(
            "<p>Click the link to reset your password: <a href='{link}'>{link}</a></p>",
            link = reset_link
        ),
    }
}

//! Brevo transactional email API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use super::{DispatchError, EmailMessage, Mailer};

pub const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    sender: Address<'a>,
    to: Vec<Address<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

#[derive(Clone)]
pub struct BrevoMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: String,
}

impl BrevoMailer {
    pub fn new(api_key: String, sender: String, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: BREVO_SEND_URL.to_string(),
            api_key,
            sender,
        })
    }

    /// Point the client at a different send endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        let payload = SendRequest {
            sender: Address {
                email: &self.sender,
            },
            to: vec![Address { email: &message.to }],
            subject: &message.subject,
            html_content: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(to = %message.to, status = status.as_u16(), "email sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(to = %message.to, status = status.as_u16(), "email provider rejected message");
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

//! Forwarding of email requests to the upstream mail relay.
//!
//! The server itself holds no mail credentials. It validates the request
//! and forwards it to the relay named by `MAIL_RELAY_URL`; delivery
//! failures surface to the caller as 502.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ServerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
}

impl EmailRequest {
    /// Minimal shape check before we hand the message upstream.
    pub fn validate(&self) -> Result<(), ServerError> {
        let addr = self.recipient_email.trim();
        if addr.is_empty() {
            return Err(ServerError::BadRequest(
                "Missing recipient email".to_string(),
            ));
        }
        // One '@' with something on both sides; the relay does real checks.
        let mut parts = addr.splitn(2, '@');
        let local = parts.next().unwrap_or("");
        let domain = parts.next().unwrap_or("");
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(ServerError::BadRequest(format!(
                "Invalid recipient email: {addr}"
            )));
        }
        if self.subject.trim().is_empty() {
            return Err(ServerError::BadRequest("Missing subject".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Mailer {
    relay_url: Option<String>,
    http: reqwest::Client,
}

impl Mailer {
    pub fn new(relay_url: Option<String>) -> Self {
        Self {
            relay_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.relay_url.is_some()
    }

    /// Forward a validated email request to the upstream relay.
    pub async fn forward(&self, request: &EmailRequest) -> Result<(), ServerError> {
        let Some(ref url) = self.relay_url else {
            return Err(ServerError::MailRelayDisabled);
        };

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Mail relay unreachable");
                ServerError::MailRelayUnreachable(e.to_string())
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Mail relay rejected message");
            return Err(ServerError::MailRelayRejected(response.status().as_u16()));
        }

        debug!(recipient = %request.recipient_email, "Email forwarded to relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(recipient: &str) -> EmailRequest {
        EmailRequest {
            recipient_email: recipient.to_string(),
            subject: "Appointment approved".to_string(),
            body: "See you soon".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_plain_address() {
        assert!(request("patient@example.com").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_addresses() {
        assert!(request("").validate().is_err());
        assert!(request("no-at-sign").validate().is_err());
        assert!(request("@example.com").validate().is_err());
        assert!(request("user@").validate().is_err());
        assert!(request("user@localhost").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_subject() {
        let mut req = request("patient@example.com");
        req.subject = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[tokio::test]
    async fn test_disabled_mailer_refuses() {
        let mailer = Mailer::new(None);
        assert!(!mailer.is_enabled());
        assert!(matches!(
            mailer.forward(&request("patient@example.com")).await,
            Err(ServerError::MailRelayDisabled)
        ));
    }

    #[test]
    fn test_wire_form_is_camel_case() {
        let json = serde_json::to_value(request("p@example.com")).unwrap();
        assert!(json.get("recipientEmail").is_some());
        assert!(json.get("subject").is_some());
    }
}

//! Outbound notifications: transactional email and WhatsApp links.
//!
//! Everything here is best-effort.  A notification failure is logged and
//! reported to the caller, but never reverses the state change it
//! followed.

use reqwest::Url;
use serde::Serialize;
use tracing::{error, info};

use clinica_shared::DoctorId;
use clinica_store::models::{Appointment, Doctor};

use crate::{ClientError, Result};

/// Client for the transactional mail relay (the server's
/// `/api/send-email` endpoint).
#[derive(Debug, Clone)]
pub struct MailRelay {
    endpoint: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    recipient_email: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl MailRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Send one message; resolves once the relay accepts or refuses it.
    pub async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&SendEmailRequest {
                recipient_email: recipient,
                subject,
                body,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(recipient, subject, "email relayed");
            Ok(())
        } else {
            Err(ClientError::MailRejected {
                status: status.as_u16(),
            })
        }
    }

    /// Fire-and-forget variant: spawn the send and only log the outcome.
    pub fn send_detached(&self, recipient: String, subject: String, body: String) {
        let relay = self.clone();
        tokio::spawn(async move {
            if let Err(err) = relay.send(&recipient, &subject, &body).await {
                error!(error = %err, recipient, "detached email send failed");
            }
        });
    }
}

/// Subject and body of the approval email.
pub fn approval_email(appointment: &Appointment) -> (String, String) {
    let subject = "Appointment Approved".to_string();
    let body = format!(
        "Your appointment has been approved!\n\nDetails:\n{} with {} on {} at {}",
        appointment.treatment.trim(),
        appointment.doctor,
        appointment.appointment_date,
        appointment.appointment_time,
    );
    (subject, body)
}

/// Short confirmation used for the WhatsApp chat link.
pub fn approval_message(appointment: &Appointment) -> String {
    format!(
        "Hi {}! Your appointment on {} at {} has been approved. See you then.",
        appointment.name, appointment.appointment_date, appointment.appointment_time,
    )
}

/// Prefilled WhatsApp chat deep link.
pub fn whatsapp_chat_link(phone: &str, message: &str) -> String {
    let url = Url::parse_with_params(
        "https://api.whatsapp.com/send",
        &[("phone", phone), ("text", message)],
    )
    .expect("static base url");
    url.to_string()
}

/// Feedback request sent to a doctor over WhatsApp.
pub fn feedback_whatsapp_link(base_url: &str, doctor_id: &DoctorId, doctor: &Doctor) -> String {
    let feedback_url = format!("{}/feedback?uid={}", base_url.trim_end_matches('/'), doctor_id);
    let message = format!("Hi! Please provide your feedback here: {feedback_url}");
    whatsapp_chat_link(&doctor.phone, &message)
}

/// Configuration for the third-party WhatsApp media send API.
#[derive(Debug, Clone)]
pub struct WhatsAppSendConfig {
    pub api_url: String,
    pub instance_id: String,
    pub access_token: String,
    /// Country code prefixed to bare 10-digit numbers.
    pub country_code: String,
}

impl WhatsAppSendConfig {
    /// Request URL delivering a document (e.g. an invoice PDF) to a
    /// customer over WhatsApp.
    pub fn media_send_url(
        &self,
        phone: &str,
        message: &str,
        media_url: &str,
        filename: &str,
    ) -> String {
        let number = format!("{}{phone}", self.country_code);
        let url = Url::parse_with_params(
            &self.api_url,
            &[
                ("number", number.as_str()),
                ("type", "media"),
                ("message", message),
                ("media_url", media_url),
                ("filename", filename),
                ("instance_id", self.instance_id.as_str()),
                ("access_token", self.access_token.as_str()),
            ],
        );
        match url {
            Ok(url) => url.to_string(),
            Err(err) => {
                error!(error = %err, api_url = %self.api_url, "bad media send url");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_link_percent_encodes_the_message() {
        let link = whatsapp_chat_link("919876543210", "Hi there! 10:00");
        assert!(link.starts_with("https://api.whatsapp.com/send?phone=919876543210&text="));
        assert!(!link.contains(' '));
        assert!(link.contains("Hi+there%21"));
    }

    #[test]
    fn feedback_link_embeds_the_doctor_uid() {
        let doctor = Doctor {
            name: "Dr. Rao".into(),
            phone: "919876543210".into(),
            role: "physio".into(),
        };
        let link = feedback_whatsapp_link("https://clinic.example/", &"dr-rao".into(), &doctor);
        assert!(link.contains("dr-rao"));
        assert!(link.contains("919876543210"));
    }

    #[test]
    fn media_send_url_carries_all_parameters() {
        let config = WhatsAppSendConfig {
            api_url: "https://sender.example/api/send".into(),
            instance_id: "inst-1".into(),
            access_token: "tok-1".into(),
            country_code: "91".into(),
        };
        let url = config.media_send_url(
            "9876543210",
            "Your invoice",
            "https://clinic.example/invoices/abc",
            "invoice.pdf",
        );
        assert!(url.contains("number=919876543210"));
        assert!(url.contains("type=media"));
        assert!(url.contains("instance_id=inst-1"));
        assert!(url.contains("access_token=tok-1"));
        assert!(url.contains("invoice.pdf"));
    }

    #[test]
    fn approval_copy_mentions_the_slot() {
        let appt = Appointment {
            name: "Asha".into(),
            treatment: "Physiotherapy".into(),
            doctor: "dr-rao".into(),
            appointment_date: "2024-03-10".into(),
            appointment_time: "10:00".into(),
            ..Default::default()
        };
        let (subject, body) = approval_email(&appt);
        assert_eq!(subject, "Appointment Approved");
        assert!(body.contains("2024-03-10"));
        assert!(approval_message(&appt).contains("Asha"));
    }
}

use crate::services::InboundEmail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct SendEmailForm {
    #[serde(default)]
    #[validate(min_length = 3)]
    #[validate(max_length = 320)]
    pub to: String,
    #[serde(default)]
    #[validate(min_length = 1)]
    #[validate(max_length = 998)]
    pub subject: String,
    #[serde(default)]
    #[validate(min_length = 1)]
    pub body: String,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReplyForm {
    #[serde(default)]
    #[validate(min_length = 1)]
    #[validate(max_length = 10000)]
    pub review_content: String,
    pub sentiment: Option<String>,
    pub category: Option<String>,
    pub customer_name: Option<String>,
    pub marketplace: Option<String>,
    pub severity: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailPayload {
    #[serde(alias = "id")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    #[validate(max_length = 100000)]
    pub body: String,
    #[serde(default, alias = "from")]
    pub sender_name: String,
    pub sender_email: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
}

impl EmailPayload {
    pub fn is_empty(&self) -> bool {
        self.subject.trim().is_empty() && self.body.trim().is_empty()
    }
}

impl From<EmailPayload> for InboundEmail {
    fn from(payload: EmailPayload) -> Self {
        let sender_name = if payload.sender_name.trim().is_empty() {
            payload
                .sender_email
                .clone()
                .unwrap_or_else(|| "Unknown Sender".to_string())
        } else {
            payload.sender_name
        };

        InboundEmail {
            message_id: payload.message_id,
            subject: payload.subject,
            body: payload.body,
            sender_name,
            sender_email: payload.sender_email,
            received_at: payload.received_at,
        }
    }
}

/// Either explicit emails, or a number of recent mailbox messages to pull.
#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct ImportEmailsForm {
    #[serde(default)]
    #[validate]
    pub emails: Vec<EmailPayload>,
    #[validate(minimum = 1)]
    #[validate(maximum = 100)]
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_email_requires_every_field() {
        let form: SendEmailForm = serde_json::from_str(r#"{"to": "a@b.co", "subject": "Hi"}"#).unwrap();
        assert!(form.validate().is_err());

        let form: SendEmailForm =
            serde_json::from_str(r#"{"to": "a@b.co", "subject": "Hi", "body": "text"}"#).unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn generate_reply_requires_content() {
        let form: GenerateReplyForm =
            serde_json::from_str(r#"{"reviewContent": "", "sentiment": "negative"}"#).unwrap();
        assert!(form.validate().is_err());
    }

    #[test]
    fn payload_sender_falls_back_to_address() {
        let payload: EmailPayload =
            serde_json::from_str(r#"{"id": "m1", "subject": "s", "senderEmail": "x@y.z"}"#).unwrap();
        let email: InboundEmail = payload.into();
        assert_eq!(email.sender_name, "x@y.z");
        assert_eq!(email.message_id.as_deref(), Some("m1"));
    }
}

//! Outlook mail through Microsoft Graph.
//!
//! The OAuth access token is not ours to mint: a connector service stores the
//! mailbox connection and hands out the current token. [`OutlookTokenHolder`]
//! caches it until it expires.

use super::config::OutlookConfig;
use super::errors::ConnectorError;
use super::http::{self, str_field};
use super::marketplace::ConnectionStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Tokens without a known expiry are never reused.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at > now).unwrap_or(false)
    }
}

pub struct OutlookTokenHolder {
    connection_url: Option<String>,
    identity_header: String,
    identity_token: Option<String>,
    http_client: reqwest::Client,
    cached: RwLock<Option<AccessToken>>,
}

impl OutlookTokenHolder {
    pub fn new(config: &OutlookConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            connection_url: config.connection_url.clone(),
            identity_header: config.identity_header.clone(),
            identity_token: config.identity_token.clone(),
            http_client: http::build_client(config.timeout_secs)?,
            cached: RwLock::new(None),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.connection_url.is_some() && self.identity_token.is_some()
    }

    pub async fn access_token(&self) -> Result<String, ConnectorError> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.is_valid(Utc::now()) {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let token = fresh.token.clone();
        *self.cached.write().await = Some(fresh);
        Ok(token)
    }

    async fn refresh(&self) -> Result<AccessToken, ConnectorError> {
        let Some(url) = self.connection_url.as_deref() else {
            return Err(ConnectorError::NotConfigured(
                "Outlook connection URL not configured".to_string(),
            ));
        };
        let Some(identity) = self.identity_token.as_deref() else {
            return Err(ConnectorError::NotConfigured(format!(
                "{} not found for Outlook connection lookup",
                self.identity_header
            )));
        };

        let span = tracing::info_span!("outlook_connection_lookup");
        let builder = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .header(self.identity_header.as_str(), identity);
        let payload = http::send_json("Outlook connector", builder, span)
            .await
            .map_err(|err| match err {
                ConnectorError::NotConfigured(_) => err,
                other => ConnectorError::ServiceUnavailable(format!(
                    "Failed to connect to Outlook: {}",
                    other
                )),
            })?;

        parse_connection(&payload)
    }
}

/// Token and expiry from a connection-settings payload.
pub fn parse_connection(payload: &Value) -> Result<AccessToken, ConnectorError> {
    let connection = payload["items"].get(0).filter(|c| !c.is_null()).ok_or_else(|| {
        ConnectorError::NotConfigured(
            "Outlook connector not found - please add Outlook integration to this app".to_string(),
        )
    })?;

    let settings = connection.get("settings").filter(|s| s.is_object()).ok_or_else(|| {
        ConnectorError::NotConfigured(
            "Outlook connector found but not configured with settings".to_string(),
        )
    })?;

    let token = str_field(settings, &["access_token"])
        .or_else(|| str_field(&settings["oauth"]["credentials"], &["access_token"]))
        .ok_or_else(|| {
            ConnectorError::Unauthorized("Outlook connected but access token not found".to_string())
        })?;

    let expires_at = settings["expires_at"]
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc));

    Ok(AccessToken { token, expires_at })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub id: String,
    pub subject: String,
    pub sender_name: String,
    pub sender_email: Option<String>,
    pub body_preview: String,
    pub received_at: Option<DateTime<Utc>>,
}

impl EmailMessage {
    fn from_graph(item: &Value) -> Self {
        let address = &item["from"]["emailAddress"];
        let sender_email = str_field(address, &["address"]);
        Self {
            id: str_field(item, &["id"]).unwrap_or_default(),
            subject: str_field(item, &["subject"]).unwrap_or_default(),
            sender_name: str_field(address, &["name"])
                .or_else(|| sender_email.clone())
                .unwrap_or_else(|| "Unknown Sender".to_string()),
            sender_email,
            body_preview: str_field(item, &["bodyPreview"]).unwrap_or_default(),
            received_at: item["receivedDateTime"]
                .as_str()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|at| at.with_timezone(&Utc)),
        }
    }
}

pub struct OutlookClient {
    graph_base_url: String,
    tokens: OutlookTokenHolder,
    http_client: reqwest::Client,
}

impl OutlookClient {
    pub fn new(config: &OutlookConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            graph_base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            tokens: OutlookTokenHolder::new(config)?,
            http_client: http::build_client(config.timeout_secs)?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.tokens.is_configured()
    }

    /// Resolves a token, which proves the mailbox connection is usable.
    pub async fn test_connection(&self) -> ConnectionStatus {
        if !self.is_configured() {
            return ConnectionStatus {
                configured: false,
                connected: false,
                details: "Outlook connection not configured".to_string(),
            };
        }

        match self.tokens.access_token().await {
            Ok(_) => ConnectionStatus {
                configured: true,
                connected: true,
                details: "Connected to Outlook".to_string(),
            },
            Err(err) => ConnectionStatus {
                configured: true,
                connected: false,
                details: err.to_string(),
            },
        }
    }

    pub async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<(), ConnectorError> {
        let token = self.tokens.access_token().await?;
        let message = json!({
            "message": {
                "subject": subject,
                "body": { "contentType": "Text", "content": body },
                "toRecipients": [ { "emailAddress": { "address": to } } ]
            }
        });

        let span = tracing::info_span!("graph_send_mail", to);
        let builder = self
            .http_client
            .post(format!("{}/me/sendMail", self.graph_base_url))
            .bearer_auth(token)
            .json(&message);
        http::send_json("Microsoft Graph", builder, span).await?;
        tracing::info!("Email sent to {}", to);
        Ok(())
    }

    /// Most recent inbox messages, newest first.
    pub async fn list_messages(&self, limit: u32) -> Result<Vec<EmailMessage>, ConnectorError> {
        let token = self.tokens.access_token().await?;
        let span = tracing::info_span!("graph_list_messages", limit);
        let builder = self
            .http_client
            .get(format!("{}/me/messages", self.graph_base_url))
            .bearer_auth(token)
            .query(&[
                ("$top", limit.clamp(1, 100).to_string()),
                ("$select", "id,subject,from,bodyPreview,receivedDateTime".to_string()),
                ("$orderby", "receivedDateTime desc".to_string()),
            ]);
        let payload = http::send_json("Microsoft Graph", builder, span).await?;

        Ok(payload["value"]
            .as_array()
            .map(|items| items.iter().map(EmailMessage::from_graph).collect())
            .unwrap_or_default())
    }
}

//! Feedback relay through the transactional e-mail API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use moodify_shared::protocol::FeedbackRequest;

use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Debug, Serialize, PartialEq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Mail for one feedback submission.
pub fn compose(req: &FeedbackRequest, from: &str, to: &str, at: DateTime<Utc>) -> OutgoingMail {
    let text = format!(
        "MOODIFY FEEDBACK
================

Type: {kind}
Timestamp: {timestamp}
Date: {date}

MESSAGE:
--------
{message}

---
Sent from Moodify App
",
        kind = req.kind.as_str().to_uppercase(),
        timestamp = at.to_rfc3339(),
        date = at.format("%B %-d, %Y %H:%M:%S UTC"),
        message = req.message,
    );

    OutgoingMail {
        from: from.to_string(),
        to: vec![to.to_string()],
        subject: format!("Moodify Feedback: {}", req.kind.title()),
        text,
    }
}

#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    from: String,
    to: String,
}

impl Mailer {
    pub fn new(http: reqwest::Client, config: &ServerConfig) -> Self {
        Self {
            http,
            base_url: config.resend_base_url.clone(),
            api_key: config.resend_api_key.clone(),
            from: config.feedback_from.clone(),
            to: config.feedback_to.clone(),
        }
    }

    /// Relay `req` and return the relay's message id.
    pub async fn send_feedback(&self, req: &FeedbackRequest) -> Result<Option<String>, ServerError> {
        let Some(key) = &self.api_key else {
            return Err(ServerError::Relay("RESEND_API_KEY is not set".into()));
        };

        let mail = compose(req, &self.from, &self.to, Utc::now());
        let resp = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(key)
            .json(&mail)
            .send()
            .await
            .map_err(|e| ServerError::Relay(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ServerError::Relay(format!("{status}: {detail}")));
        }

        let sent: SendResponse = resp
            .json()
            .await
            .map_err(|e| ServerError::Relay(e.to_string()))?;
        info!(kind = %req.kind, id = ?sent.id, "feedback relayed");
        Ok(sent.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use moodify_shared::protocol::FeedbackKind;

    #[test]
    fn test_compose() {
        let req = FeedbackRequest {
            kind: FeedbackKind::Feature,
            message: "Add a breathing timer".into(),
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 15, 30, 0).unwrap();
        let mail = compose(&req, "Moodify <a@b.dev>", "team@example.com", at);

        assert_eq!(mail.subject, "Moodify Feedback: Feature");
        assert_eq!(mail.to, vec!["team@example.com".to_string()]);
        assert!(mail.text.contains("Type: FEATURE"));
        assert!(mail.text.contains("Timestamp: 2025-03-04T15:30:00+00:00"));
        assert!(mail.text.contains("Date: March 4, 2025 15:30:00 UTC"));
        assert!(mail.text.contains("MESSAGE:\n--------\nAdd a breathing timer\n"));
    }

    #[tokio::test]
    async fn test_unconfigured_relay_fails() {
        let mailer = Mailer::new(reqwest::Client::new(), &ServerConfig::default());
        let req = FeedbackRequest {
            kind: FeedbackKind::Bug,
            message: "crash".into(),
        };
        assert!(matches!(
            mailer.send_feedback(&req).await,
            Err(ServerError::Relay(_))
        ));
    }
}

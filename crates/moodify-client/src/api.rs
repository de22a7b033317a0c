//! Calls to the Moodify API server.
//!
//! The insight and daily-question calls never fail: if the server cannot be
//! reached or answers badly, the same fallback payload the server would have
//! produced is returned with `fallback` set.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use moodify_shared::constants::DEFAULT_TIMEFRAME;
use moodify_shared::protocol::{
    AnalyzeMoodRequest, AnalyzeMoodResponse, DailyQuestionRequest, DailyQuestionResponse,
    FeedbackKind, FeedbackRequest, FeedbackResponse,
};
use moodify_shared::types::ApplicationState;

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// Insight text for the user's recorded history.
    pub async fn analyze_mood(&self, state: &ApplicationState) -> AnalyzeMoodResponse {
        let req = AnalyzeMoodRequest {
            mood_history: state.mood_history.clone(),
            assessment_history: state.assessment_history.clone(),
            timeframe: Some(DEFAULT_TIMEFRAME.to_string()),
        };

        match self.post("/api/analyze-mood", &req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "mood analysis unavailable, using fallback");
                AnalyzeMoodResponse::fallback()
            }
        }
    }

    pub async fn daily_question(&self, user_context: Option<&str>) -> DailyQuestionResponse {
        let req = DailyQuestionRequest {
            user_context: user_context.map(str::to_string),
        };

        match self.post("/api/daily-checkin", &req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "daily question unavailable, using fallback");
                DailyQuestionResponse::fallback()
            }
        }
    }

    /// Blank messages are rejected locally and never sent.
    pub async fn submit_feedback(
        &self,
        kind: FeedbackKind,
        message: &str,
    ) -> Result<FeedbackResponse, ClientError> {
        let req = FeedbackRequest {
            kind,
            message: message.to_string(),
        };
        req.validate()?;

        self.post("/api/feedback", &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodify_shared::constants::{FALLBACK_ANALYSIS, FALLBACK_QUESTIONS};
    use moodify_shared::ValidationError;

    // Nothing listens on the discard port.
    const DEAD_SERVER: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn test_analysis_falls_back_when_unreachable() {
        let client = ApiClient::new(DEAD_SERVER);
        let resp = client.analyze_mood(&ApplicationState::default()).await;
        assert!(resp.fallback);
        assert_eq!(resp.analysis, FALLBACK_ANALYSIS);
    }

    #[tokio::test]
    async fn test_question_falls_back_when_unreachable() {
        let client = ApiClient::new(DEAD_SERVER);
        let resp = client.daily_question(Some("Regular user")).await;
        assert!(resp.fallback);
        assert!(FALLBACK_QUESTIONS.contains(&resp.question.as_str()));
    }

    #[tokio::test]
    async fn test_blank_feedback_not_sent() {
        let client = ApiClient::new(DEAD_SERVER);
        let err = client
            .submit_feedback(FeedbackKind::Bug, "   ")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::EmptyFeedback)
        ));
    }

    #[tokio::test]
    async fn test_feedback_network_error_surfaces() {
        let client = ApiClient::new(DEAD_SERVER);
        let err = client
            .submit_feedback(FeedbackKind::Feature, "dark mode please")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}

//! Request and response bodies of the HTTP API, shared by the server and the
//! client wrapper.

use std::fmt;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_ANALYSIS, FALLBACK_QUESTIONS};
use crate::error::ValidationError;
use crate::types::{Assessment, MoodEntry};

// ---------------------------------------------------------------------------
// Mood analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMoodRequest {
    #[serde(default)]
    pub mood_history: Vec<MoodEntry>,
    #[serde(default)]
    pub assessment_history: Vec<Assessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeMoodResponse {
    pub analysis: String,
    /// Set when the text is the canned fallback rather than generated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl AnalyzeMoodResponse {
    pub fn fallback() -> Self {
        Self {
            analysis: FALLBACK_ANALYSIS.to_string(),
            fallback: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Daily question
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuestionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyQuestionResponse {
    pub question: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl DailyQuestionResponse {
    /// A random pick from the fixed fallback list.
    pub fn fallback() -> Self {
        let question = FALLBACK_QUESTIONS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(FALLBACK_QUESTIONS[0]);
        Self {
            question: question.to_string(),
            fallback: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Bug,
    Feature,
    #[default]
    General,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Bug => "bug",
            FeedbackKind::Feature => "feature",
            FeedbackKind::General => "general",
        }
    }

    /// "Bug", "Feature", "General"
    pub fn title(&self) -> &'static str {
        match self {
            FeedbackKind::Bug => "Bug",
            FeedbackKind::Feature => "Feature",
            FeedbackKind::General => "General",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(rename = "type", default)]
    pub kind: FeedbackKind,
    #[serde(default)]
    pub message: String,
}

impl FeedbackRequest {
    /// Blank or whitespace-only messages are rejected before any relay.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyFeedback);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

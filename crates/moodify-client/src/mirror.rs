//! One-way copies of local records to the hosted research database.
//!
//! Mirroring happens after the local write has committed and never feeds
//! back into it: rows are inserted, never read, never deleted. A failed insert
//! is logged and forgotten.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use moodify_shared::types::{Assessment, DailyCheckIn, MoodEntry, UserProfile};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Demographic columns attached to every mirrored row.
#[derive(Debug, Clone, Serialize)]
struct Demographics<'a> {
    age: u32,
    sex: &'static str,
    city: &'a str,
    zip_code: &'a str,
    school: Option<&'a str>,
}

impl<'a> From<&'a UserProfile> for Demographics<'a> {
    fn from(p: &'a UserProfile) -> Self {
        Self {
            age: p.age,
            sex: p.sex.as_str(),
            city: &p.city,
            zip_code: &p.zip_code,
            school: p.school.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorRecord {
    User(UserProfile),
    Mood {
        profile: UserProfile,
        entry: MoodEntry,
    },
    Assessment {
        profile: UserProfile,
        assessment: Assessment,
    },
    CheckIn {
        profile: UserProfile,
        check_in: DailyCheckIn,
    },
}

impl MirrorRecord {
    pub fn table(&self) -> &'static str {
        match self {
            MirrorRecord::User(_) => "users",
            MirrorRecord::Mood { .. } => "moods",
            MirrorRecord::Assessment { .. } => "assessments",
            MirrorRecord::CheckIn { .. } => "daily_checkins",
        }
    }

    /// Row body in the hosted table's snake_case layout.
    pub fn row(&self) -> Value {
        let (profile, extra) = match self {
            MirrorRecord::User(p) => (
                p,
                json!({
                    "has_consented": p.has_consented,
                    "consent_date": p.consent_date.to_rfc3339(),
                }),
            ),
            MirrorRecord::Mood { profile, entry } => (
                profile,
                json!({
                    "mood": entry.mood.as_str(),
                    "intensity": entry.intensity,
                    "note": entry.note,
                    "created_at": entry.created_at.to_rfc3339(),
                }),
            ),
            MirrorRecord::Assessment { profile, assessment } => (
                profile,
                json!({
                    "score": assessment.score,
                    "category": assessment.category.as_str(),
                    "responses": assessment.responses,
                    "completed_at": assessment.completed_at.to_rfc3339(),
                }),
            ),
            MirrorRecord::CheckIn { profile, check_in } => (
                profile,
                json!({
                    "question": check_in.question,
                    "answer": check_in.answer,
                    "created_at": check_in.created_at.to_rfc3339(),
                }),
            ),
        };

        let mut row = serde_json::to_value(Demographics::from(profile)).unwrap_or_else(|_| json!({}));
        if let (Value::Object(row), Value::Object(extra)) = (&mut row, extra) {
            row.extend(extra);
        }
        row
    }
}

/// Fire-and-forget sink for mirror writes.
pub trait Mirror: Send + Sync {
    /// Queue `record` for insertion. Returns immediately and never fails.
    fn submit(&self, record: MirrorRecord);
}

/// Used when no hosted database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMirror;

impl Mirror for DisabledMirror {
    fn submit(&self, record: MirrorRecord) {
        warn!(table = record.table(), "hosted database not configured, skipping mirror write");
    }
}

/// Inserts rows through the hosted database's PostgREST interface.
#[derive(Debug, Clone)]
pub struct RestMirror {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestMirror {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// The configured mirror, or [`DisabledMirror`] when credentials are
    /// missing or placeholders.
    pub fn from_config(config: &ClientConfig) -> Arc<dyn Mirror> {
        match config.mirror_credentials() {
            Some((url, key)) => Arc::new(Self::new(url, key)),
            None => Arc::new(DisabledMirror),
        }
    }

    pub fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub async fn insert(&self, record: &MirrorRecord) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.endpoint(record.table()))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&record.row())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

impl Mirror for RestMirror {
    fn submit(&self, record: MirrorRecord) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(table = record.table(), "no async runtime, dropping mirror write");
            return;
        };

        let mirror = self.clone();
        runtime.spawn(async move {
            match mirror.insert(&record).await {
                Ok(()) => debug!(table = record.table(), "mirror write stored"),
                Err(e) => error!(table = record.table(), error = %e, "mirror write failed"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use moodify_shared::types::{MoodKind, Sex};

    fn profile() -> UserProfile {
        UserProfile {
            age: 16,
            sex: Sex::Female,
            city: "Denver".into(),
            zip_code: "80202".into(),
            school: None,
            has_consented: true,
            consent_date: Utc::now(),
            has_pin: true,
        }
    }

    #[test]
    fn test_mood_row_carries_demographics() {
        let entry = MoodEntry::new(MoodKind::Stressed, 7, Some("exams"), Utc::now()).unwrap();
        let record = MirrorRecord::Mood {
            profile: profile(),
            entry,
        };

        assert_eq!(record.table(), "moods");
        let row = record.row();
        assert_eq!(row["age"], 16);
        assert_eq!(row["sex"], "female");
        assert_eq!(row["zip_code"], "80202");
        assert!(row["school"].is_null());
        assert_eq!(row["mood"], "stressed");
        assert_eq!(row["note"], "exams");
        assert!(row.get("id").is_none());
    }

    #[test]
    fn test_user_row() {
        let row = MirrorRecord::User(profile()).row();
        assert_eq!(row["has_consented"], true);
        assert!(row["consent_date"].is_string());
    }

    #[test]
    fn test_endpoint() {
        let mirror = RestMirror::new("https://abcd.supabase.co/", "k");
        assert_eq!(
            mirror.endpoint("daily_checkins"),
            "https://abcd.supabase.co/rest/v1/daily_checkins"
        );
    }

    #[test]
    fn test_submit_without_runtime_is_dropped() {
        RestMirror::new("https://abcd.supabase.co", "k").submit(MirrorRecord::User(profile()));
    }
}

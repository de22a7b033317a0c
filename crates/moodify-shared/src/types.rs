//! Domain records persisted locally and mirrored to the hosted database.
//!
//! Field names follow the camelCase layout of the stored JSON blobs so that
//! data written by earlier versions keeps loading.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::constants::{INTENSITY_MAX, INTENSITY_MIN, MAX_AGE, MIN_AGE, MIN_ZIP_LEN};
use crate::error::ValidationError;

/// Fresh opaque record identifier.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoodKind {
    VeryHappy,
    Happy,
    Neutral,
    Sad,
    VerySad,
    Anxious,
    Stressed,
}

impl MoodKind {
    pub const ALL: [MoodKind; 7] = [
        MoodKind::VeryHappy,
        MoodKind::Happy,
        MoodKind::Neutral,
        MoodKind::Sad,
        MoodKind::VerySad,
        MoodKind::Anxious,
        MoodKind::Stressed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodKind::VeryHappy => "very-happy",
            MoodKind::Happy => "happy",
            MoodKind::Neutral => "neutral",
            MoodKind::Sad => "sad",
            MoodKind::VerySad => "very-sad",
            MoodKind::Anxious => "anxious",
            MoodKind::Stressed => "stressed",
        }
    }
}

impl fmt::Display for MoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodKind::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field: "mood",
                value: s.to_string(),
            })
    }
}

/// A single mood log entry. Immutable once created; may only be deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: String,
    pub mood: MoodKind,
    /// 1-10
    pub intensity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MoodEntry {
    /// Build a new entry. A blank note is dropped.
    pub fn new(
        mood: MoodKind,
        intensity: u8,
        note: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if !(INTENSITY_MIN..=INTENSITY_MAX).contains(&intensity) {
            return Err(ValidationError::InvalidIntensity);
        }
        let note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self {
            id: new_record_id(),
            mood,
            intensity,
            note,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Questionnaire / assessment
// ---------------------------------------------------------------------------

/// A questionnaire answer: scale questions answer with a number, yes/no and
/// multiple-choice questions with text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Text(String),
}

impl Answer {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for Answer {
    fn from(n: f64) -> Self {
        Answer::Number(n)
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    pub question_id: String,
    pub answer: Answer,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentCategory {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl AssessmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentCategory::Excellent => "excellent",
            AssessmentCategory::Good => "good",
            AssessmentCategory::Fair => "fair",
            AssessmentCategory::NeedsAttention => "needs-attention",
        }
    }
}

impl fmt::Display for AssessmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub responses: Vec<QuestionnaireResponse>,
    pub completed_at: DateTime<Utc>,
    pub score: f64,
    pub category: AssessmentCategory,
}

// ---------------------------------------------------------------------------
// Daily check-in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyCheckIn {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Profile / PIN
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sex {
    Male,
    Female,
    NonBinary,
    PreferNotToSay,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::NonBinary => "non-binary",
            Sex::PreferNotToSay => "prefer-not-to-say",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub age: u32,
    pub sex: Sex,
    pub city: String,
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    pub has_consented: bool,
    pub consent_date: DateTime<Utc>,
    #[serde(rename = "hasPIN")]
    pub has_pin: bool,
}

/// Onboarding form input, before consent and PIN details are attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub city: String,
    pub zip_code: String,
    pub school: Option<String>,
}

impl ProfileDraft {
    /// Validate in form order and build the stored profile.
    pub fn into_profile(
        self,
        has_pin: bool,
        consent_date: DateTime<Utc>,
    ) -> Result<UserProfile, ValidationError> {
        let age = self
            .age
            .filter(|a| (MIN_AGE..=MAX_AGE).contains(a))
            .ok_or(ValidationError::InvalidAge)?;
        let sex = self.sex.ok_or(ValidationError::MissingSex)?;

        let city = self.city.trim();
        if city.is_empty() {
            return Err(ValidationError::MissingCity);
        }
        let zip_code = self.zip_code.trim();
        if zip_code.len() < MIN_ZIP_LEN {
            return Err(ValidationError::InvalidZipCode);
        }
        let school = self
            .school
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(UserProfile {
            age,
            sex,
            city: city.to_string(),
            zip_code: zip_code.to_string(),
            school,
            has_consented: true,
            consent_date,
            has_pin,
        })
    }
}

/// Stored PIN record. Holds the salted hash only, never the digits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PinData {
    #[serde(rename = "pin")]
    pub pin_hash: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Everything the user has recorded, persisted as one blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub has_completed_onboarding: bool,
    pub has_seen_welcome: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_assessment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check_in_date: Option<DateTime<Utc>>,
    pub assessment_history: Vec<Assessment>,
    pub mood_history: Vec<MoodEntry>,
    pub daily_check_ins: Vec<DailyCheckIn>,
}

/// Result of [`ApplicationState::from_stored`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedState {
    pub state: ApplicationState,
    /// History entries that no longer parse and were left out.
    pub skipped: usize,
}

fn flag(blob: &Value, field: &str) -> bool {
    blob.get(field).and_then(Value::as_bool).unwrap_or(false)
}

fn timestamp(blob: &Value, field: &str) -> Option<DateTime<Utc>> {
    blob.get(field)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn entries<T: DeserializeOwned>(blob: &Value, field: &str, skipped: &mut usize) -> Vec<T> {
    let Some(Value::Array(items)) = blob.get(field) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let parsed = serde_json::from_value(item.clone()).ok();
            if parsed.is_none() {
                *skipped += 1;
            }
            parsed
        })
        .collect()
}

impl ApplicationState {
    /// Rebuild the aggregate from a stored blob field by field. Missing
    /// fields take their defaults and history entries that do not parse are
    /// dropped one by one, so a single bad entry cannot empty the history.
    pub fn from_stored(blob: &Value) -> LoadedState {
        let mut skipped = 0;
        let state = ApplicationState {
            has_completed_onboarding: flag(blob, "hasCompletedOnboarding"),
            has_seen_welcome: flag(blob, "hasSeenWelcome"),
            last_assessment_date: timestamp(blob, "lastAssessmentDate"),
            last_check_in_date: timestamp(blob, "lastCheckInDate"),
            assessment_history: entries(blob, "assessmentHistory", &mut skipped),
            mood_history: entries(blob, "moodHistory", &mut skipped),
            daily_check_ins: entries(blob, "dailyCheckIns", &mut skipped),
        };
        LoadedState { state, skipped }
    }

    /// Drop mood entries and assessments older than `cutoff`.
    /// Check-ins are kept regardless of age.
    pub fn retain_since(&mut self, cutoff: DateTime<Utc>) {
        self.mood_history.retain(|m| m.created_at >= cutoff);
        self.assessment_history.retain(|a| a.completed_at >= cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_app_state_field_names() {
        let state = ApplicationState::default();
        let json = serde_json::to_value(&state).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "hasCompletedOnboarding",
            "hasSeenWelcome",
            "assessmentHistory",
            "moodHistory",
            "dailyCheckIns",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert!(!obj.contains_key("lastAssessmentDate"));
    }

    #[test]
    fn test_mood_entry_parses_stored_blob() {
        let raw = r#"{
            "id": "1717000000000",
            "mood": "very-sad",
            "intensity": 3,
            "createdAt": "2024-05-29T16:26:40.000Z"
        }"#;
        let entry: MoodEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.mood, MoodKind::VerySad);
        assert_eq!(entry.note, None);
        assert_eq!(
            entry.created_at,
            Utc.with_ymd_and_hms(2024, 5, 29, 16, 26, 40).unwrap()
        );
    }

    #[test]
    fn test_mood_entry_validates_intensity() {
        let now = Utc::now();
        assert_eq!(
            MoodEntry::new(MoodKind::Happy, 0, None, now),
            Err(ValidationError::InvalidIntensity)
        );
        assert_eq!(
            MoodEntry::new(MoodKind::Happy, 11, None, now),
            Err(ValidationError::InvalidIntensity)
        );
        let entry = MoodEntry::new(MoodKind::Happy, 10, Some("   "), now).unwrap();
        assert_eq!(entry.note, None);
    }

    #[test]
    fn test_answer_untagged() {
        let r: QuestionnaireResponse = serde_json::from_str(
            r#"{"questionId":"q4","answer":"yes","answeredAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(r.answer, Answer::Text("yes".into()));
        assert_eq!(r.answer.as_number(), None);

        let r: QuestionnaireResponse = serde_json::from_str(
            r#"{"questionId":"q1","answer":7,"answeredAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(r.answer.as_number(), Some(7.0));
    }

    #[test]
    fn test_pin_data_keeps_stored_layout() {
        let pin = PinData {
            pin_hash: "abc".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&pin).unwrap();
        assert_eq!(json["pin"], "abc");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_profile_draft_validation_order() {
        let now = Utc::now();
        let valid = ProfileDraft {
            age: Some(15),
            sex: Some(Sex::NonBinary),
            city: "  Austin ".into(),
            zip_code: "78701".into(),
            school: Some("   ".into()),
        };

        let profile = valid.clone().into_profile(true, now).unwrap();
        assert_eq!(profile.city, "Austin");
        assert_eq!(profile.school, None);
        assert!(profile.has_consented && profile.has_pin);

        let young = ProfileDraft { age: Some(12), ..valid.clone() };
        assert_eq!(young.into_profile(true, now), Err(ValidationError::InvalidAge));

        let no_sex = ProfileDraft { sex: None, city: String::new(), ..valid.clone() };
        assert_eq!(no_sex.into_profile(true, now), Err(ValidationError::MissingSex));

        let blank_city = ProfileDraft { city: " ".into(), ..valid.clone() };
        assert_eq!(blank_city.into_profile(true, now), Err(ValidationError::MissingCity));

        let short_zip = ProfileDraft { zip_code: "787 ".into(), ..valid };
        assert_eq!(short_zip.into_profile(true, now), Err(ValidationError::InvalidZipCode));
    }

    #[test]
    fn test_from_stored_skips_only_bad_entries() {
        let blob = serde_json::json!({
            "hasCompletedOnboarding": true,
            "lastCheckInDate": "2025-02-01T08:00:00Z",
            "moodHistory": [
                {"id": "1", "mood": "happy", "intensity": 7, "createdAt": "2025-02-01T08:00:00Z"},
                {"id": "2", "mood": "excited", "intensity": 7, "createdAt": "2025-02-01T09:00:00Z"},
                {"id": "3", "mood": "sad", "intensity": 2, "createdAt": "2025-02-01T10:00:00"}
            ],
            "dailyCheckIns": [
                {"id": "4", "question": "q", "answer": "a", "createdAt": "2024-01-01T00:00:00Z"}
            ],
            "someFutureField": 1
        });

        let loaded = ApplicationState::from_stored(&blob);
        assert_eq!(loaded.skipped, 2);
        assert!(loaded.state.has_completed_onboarding);
        assert!(!loaded.state.has_seen_welcome);
        assert!(loaded.state.last_check_in_date.is_some());
        assert_eq!(loaded.state.mood_history.len(), 1);
        assert_eq!(loaded.state.mood_history[0].id, "1");
        assert_eq!(loaded.state.daily_check_ins.len(), 1);
        assert!(loaded.state.assessment_history.is_empty());
    }

    #[test]
    fn test_from_stored_non_object_is_default() {
        let loaded = ApplicationState::from_stored(&serde_json::json!([1, 2]));
        assert_eq!(loaded.state, ApplicationState::default());
        assert_eq!(loaded.skipped, 0);
    }

    #[test]
    fn test_retain_since_keeps_check_ins() {
        let cutoff = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let old = cutoff - chrono::Duration::seconds(1);
        let mut state = ApplicationState::default();
        state.mood_history.push(MoodEntry::new(MoodKind::Sad, 3, None, old).unwrap());
        state.mood_history.push(MoodEntry::new(MoodKind::Happy, 8, None, cutoff).unwrap());
        state.daily_check_ins.push(DailyCheckIn {
            id: "c".into(),
            question: "q".into(),
            answer: "a".into(),
            created_at: old,
        });

        state.retain_since(cutoff);
        assert_eq!(state.mood_history.len(), 1);
        assert_eq!(state.mood_history[0].mood, MoodKind::Happy);
        assert_eq!(state.daily_check_ins.len(), 1);
    }

    #[test]
    fn test_mood_kind_from_str() {
        assert_eq!("anxious".parse::<MoodKind>().unwrap(), MoodKind::Anxious);
        assert!("ecstatic".parse::<MoodKind>().is_err());
    }
}

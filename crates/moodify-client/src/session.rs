//! The in-memory owner of everything the user has recorded.
//!
//! Every mutation commits to the local store first and only then queues a
//! mirror write. Local write failures are logged by the store and the
//! in-memory copy stays authoritative for the rest of the session.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use moodify_shared::constants::{KEY_APP_STATE, KEY_PIN, KEY_USER_PROFILE, MAX_PIN_ATTEMPTS, PIN_MIN_LEN};
use moodify_shared::pin::{hash_pin, validate_pin, verify_pin};
use moodify_shared::scoring::build_assessment;
use moodify_shared::stats::{chart_points, ChartPoint, MoodStats};
use moodify_shared::types::{
    new_record_id, ApplicationState, Assessment, DailyCheckIn, MoodEntry, MoodKind, PinData,
    ProfileDraft, QuestionnaireResponse, UserProfile,
};
use moodify_shared::ValidationError;
use moodify_store::retention::retention_cutoff;
use moodify_store::{reset_all, Database, KvStore, ResetReport, RetentionSweeper, SweeperHandle};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::mirror::{Mirror, MirrorRecord, RestMirror};

/// Which screen the user has to pass next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Welcome,
    PinRequired,
    LockedOut,
    Ready,
}

/// Welcome screen input.
#[derive(Debug, Clone, Default)]
pub struct WelcomeForm {
    pub age_confirmed: bool,
    pub consented: bool,
    pub pin: String,
    pub confirm_pin: String,
}

pub struct Session {
    store: KvStore,
    mirror: Arc<dyn Mirror>,
    profile: Option<UserProfile>,
    pin: Option<PinData>,
    state: ApplicationState,
    pin_verified: bool,
    failed_pin_attempts: u32,
    sweeper: Option<SweeperHandle>,
}

impl Session {
    /// Sweep, load the three owned keys and start the recurring sweeper.
    ///
    /// Outside a tokio runtime the recurring sweeper is not started; the
    /// opening sweep still runs.
    pub fn open(store: KvStore, mirror: Arc<dyn Mirror>) -> Self {
        let sweeper = RetentionSweeper::new(store.clone());
        sweeper.run_once();

        let profile: Option<UserProfile> = store.load(KEY_USER_PROFILE, None);
        let pin: Option<PinData> = store.load(KEY_PIN, None);
        let state = load_state(&store);

        let sweeper = match tokio::runtime::Handle::try_current() {
            Ok(_) => Some(sweeper.spawn()),
            Err(_) => {
                warn!("no async runtime, recurring retention sweep disabled");
                None
            }
        };

        info!(
            has_profile = profile.is_some(),
            has_pin = pin.is_some(),
            moods = state.mood_history.len(),
            assessments = state.assessment_history.len(),
            check_ins = state.daily_check_ins.len(),
            "session opened"
        );

        Self {
            store,
            mirror,
            profile,
            pin,
            state,
            pin_verified: false,
            failed_pin_attempts: 0,
            sweeper,
        }
    }

    /// Open against the on-disk database and the configured mirror.
    pub fn open_default(config: &ClientConfig) -> Result<Self, ClientError> {
        let db = match &config.data_dir {
            Some(dir) => Database::open_in_dir(dir)?,
            None => Database::new()?,
        };
        Ok(Self::open(KvStore::new(db), RestMirror::from_config(config)))
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    pub fn mood_stats(&self, now: DateTime<Utc>) -> MoodStats {
        MoodStats::compute(&self.state.mood_history, now)
    }

    pub fn mood_chart(&self) -> Vec<ChartPoint> {
        chart_points(&self.state.mood_history)
    }

    pub fn gate(&self) -> Gate {
        if self.profile.is_none() || !self.state.has_completed_onboarding {
            return Gate::Welcome;
        }
        if self.pin.is_some() && !self.pin_verified {
            if self.failed_pin_attempts >= MAX_PIN_ATTEMPTS {
                return Gate::LockedOut;
            }
            return Gate::PinRequired;
        }
        Gate::Ready
    }

    pub fn complete_welcome(&mut self, form: WelcomeForm) -> Result<(), ClientError> {
        if !form.age_confirmed {
            return Err(ValidationError::AgeNotConfirmed.into());
        }
        if !form.consented {
            return Err(ValidationError::ConsentRequired.into());
        }
        validate_pin(&form.pin)?;
        if form.pin != form.confirm_pin {
            return Err(ValidationError::PinMismatch.into());
        }

        let pin = PinData {
            pin_hash: hash_pin(&form.pin),
            created_at: Utc::now(),
        };
        self.store.save(KEY_PIN, &pin);
        self.pin = Some(pin);
        // Setting the PIN counts as entering it.
        self.pin_verified = true;

        self.state.has_seen_welcome = true;
        self.save_state();
        debug!("welcome completed");
        Ok(())
    }

    pub fn complete_onboarding(&mut self, draft: ProfileDraft) -> Result<&UserProfile, ClientError> {
        let profile = draft.into_profile(self.pin.is_some(), Utc::now())?;
        self.store.save(KEY_USER_PROFILE, &profile);
        self.mirror.submit(MirrorRecord::User(profile.clone()));
        info!(age = profile.age, "profile stored");
        Ok(self.profile.insert(profile))
    }

    /// Check `pin` against the stored hash. Blank or short input is rejected
    /// without counting as an attempt.
    pub fn verify_pin(&mut self, pin: &str) -> Result<(), ClientError> {
        let Some(stored) = &self.pin else {
            self.pin_verified = true;
            return Ok(());
        };
        if self.failed_pin_attempts >= MAX_PIN_ATTEMPTS {
            return Err(ValidationError::PinLockedOut.into());
        }
        if pin.len() < PIN_MIN_LEN {
            return Err(ValidationError::PinMissing.into());
        }

        if verify_pin(pin, &stored.pin_hash) {
            self.pin_verified = true;
            self.failed_pin_attempts = 0;
            return Ok(());
        }

        self.failed_pin_attempts += 1;
        let remaining = MAX_PIN_ATTEMPTS - self.failed_pin_attempts;
        warn!(remaining, "incorrect PIN");
        if remaining == 0 {
            Err(ValidationError::PinLockedOut.into())
        } else {
            Err(ValidationError::PinIncorrect { remaining }.into())
        }
    }

    pub fn add_mood(
        &mut self,
        mood: MoodKind,
        intensity: u8,
        note: Option<&str>,
    ) -> Result<MoodEntry, ClientError> {
        let entry = MoodEntry::new(mood, intensity, note, Utc::now())?;
        self.state.mood_history.push(entry.clone());
        self.save_state();

        if let Some(profile) = &self.profile {
            self.mirror.submit(MirrorRecord::Mood {
                profile: profile.clone(),
                entry: entry.clone(),
            });
        }
        debug!(mood = %entry.mood, intensity = entry.intensity, "mood logged");
        Ok(entry)
    }

    /// Remove a mood entry locally. The hosted copy is left alone.
    pub fn delete_mood(&mut self, id: &str) -> bool {
        let before = self.state.mood_history.len();
        self.state.mood_history.retain(|m| m.id != id);
        let removed = self.state.mood_history.len() != before;
        if removed {
            self.save_state();
        }
        removed
    }

    pub fn complete_assessment(&mut self, responses: Vec<QuestionnaireResponse>) -> Assessment {
        let now = Utc::now();
        let assessment = build_assessment(responses, now);

        self.state.assessment_history.push(assessment.clone());
        self.state.has_completed_onboarding = true;
        self.state.last_assessment_date = Some(now);
        self.save_state();

        if let Some(profile) = &self.profile {
            self.mirror.submit(MirrorRecord::Assessment {
                profile: profile.clone(),
                assessment: assessment.clone(),
            });
        }
        info!(score = assessment.score, category = %assessment.category, "assessment completed");
        assessment
    }

    pub fn add_check_in(&mut self, question: &str, answer: &str) -> Result<DailyCheckIn, ClientError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ValidationError::EmptyAnswer.into());
        }

        let now = Utc::now();
        let check_in = DailyCheckIn {
            id: new_record_id(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: now,
        };
        self.state.daily_check_ins.push(check_in.clone());
        self.state.last_check_in_date = Some(now);
        self.save_state();

        if let Some(profile) = &self.profile {
            self.mirror.submit(MirrorRecord::CheckIn {
                profile: profile.clone(),
                check_in: check_in.clone(),
            });
        }
        Ok(check_in)
    }

    /// True once onboarding is done and nothing was checked in on `now`'s
    /// local calendar day.
    pub fn needs_daily_check_in(&self, now: DateTime<Utc>) -> bool {
        if !self.state.has_completed_onboarding {
            return false;
        }
        let today = now.with_timezone(&Local).date_naive();
        self.state
            .last_check_in_date
            .map_or(true, |last| last.with_timezone(&Local).date_naive() != today)
    }

    /// Remove every owned key and clear the in-memory copy. Whatever the
    /// store managed to remove stays removed even if the report is partial.
    pub fn delete_all_data(&mut self) -> ResetReport {
        let report = reset_all(&self.store);
        self.profile = None;
        self.pin = None;
        self.state = ApplicationState::default();
        self.pin_verified = false;
        self.failed_pin_attempts = 0;
        report
    }

    /// Stop the recurring sweeper.
    pub async fn close(mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop().await;
        }
    }

    /// Persist the aggregate. The recurring sweeper only prunes the stored
    /// blob, so the in-memory history is cut to the same horizon first.
    fn save_state(&mut self) {
        self.state.retain_since(retention_cutoff(Utc::now()));
        self.store.save(KEY_APP_STATE, &self.state);
    }
}

/// Load the aggregate entry by entry, so one unreadable history entry costs
/// only that entry.
fn load_state(store: &KvStore) -> ApplicationState {
    let raw = match store.try_load_raw(KEY_APP_STATE) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ApplicationState::default(),
        Err(e) => {
            error!(key = KEY_APP_STATE, error = %e, "failed to read entry, using default");
            return ApplicationState::default();
        }
    };

    let blob: Value = match serde_json::from_str(&raw) {
        Ok(blob) => blob,
        Err(e) => {
            warn!(key = KEY_APP_STATE, error = %e, "stored entry is not valid JSON, using default");
            return ApplicationState::default();
        }
    };

    let loaded = ApplicationState::from_stored(&blob);
    if loaded.skipped > 0 {
        warn!(key = KEY_APP_STATE, skipped = loaded.skipped, "dropped unreadable history entries");
    }
    loaded.state
}

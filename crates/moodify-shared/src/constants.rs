/// Storage key of the user profile record
pub const KEY_USER_PROFILE: &str = "moodify-user-profile";

/// Storage key of the PIN record
pub const KEY_PIN: &str = "moodify-pin";

/// Storage key of the aggregate application state
pub const KEY_APP_STATE: &str = "moodify-app-state";

/// Every key the application owns, in reset order
pub const OWNED_KEYS: [&str; 3] = [KEY_USER_PROFILE, KEY_PIN, KEY_APP_STATE];

/// Maximum age of mood entries and assessments, in calendar months
pub const RETENTION_MONTHS: u32 = 3;

/// Interval between two retention sweeps (24 hours)
pub const RETENTION_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// PIN length bounds (digits)
pub const PIN_MIN_LEN: usize = 4;
pub const PIN_MAX_LEN: usize = 6;

/// Failed PIN attempts before the user can only reset
pub const MAX_PIN_ATTEMPTS: u32 = 3;

/// Salt size for PIN hashing in bytes
pub const PIN_SALT_SIZE: usize = 16;

/// Key derivation context for PIN hashing (BLAKE3)
pub const KDF_CONTEXT_PIN: &str = "moodify-pin-hash-v1";

/// Minimum onboarding age
pub const MIN_AGE: u32 = 13;
pub const MAX_AGE: u32 = 120;

/// Minimum zip code length
pub const MIN_ZIP_LEN: usize = 5;

/// Mood intensity bounds
pub const INTENSITY_MIN: u8 = 1;
pub const INTENSITY_MAX: u8 = 10;

/// Number of recent mood entries summarised for the insight prompt
pub const ANALYSIS_MOOD_WINDOW: usize = 14;

/// Number of entries plotted on the dashboard mood chart
pub const CHART_WINDOW: usize = 30;

/// Default timeframe label for mood analysis
pub const DEFAULT_TIMEFRAME: &str = "past week";

/// Returned by the insight endpoint whenever the language model is unavailable
pub const FALLBACK_ANALYSIS: &str = "I notice you've been tracking your moods regularly - that's a great step toward self-awareness! Based on your recent entries, keep focusing on the activities and people that lift your spirits. Try to maintain consistent sleep and movement habits, as these can have a big impact on how you feel. Remember, it's normal for moods to fluctuate - you're doing great by staying mindful of your emotional wellbeing.";

/// Daily questions served when the language model is unavailable
pub const FALLBACK_QUESTIONS: [&str; 8] = [
    "What's one thing that made you smile today?",
    "How are you feeling right now, in this moment?",
    "What's something you're looking forward to this week?",
    "If your mood had a color today, what would it be and why?",
    "What's one thing you did today to take care of yourself?",
    "On a scale of 1-10, how much energy do you have right now?",
    "What's something you're proud of from this week, big or small?",
    "Who's someone you could reach out to if you needed support?",
];

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

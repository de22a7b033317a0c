use thiserror::Error;

/// User-facing validation failures. The `Display` text is shown inline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please confirm you are at least 13 years old to continue.")]
    AgeNotConfirmed,

    #[error("Please review and accept the consent to continue.")]
    ConsentRequired,

    #[error("PIN must be at least 4 digits.")]
    PinTooShort,

    #[error("PIN must be at most 6 digits.")]
    PinTooLong,

    #[error("PIN may only contain digits.")]
    PinNotNumeric,

    #[error("PINs do not match.")]
    PinMismatch,

    #[error("Please enter your PIN")]
    PinMissing,

    #[error("Incorrect PIN. {remaining} attempts remaining.")]
    PinIncorrect { remaining: u32 },

    #[error("Too many failed attempts. You can reset your data below.")]
    PinLockedOut,

    #[error("Please enter a valid age (13+)")]
    InvalidAge,

    #[error("Please select your gender")]
    MissingSex,

    #[error("Please enter your city")]
    MissingCity,

    #[error("Please enter a valid zip code")]
    InvalidZipCode,

    #[error("Intensity must be between 1 and 10")]
    InvalidIntensity,

    #[error("Please write your answer before submitting.")]
    EmptyAnswer,

    #[error("Feedback message is required")]
    EmptyFeedback,

    #[error("Unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
}

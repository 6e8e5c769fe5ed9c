use thiserror::Error;

/// A wall-clock value that is not a usable `HH:MM` time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("'{0}' is not a time, expected HH:MM")]
    Malformed(String),
    #[error("'{0}' is outside 00:00-23:59")]
    OutOfRange(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardError {
    #[error("cannot redeem {requested} rewards, only {available} available")]
    Insufficient { requested: u64, available: u64 },
}

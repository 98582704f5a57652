use thiserror::Error;

/// Errors raised by the income analytics pipeline itself.
///
/// An empty transaction history and degenerate statistics are not
/// failures: the former still produces a valid (grade-F) report, and the
/// latter is recovered from in place with a logged substitution. Only
/// conditions that make it impossible to produce a well-formed report
/// reach this enum.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("invalid analysis period: end date {end} is before start date {start}")]
    InvalidPeriod { start: String, end: String },

    #[error("transaction {id} has an inconsistent date: {reason}")]
    MalformedTransaction { id: String, reason: String },

    #[error("documentation flags are inconsistent: {0}")]
    InconsistentDocumentation(String),

    #[error("period_months must be at least 1, got {0}")]
    InvalidPeriodMonths(u32),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors raised by the share-token lifecycle. Kept separate from
/// [`AnalyticsError`] because the token store is an independently
/// callable subsystem with its own failure modes, none of which the
/// analytics pipeline can ever produce.
#[derive(Error, Debug)]
pub enum ShareTokenError {
    #[error("share token not found")]
    NotFound,

    #[error("share token has expired")]
    Expired,

    #[error("share token has been revoked")]
    Revoked,

    #[error("share token collision: generated token already exists in the store")]
    Collision,
}

pub type ShareTokenResult<T> = std::result::Result<T, ShareTokenError>;

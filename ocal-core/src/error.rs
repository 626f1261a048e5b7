//! Error types for the ocal core.

use thiserror::Error;

/// Errors raised by the parsing and mapping core.
///
/// Each variant carries the offending input fragment so the CLI layer can
/// show a useful diagnostic. The core never catches or retries any of
/// these; the caller formats the message and sets a non-zero exit code.
#[derive(Error, Debug)]
pub enum OcalError {
    #[error("unrecognized date or time token '{0}'")]
    UnrecognizedDate(String),

    #[error("ambiguous time '{0}': a bare hour needs an am/pm marker or minutes")]
    AmbiguousTime(String),

    #[error("local time '{0}' does not exist in timezone '{1}' (DST gap)")]
    InvalidLocalTime(String, String),

    #[error("conflicting explicit UTC offsets: '{0}' vs '{1}'")]
    AmbiguousLocalization(String, String),

    #[error("quickadd parse error: {0}")]
    QuickaddParse(String),

    #[error("unsupported recurrence construct '{0}'")]
    UnsupportedRecurrence(String),

    #[error("malformed event payload: {0}")]
    MalformedPayload(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for ocal core operations.
pub type OcalResult<T> = Result<T, OcalError>;

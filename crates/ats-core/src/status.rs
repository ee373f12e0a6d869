//! The ingestion status state machine.
//!
//! `pending -> processing -> completed`, with `processing` able to branch into
//! one of a fixed set of terminal `failed:<reason>` states. Only
//! `failed:insufficient_text` is re-enterable, via the OCR retry path.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// The terminal reason suffixed onto a `failed:` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    FileTooLarge,
    InvalidFileType,
    EmptyFile,
    InsufficientText,
    ExtractionError,
    DesignationExtractionFailed,
    DatabaseError,
    UnknownError,
}

impl FailureReason {
    pub const ALL: [FailureReason; 8] = [
        FailureReason::FileTooLarge,
        FailureReason::InvalidFileType,
        FailureReason::EmptyFile,
        FailureReason::InsufficientText,
        FailureReason::ExtractionError,
        FailureReason::DesignationExtractionFailed,
        FailureReason::DatabaseError,
        FailureReason::UnknownError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::FileTooLarge => "file_too_large",
            FailureReason::InvalidFileType => "invalid_file_type",
            FailureReason::EmptyFile => "empty_file",
            FailureReason::InsufficientText => "insufficient_text",
            FailureReason::ExtractionError => "extraction_error",
            FailureReason::DesignationExtractionFailed => "designation_extraction_failed",
            FailureReason::DatabaseError => "database_error",
            FailureReason::UnknownError => "unknown_error",
        }
    }

    pub fn parse(s: &str) -> Option<FailureReason> {
        FailureReason::ALL.into_iter().find(|r| r.as_str() == s)
    }

    /// Whether a record parked in this failure reason may be retried.
    pub fn retryable(&self) -> bool {
        matches!(self, FailureReason::InsufficientText)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FailureReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FailureReason::parse(&s).ok_or_else(|| de::Error::custom(format!("unknown failure reason: {s}")))
    }
}

/// A resume's ingestion status. `Failed` carries the structured reason; the
/// wire/storage form is always `base` or `base:reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Processing,
    Completed,
    Failed(FailureReason),
}

impl Status {
    /// Split `"failed:insufficient_text"` into `("failed", Some(reason))`, or
    /// `"processing"` into `("processing", None)`.
    pub fn parse(raw: &str) -> Option<Status> {
        let mut parts = raw.splitn(2, ':');
        let base = parts.next()?;
        let rest = parts.next();
        match (base, rest) {
            ("pending", None) => Some(Status::Pending),
            ("processing", None) => Some(Status::Processing),
            ("completed", None) => Some(Status::Completed),
            ("failed", Some(reason)) => FailureReason::parse(reason).map(Status::Failed),
            _ => None,
        }
    }

    pub fn to_wire(&self) -> String {
        match self {
            Status::Pending => "pending".to_string(),
            Status::Processing => "processing".to_string(),
            Status::Completed => "completed".to_string(),
            Status::Failed(reason) => format!("failed:{reason}"),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Status::Completed => true,
            Status::Failed(reason) => !reason.retryable(),
            _ => false,
        }
    }

    /// Whether ingestion reached a return-worthy end state (success or a
    /// failure that is not silently going to be retried in-process).
    pub fn is_returnable(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Status::parse(&s).ok_or_else(|| de::Error::custom(format!("unknown status: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_states() {
        assert_eq!(Status::parse("pending"), Some(Status::Pending));
        assert_eq!(Status::parse("processing"), Some(Status::Processing));
        assert_eq!(Status::parse("completed"), Some(Status::Completed));
    }

    #[test]
    fn parses_failure_with_reason() {
        assert_eq!(
            Status::parse("failed:insufficient_text"),
            Some(Status::Failed(FailureReason::InsufficientText))
        );
        assert_eq!(Status::parse("failed:not_a_real_reason"), None);
    }

    #[test]
    fn round_trips_to_wire() {
        let s = Status::Failed(FailureReason::DatabaseError);
        assert_eq!(s.to_wire(), "failed:database_error");
        assert_eq!(Status::parse(&s.to_wire()), Some(s));
    }

    #[test]
    fn serde_round_trips_through_the_wire_string() {
        let s = Status::Failed(FailureReason::InsufficientText);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"failed:insufficient_text\"");
        assert_eq!(serde_json::from_str::<Status>(&json).unwrap(), s);
    }

    #[test]
    fn only_insufficient_text_is_retryable() {
        assert!(!Status::Failed(FailureReason::FileTooLarge).is_terminal());
        assert!(Status::Failed(FailureReason::UnknownError).is_terminal());
        assert!(FailureReason::InsufficientText.retryable());
        assert!(!FailureReason::UnknownError.retryable());
    }

    #[test]
    fn completed_and_terminal_failures_are_returnable() {
        assert!(Status::Completed.is_returnable());
        assert!(Status::Failed(FailureReason::EmptyFile).is_returnable());
        assert!(!Status::Processing.is_returnable());
    }
}

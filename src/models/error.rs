//! Domain error types for slot and schedule operations.
//!
//! The core only carries symbolic [`ErrorKind`]s. Human-readable text is
//! attached at the boundary through [`crate::messages`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Symbolic error kinds raised by the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Current time is after the slot's end time.
    SlotExpired,
    /// Block, cancel or reopen requested from a forbidden status.
    BlockedConflict,
    /// Reservation requested on a slot that is not available.
    NotAvailable,
    /// Reschedule requested on a slot that is not reserved.
    NotReserved,
    /// Structurally invalid slot input.
    InvalidSlot,
    /// Structurally invalid schedule input.
    InvalidSchedule,
    /// Schedule factory called without a date.
    ScheduleDateRequired,
    /// Schedule seeded with a blocked slot.
    ScheduleBlocked,
    /// Schedule seeded with a reserved slot.
    ScheduleReserved,
    /// Reschedule duration is not strictly positive.
    InvalidDuration,
    /// Routed slot operation names a slot the schedule does not own.
    SlotNotFound,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 11] = [
        ErrorKind::SlotExpired,
        ErrorKind::BlockedConflict,
        ErrorKind::NotAvailable,
        ErrorKind::NotReserved,
        ErrorKind::InvalidSlot,
        ErrorKind::InvalidSchedule,
        ErrorKind::ScheduleDateRequired,
        ErrorKind::ScheduleBlocked,
        ErrorKind::ScheduleReserved,
        ErrorKind::InvalidDuration,
        ErrorKind::SlotNotFound,
    ];

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::SlotExpired => "SLOT_EXPIRED",
            ErrorKind::BlockedConflict => "BLOCKED_CONFLICT",
            ErrorKind::NotAvailable => "NOT_AVAILABLE",
            ErrorKind::NotReserved => "NOT_RESERVED",
            ErrorKind::InvalidSlot => "INVALID_SLOT",
            ErrorKind::InvalidSchedule => "INVALID_SCHEDULE",
            ErrorKind::ScheduleDateRequired => "SCHEDULE_DATE_REQUIRED",
            ErrorKind::ScheduleBlocked => "SCHEDULE_BLOCKED",
            ErrorKind::ScheduleReserved => "SCHEDULE_RESERVED",
            ErrorKind::InvalidDuration => "INVALID_DURATION",
            ErrorKind::SlotNotFound => "SLOT_NOT_FOUND",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Broad classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input is structurally invalid; retrying with the same input cannot succeed.
    InvalidArgument,
    /// Current state forbids the requested transition.
    InvalidState,
}

/// Error type for slot and schedule operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid argument: {kind}{}", fmt_details(.details))]
    InvalidArgument {
        kind: ErrorKind,
        details: Option<String>,
    },

    #[error("Invalid state: {kind}{}", fmt_details(.details))]
    InvalidState {
        kind: ErrorKind,
        details: Option<String>,
    },
}

fn fmt_details(details: &Option<String>) -> String {
    details
        .as_ref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

impl DomainError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(kind: ErrorKind) -> Self {
        Self::InvalidArgument {
            kind,
            details: None,
        }
    }

    /// Create an invalid-state error.
    pub fn invalid_state(kind: ErrorKind) -> Self {
        Self::InvalidState {
            kind,
            details: None,
        }
    }

    /// Attach free-form details.
    pub fn with_details(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Self::InvalidArgument { details, .. } | Self::InvalidState { details, .. } => {
                *details = Some(text.into());
            }
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { kind, .. } | Self::InvalidState { kind, .. } => *kind,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } => ErrorCategory::InvalidArgument,
            Self::InvalidState { .. } => ErrorCategory::InvalidState,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { details, .. } | Self::InvalidState { details, .. } => {
                details.as_deref()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_category() {
        let err = DomainError::invalid_state(ErrorKind::NotAvailable);
        assert_eq!(err.kind(), ErrorKind::NotAvailable);
        assert_eq!(err.category(), ErrorCategory::InvalidState);
        assert!(err.details().is_none());

        let err = DomainError::invalid_argument(ErrorKind::InvalidSlot);
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }

    #[test]
    fn test_display_includes_code_and_details() {
        let err = DomainError::invalid_argument(ErrorKind::InvalidSlot).with_details("id=0");
        assert_eq!(err.to_string(), "Invalid argument: INVALID_SLOT (id=0)");

        let err = DomainError::invalid_state(ErrorKind::SlotExpired);
        assert_eq!(err.to_string(), "Invalid state: SLOT_EXPIRED");
    }

    #[test]
    fn test_kind_serializes_as_code() {
        for kind in ErrorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.code()));
        }
    }
}

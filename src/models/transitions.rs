//! Slot transition table.
//!
//! Every slot operation is resolved here, in one place, as
//! `(current status, operation) -> Ok(next status) | Err(kind)`.
//!
//! | from \ op   | block            | cancel           | reserve       | reschedule    | reopen           |
//! |-------------|------------------|------------------|---------------|---------------|------------------|
//! | AVAILABLE   | BLOCKED          | BLOCKED_CONFLICT | RESERVED      | NOT_RESERVED  | BLOCKED_CONFLICT |
//! | BLOCKED     | BLOCKED          | BLOCKED_CONFLICT | NOT_AVAILABLE | NOT_RESERVED  | AVAILABLE        |
//! | RESERVED    | BLOCKED_CONFLICT | CANCELLED        | NOT_AVAILABLE | RESCHEDULED   | BLOCKED_CONFLICT |
//! | CANCELLED   | BLOCKED_CONFLICT | CANCELLED        | NOT_AVAILABLE | NOT_RESERVED  | AVAILABLE        |
//! | RESCHEDULED | BLOCKED_CONFLICT | CANCELLED        | NOT_AVAILABLE | NOT_RESERVED  | BLOCKED_CONFLICT |
//!
//! Expiry is checked by the caller before the table is consulted.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ErrorKind;
use super::slot::SlotStatus;

/// Operations a slot can undergo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOperation {
    Block,
    Cancel,
    Reserve,
    Reschedule,
    Reopen,
}

impl SlotOperation {
    pub const ALL: [SlotOperation; 5] = [
        SlotOperation::Block,
        SlotOperation::Cancel,
        SlotOperation::Reserve,
        SlotOperation::Reschedule,
        SlotOperation::Reopen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotOperation::Block => "block",
            SlotOperation::Cancel => "cancel",
            SlotOperation::Reserve => "reserve",
            SlotOperation::Reschedule => "reschedule",
            SlotOperation::Reopen => "reopen",
        }
    }
}

impl fmt::Display for SlotOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve `operation` applied to a slot currently in `from`.
pub fn transition(from: SlotStatus, operation: SlotOperation) -> Result<SlotStatus, ErrorKind> {
    use SlotOperation as Op;
    use SlotStatus as S;

    match (operation, from) {
        (Op::Block, S::Available | S::Blocked) => Ok(S::Blocked),
        (Op::Block, S::Reserved | S::Cancelled | S::Rescheduled) => {
            Err(ErrorKind::BlockedConflict)
        }

        (Op::Cancel, S::Reserved | S::Cancelled | S::Rescheduled) => Ok(S::Cancelled),
        (Op::Cancel, S::Blocked | S::Available) => Err(ErrorKind::BlockedConflict),

        (Op::Reserve, S::Available) => Ok(S::Reserved),
        (Op::Reserve, _) => Err(ErrorKind::NotAvailable),

        (Op::Reschedule, S::Reserved) => Ok(S::Rescheduled),
        (Op::Reschedule, _) => Err(ErrorKind::NotReserved),

        (Op::Reopen, S::Cancelled | S::Blocked) => Ok(S::Available),
        (Op::Reopen, S::Available | S::Reserved | S::Rescheduled) => {
            Err(ErrorKind::BlockedConflict)
        }
    }
}

/// Statuses from which `operation` is allowed.
pub fn allowed_sources(operation: SlotOperation) -> Vec<SlotStatus> {
    SlotStatus::ALL
        .into_iter()
        .filter(|status| transition(*status, operation).is_ok())
        .collect()
}

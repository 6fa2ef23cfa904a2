//! Bookable time slot and its status state machine.
//!
//! A [`Slot`] can only be created through [`Slot::new`] (or [`SlotBuilder`],
//! which delegates to it) and only changes status through the five transition
//! operations. Each operation first refuses expired slots, then consults
//! [`transition`]. A failed operation leaves the slot untouched.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{DomainError, DomainResult, ErrorKind};
use super::policy::SchedulingPolicy;
use super::time::Clock;
use super::transitions::{transition, SlotOperation};
use crate::define_id_type;

define_id_type!(i64, SlotId);

/// Status of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Available,
    Blocked,
    Reserved,
    Cancelled,
    Rescheduled,
}

impl SlotStatus {
    pub const ALL: [SlotStatus; 5] = [
        SlotStatus::Available,
        SlotStatus::Blocked,
        SlotStatus::Reserved,
        SlotStatus::Cancelled,
        SlotStatus::Rescheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "AVAILABLE",
            SlotStatus::Blocked => "BLOCKED",
            SlotStatus::Reserved => "RESERVED",
            SlotStatus::Cancelled => "CANCELLED",
            SlotStatus::Rescheduled => "RESCHEDULED",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bookable time interval with a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotRecord")]
pub struct Slot {
    id: SlotId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: SlotStatus,
}

/// Unvalidated wire shape of a [`Slot`].
#[derive(Deserialize)]
struct SlotRecord {
    id: SlotId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: SlotStatus,
}

impl TryFrom<SlotRecord> for Slot {
    type Error = DomainError;

    fn try_from(record: SlotRecord) -> Result<Self, Self::Error> {
        Slot::new(record.id, record.start_time, record.end_time, record.status)
    }
}

impl Slot {
    /// Create a validated slot.
    ///
    /// # Errors
    /// `INVALID_SLOT` when `id <= 0` or `start_time > end_time`.
    pub fn new(
        id: impl Into<SlotId>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: SlotStatus,
    ) -> DomainResult<Self> {
        let id = id.into();
        if !id.is_positive() {
            return Err(DomainError::invalid_argument(ErrorKind::InvalidSlot)
                .with_details(format!("slot id must be positive, got {}", id)));
        }
        if start_time > end_time {
            return Err(DomainError::invalid_argument(ErrorKind::InvalidSlot)
                .with_details(format!("start {} is after end {}", start_time, end_time)));
        }

        Ok(Self {
            id,
            start_time,
            end_time,
            status,
        })
    }

    /// Create a validated slot, applying the construction policy at `now`.
    ///
    /// With `reject_past_timestamps_on_construct`, a start before `now` is
    /// rejected with `INVALID_SLOT` (`start <= end`, so this covers the end too).
    pub fn new_with_policy(
        id: impl Into<SlotId>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: SlotStatus,
        policy: &SchedulingPolicy,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let slot = Self::new(id, start_time, end_time, status)?;
        if policy.reject_past_timestamps_on_construct && start_time < now {
            return Err(DomainError::invalid_argument(ErrorKind::InvalidSlot)
                .with_details(format!("slot {} lies in the past", slot.id)));
        }
        Ok(slot)
    }

    pub fn builder() -> SlotBuilder {
        SlotBuilder::default()
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    /// A slot is expired once `now` is strictly after its end time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }

    /// Whether the transition table allows `operation` from the current status.
    /// Expiry is not considered.
    pub fn can(&self, operation: SlotOperation) -> bool {
        transition(self.status, operation).is_ok()
    }

    pub fn block<C: Clock + ?Sized>(&mut self, clock: &C) -> DomainResult<()> {
        self.apply(SlotOperation::Block, clock.now())
    }

    pub fn cancel<C: Clock + ?Sized>(&mut self, clock: &C) -> DomainResult<()> {
        self.apply(SlotOperation::Cancel, clock.now())
    }

    pub fn reserve<C: Clock + ?Sized>(&mut self, clock: &C) -> DomainResult<()> {
        self.apply(SlotOperation::Reserve, clock.now())
    }

    pub fn reopen<C: Clock + ?Sized>(&mut self, clock: &C) -> DomainResult<()> {
        self.apply(SlotOperation::Reopen, clock.now())
    }

    /// Move a reserved slot to a new interval.
    ///
    /// Checks, in order: expiry (`SLOT_EXPIRED`), `duration_minutes > 0`
    /// (`INVALID_DURATION`), `new_start <= new_end` (`INVALID_SLOT`), then the
    /// transition table (`NOT_RESERVED`).
    pub fn reschedule<C: Clock + ?Sized>(
        &mut self,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        duration_minutes: i64,
        clock: &C,
    ) -> DomainResult<()> {
        self.reschedule_with_policy(
            new_start,
            new_end,
            duration_minutes,
            &SchedulingPolicy::default(),
            clock,
        )
    }

    /// [`Slot::reschedule`] honouring `legacy_duration_error_kind`.
    pub fn reschedule_with_policy<C: Clock + ?Sized>(
        &mut self,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        duration_minutes: i64,
        policy: &SchedulingPolicy,
        clock: &C,
    ) -> DomainResult<()> {
        let now = clock.now();
        self.ensure_not_expired(now)?;

        if duration_minutes <= 0 {
            let kind = if policy.legacy_duration_error_kind {
                ErrorKind::NotAvailable
            } else {
                ErrorKind::InvalidDuration
            };
            return Err(DomainError::invalid_argument(kind)
                .with_details(format!("duration must be positive, got {}", duration_minutes)));
        }
        if new_start > new_end {
            return Err(DomainError::invalid_argument(ErrorKind::InvalidSlot)
                .with_details(format!("start {} is after end {}", new_start, new_end)));
        }

        let next = self.next_status(SlotOperation::Reschedule)?;
        self.start_time = new_start;
        self.end_time = new_end;
        self.commit(SlotOperation::Reschedule, next);
        Ok(())
    }

    fn apply(&mut self, operation: SlotOperation, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_expired(now)?;
        let next = self.next_status(operation)?;
        self.commit(operation, next);
        Ok(())
    }

    fn ensure_not_expired(&self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_expired(now) {
            return Err(DomainError::invalid_state(ErrorKind::SlotExpired)
                .with_details(format!("slot {} ended at {}", self.id, self.end_time)));
        }
        Ok(())
    }

    fn next_status(&self, operation: SlotOperation) -> DomainResult<SlotStatus> {
        transition(self.status, operation).map_err(|kind| {
            DomainError::invalid_state(kind).with_details(format!(
                "cannot {} slot {} in status {}",
                operation, self.id, self.status
            ))
        })
    }

    fn commit(&mut self, operation: SlotOperation, next: SlotStatus) {
        debug!(
            "slot {}: {} {} -> {}",
            self.id, operation, self.status, next
        );
        self.status = next;
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Slot{{id={}, start_time={}, end_time={}, status={}}}",
            self.id, self.start_time, self.end_time, self.status
        )
    }
}

/// Incremental constructor for [`Slot`].
///
/// Missing fields are reported as `INVALID_SLOT` by [`SlotBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct SlotBuilder {
    id: Option<SlotId>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    status: Option<SlotStatus>,
}

impl SlotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<SlotId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn status(mut self, status: SlotStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn build(self) -> DomainResult<Slot> {
        match (self.id, self.start_time, self.end_time, self.status) {
            (Some(id), Some(start), Some(end), Some(status)) => Slot::new(id, start, end, status),
            _ => Err(DomainError::invalid_argument(ErrorKind::InvalidSlot)
                .with_details("id, start_time, end_time and status are required")),
        }
    }
}

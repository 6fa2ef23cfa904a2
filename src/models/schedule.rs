//! Daily schedule aggregate.
//!
//! A [`Schedule`] owns a non-empty, ordered list of [`Slot`]s for one calendar
//! date. Construction validates the slot set; afterwards slots are only reached
//! mutably through the schedule's routed operations (`reserve_slot`,
//! `block_slot`, ...). The seeding rules are checked at construction time only:
//! a schedule may legitimately hold reserved slots after callers reserve them.
//!
//! The aggregate status is whatever the factory assigned. [`derive_status`]
//! computes the status implied by the slots, and [`Schedule::recompute_status`]
//! produces a new schedule carrying it.

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::error::{DomainError, DomainResult, ErrorKind};
use super::policy::SchedulingPolicy;
use super::slot::{Slot, SlotId, SlotStatus};
use super::time::Clock;
use crate::define_id_type;

define_id_type!(i64, ScheduleId);

/// Aggregate status of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Active,
    Blocked,
    Cancelled,
    Default,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Active => "ACTIVE",
            ScheduleStatus::Blocked => "BLOCKED",
            ScheduleStatus::Cancelled => "CANCELLED",
            ScheduleStatus::Default => "DEFAULT",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status implied by a slot sequence.
///
/// Empty → `DEFAULT`; every slot blocked → `BLOCKED`; at least one slot
/// available → `ACTIVE`; otherwise `CANCELLED`.
pub fn derive_status(slots: &[Slot]) -> ScheduleStatus {
    if slots.is_empty() {
        return ScheduleStatus::Default;
    }
    if slots.iter().all(|slot| slot.status() == SlotStatus::Blocked) {
        ScheduleStatus::Blocked
    } else if slots
        .iter()
        .any(|slot| slot.status() == SlotStatus::Available)
    {
        ScheduleStatus::Active
    } else {
        ScheduleStatus::Cancelled
    }
}

/// Schedule-level seeding rules.
///
/// # Errors
/// - `INVALID_SCHEDULE` for an empty sequence or a repeated slot id
/// - `SCHEDULE_BLOCKED` for the first blocked slot
/// - `SCHEDULE_RESERVED` for the first reserved slot
pub fn validate_slots(slots: &[Slot]) -> DomainResult<()> {
    ensure_slot_ids(slots)?;
    for slot in slots {
        match slot.status() {
            SlotStatus::Blocked => {
                return Err(DomainError::invalid_argument(ErrorKind::ScheduleBlocked)
                    .with_details(format!("slot {} is blocked", slot.id())))
            }
            SlotStatus::Reserved => {
                return Err(DomainError::invalid_argument(ErrorKind::ScheduleReserved)
                    .with_details(format!("slot {} is reserved", slot.id())))
            }
            SlotStatus::Available | SlotStatus::Cancelled | SlotStatus::Rescheduled => {}
        }
    }
    Ok(())
}

/// Structural slot checks shared by construction and restore: non-empty, ids unique.
fn ensure_slot_ids(slots: &[Slot]) -> DomainResult<()> {
    if slots.is_empty() {
        return Err(DomainError::invalid_argument(ErrorKind::InvalidSchedule)
            .with_details("a schedule needs at least one slot"));
    }
    let mut seen = HashSet::with_capacity(slots.len());
    for slot in slots {
        if !seen.insert(slot.id()) {
            return Err(DomainError::invalid_argument(ErrorKind::InvalidSchedule)
                .with_details(format!("slot id {} appears more than once", slot.id())));
        }
    }
    Ok(())
}

/// An aggregate of slots for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRecord")]
pub struct Schedule {
    id: ScheduleId,
    date: NaiveDate,
    status: ScheduleStatus,
    slots: Vec<Slot>,
}

#[derive(Deserialize)]
struct ScheduleRecord {
    id: ScheduleId,
    date: NaiveDate,
    status: ScheduleStatus,
    slots: Vec<Slot>,
}

impl TryFrom<ScheduleRecord> for Schedule {
    type Error = DomainError;

    fn try_from(record: ScheduleRecord) -> Result<Self, Self::Error> {
        Schedule::restore(record.id, record.date, record.status, record.slots)
    }
}

impl Schedule {
    /// Base constructor.
    ///
    /// # Errors
    /// `INVALID_SCHEDULE` when `id <= 0` or `slots` is empty, and the
    /// slot-specific kinds of [`validate_slots`].
    pub fn new(
        id: impl Into<ScheduleId>,
        date: NaiveDate,
        status: ScheduleStatus,
        slots: Vec<Slot>,
    ) -> DomainResult<Self> {
        let id = id.into();
        ensure_positive(id)?;
        validate_slots(&slots)?;

        debug!(
            "schedule {} for {} constructed as {} with {} slot(s)",
            id,
            date,
            status,
            slots.len()
        );
        Ok(Self {
            id,
            date,
            status,
            slots,
        })
    }

    /// Rebuild a previously persisted schedule.
    ///
    /// Only structural invariants are checked (`id > 0`, at least one slot,
    /// unique slot ids); the construction-time seeding rules are not
    /// re-applied.
    pub fn restore(
        id: impl Into<ScheduleId>,
        date: NaiveDate,
        status: ScheduleStatus,
        slots: Vec<Slot>,
    ) -> DomainResult<Self> {
        let id = id.into();
        ensure_positive(id)?;
        ensure_slot_ids(&slots)?;
        Ok(Self {
            id,
            date,
            status,
            slots,
        })
    }

    /// Create an `ACTIVE` schedule.
    pub fn create_schedule(
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> DomainResult<Self> {
        Self::from_factory(ScheduleStatus::Active, id.into(), date.into(), slots)
    }

    /// Create a `BLOCKED` schedule.
    pub fn block_schedule(
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> DomainResult<Self> {
        Self::from_factory(ScheduleStatus::Blocked, id.into(), date.into(), slots)
    }

    /// Create a `CANCELLED` schedule.
    pub fn cancel_schedule(
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> DomainResult<Self> {
        Self::from_factory(ScheduleStatus::Cancelled, id.into(), date.into(), slots)
    }

    fn from_factory(
        status: ScheduleStatus,
        id: ScheduleId,
        date: Option<NaiveDate>,
        slots: Vec<Slot>,
    ) -> DomainResult<Self> {
        let date = date.ok_or_else(|| {
            DomainError::invalid_argument(ErrorKind::ScheduleDateRequired)
                .with_details(format!("schedule {} has no date", id))
        })?;
        Self::new(id, date, status, slots)
    }

    pub fn builder() -> ScheduleBuilder {
        ScheduleBuilder::default()
    }

    pub fn id(&self) -> ScheduleId {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn status(&self) -> ScheduleStatus {
        self.status
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: impl Into<SlotId>) -> Option<&Slot> {
        let slot_id = slot_id.into();
        self.slots.iter().find(|slot| slot.id() == slot_id)
    }

    pub fn into_slots(self) -> Vec<Slot> {
        self.slots
    }

    /// Status implied by the current slots.
    pub fn derived_status(&self) -> ScheduleStatus {
        derive_status(&self.slots)
    }

    /// Produce this schedule with its status replaced by [`Schedule::derived_status`].
    pub fn recompute_status(self) -> Self {
        let status = self.derived_status();
        if status != self.status {
            debug!(
                "schedule {}: status recomputed {} -> {}",
                self.id, self.status, status
            );
        }
        Self { status, ..self }
    }

    pub fn block_slot<C: Clock + ?Sized>(
        &mut self,
        slot_id: impl Into<SlotId>,
        clock: &C,
    ) -> DomainResult<()> {
        self.slot_mut(slot_id.into())?.block(clock)
    }

    pub fn cancel_slot<C: Clock + ?Sized>(
        &mut self,
        slot_id: impl Into<SlotId>,
        clock: &C,
    ) -> DomainResult<()> {
        self.slot_mut(slot_id.into())?.cancel(clock)
    }

    pub fn reserve_slot<C: Clock + ?Sized>(
        &mut self,
        slot_id: impl Into<SlotId>,
        clock: &C,
    ) -> DomainResult<()> {
        self.slot_mut(slot_id.into())?.reserve(clock)
    }

    pub fn reopen_slot<C: Clock + ?Sized>(
        &mut self,
        slot_id: impl Into<SlotId>,
        clock: &C,
    ) -> DomainResult<()> {
        self.slot_mut(slot_id.into())?.reopen(clock)
    }

    pub fn reschedule_slot<C: Clock + ?Sized>(
        &mut self,
        slot_id: impl Into<SlotId>,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        duration_minutes: i64,
        policy: &SchedulingPolicy,
        clock: &C,
    ) -> DomainResult<()> {
        self.slot_mut(slot_id.into())?.reschedule_with_policy(
            new_start,
            new_end,
            duration_minutes,
            policy,
            clock,
        )
    }

    fn slot_mut(&mut self, slot_id: SlotId) -> DomainResult<&mut Slot> {
        let schedule_id = self.id;
        self.slots
            .iter_mut()
            .find(|slot| slot.id() == slot_id)
            .ok_or_else(|| {
                DomainError::invalid_state(ErrorKind::SlotNotFound).with_details(format!(
                    "schedule {} has no slot {}",
                    schedule_id, slot_id
                ))
            })
    }
}

fn ensure_positive(id: ScheduleId) -> DomainResult<()> {
    if !id.is_positive() {
        return Err(DomainError::invalid_argument(ErrorKind::InvalidSchedule)
            .with_details(format!("schedule id must be positive, got {}", id)));
    }
    Ok(())
}

/// Policy-aware constructor for slots and schedules.
///
/// Applies [`SchedulingPolicy::reject_past_timestamps_on_construct`] against
/// the supplied clock; otherwise identical to the plain constructors.
pub struct ScheduleFactory<'a, C: Clock + ?Sized> {
    policy: SchedulingPolicy,
    clock: &'a C,
}

impl<'a, C: Clock + ?Sized> ScheduleFactory<'a, C> {
    pub fn new(policy: SchedulingPolicy, clock: &'a C) -> Self {
        Self { policy, clock }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn slot(
        &self,
        id: impl Into<SlotId>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: SlotStatus,
    ) -> DomainResult<Slot> {
        Slot::new_with_policy(
            id,
            start_time,
            end_time,
            status,
            &self.policy,
            self.clock.now(),
        )
    }

    pub fn create_schedule(
        &self,
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> DomainResult<Schedule> {
        self.build(ScheduleStatus::Active, id.into(), date.into(), slots)
    }

    pub fn block_schedule(
        &self,
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> DomainResult<Schedule> {
        self.build(ScheduleStatus::Blocked, id.into(), date.into(), slots)
    }

    pub fn cancel_schedule(
        &self,
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> DomainResult<Schedule> {
        self.build(ScheduleStatus::Cancelled, id.into(), date.into(), slots)
    }

    fn build(
        &self,
        status: ScheduleStatus,
        id: ScheduleId,
        date: Option<NaiveDate>,
        slots: Vec<Slot>,
    ) -> DomainResult<Schedule> {
        if self.policy.reject_past_timestamps_on_construct {
            let today = self.clock.today();
            if matches!(date, Some(date) if date < today) {
                return Err(DomainError::invalid_argument(ErrorKind::InvalidSchedule)
                    .with_details(format!("schedule {} is dated before {}", id, today)));
            }
        }
        Schedule::from_factory(status, id, date, slots)
    }
}

/// Incremental constructor for [`Schedule`].
///
/// Any missing field is reported as `INVALID_SCHEDULE`; otherwise
/// [`Schedule::new`] runs as usual.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    id: Option<ScheduleId>,
    date: Option<NaiveDate>,
    status: Option<ScheduleStatus>,
    slots: Option<Vec<Slot>>,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<ScheduleId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn status(mut self, status: ScheduleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn slots(mut self, slots: Vec<Slot>) -> Self {
        self.slots = Some(slots);
        self
    }

    /// Append one slot to the sequence.
    pub fn slot(mut self, slot: Slot) -> Self {
        self.slots.get_or_insert_with(Vec::new).push(slot);
        self
    }

    pub fn build(self) -> DomainResult<Schedule> {
        match (self.id, self.date, self.status, self.slots) {
            (Some(id), Some(date), Some(status), Some(slots)) => {
                Schedule::new(id, date, status, slots)
            }
            _ => Err(DomainError::invalid_argument(ErrorKind::InvalidSchedule)
                .with_details("id, date, status and slots are required")),
        }
    }
}

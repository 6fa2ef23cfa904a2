//! Schedule service: persistence plus single-writer access per schedule.
//!
//! Every mutating call takes the schedule's async lock, loads the stored
//! schedule, applies the domain operation to that copy and saves it. A failed
//! operation saves nothing, so the stored schedule is left as it was. Two
//! concurrent reservations of the same slot therefore resolve to one success
//! and one `NOT_AVAILABLE`.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

use super::{ServiceError, ServiceResult};
use crate::config::SchedulingConfig;
use crate::db::{ErrorContext, LocalRepository, Repository, RepositoryError};
use crate::models::{
    Clock, DomainResult, Schedule, ScheduleFactory, ScheduleId, SchedulingPolicy, Slot, SlotId,
    SlotStatus, SystemClock,
};

/// Orchestrates schedule creation, lookup and slot transitions.
pub struct ScheduleService {
    repository: Arc<dyn Repository<Schedule>>,
    clock: Arc<dyn Clock>,
    policy: SchedulingPolicy,
    locks: Mutex<HashMap<ScheduleId, Arc<AsyncMutex<()>>>>,
}

impl ScheduleService {
    pub fn new(
        repository: Arc<dyn Repository<Schedule>>,
        clock: Arc<dyn Clock>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            repository,
            clock,
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_config(
        repository: Arc<dyn Repository<Schedule>>,
        clock: Arc<dyn Clock>,
        config: &SchedulingConfig,
    ) -> Self {
        Self::new(repository, clock, config.policy())
    }

    /// In-memory repository, system clock, default policy.
    pub fn local() -> Self {
        Self::new(
            Arc::new(LocalRepository::<Schedule>::new()),
            Arc::new(SystemClock::new()),
            SchedulingPolicy::default(),
        )
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Build a slot under the service policy (past timestamps are checked
    /// against the service clock when the policy asks for it).
    pub fn new_slot(
        &self,
        id: impl Into<SlotId>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: SlotStatus,
    ) -> ServiceResult<Slot> {
        Ok(self.factory().slot(id, start_time, end_time, status)?)
    }

    /// Create and store an `ACTIVE` schedule, replacing any schedule with the same id.
    pub async fn create_schedule(
        &self,
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> ServiceResult<Schedule> {
        let schedule = self.factory().create_schedule(id, date, slots)?;
        self.store(schedule).await
    }

    /// Create and store a `BLOCKED` schedule, replacing any schedule with the same id.
    pub async fn block_schedule(
        &self,
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> ServiceResult<Schedule> {
        let schedule = self.factory().block_schedule(id, date, slots)?;
        self.store(schedule).await
    }

    /// Create and store a `CANCELLED` schedule, replacing any schedule with the same id.
    pub async fn cancel_schedule(
        &self,
        id: impl Into<ScheduleId>,
        date: impl Into<Option<NaiveDate>>,
        slots: Vec<Slot>,
    ) -> ServiceResult<Schedule> {
        let schedule = self.factory().cancel_schedule(id, date, slots)?;
        self.store(schedule).await
    }

    pub async fn get_schedule(&self, id: impl Into<ScheduleId>) -> ServiceResult<Schedule> {
        self.load(id.into(), "get_schedule").await
    }

    pub async fn list_schedules(&self) -> ServiceResult<Vec<Schedule>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn delete_schedule(&self, id: impl Into<ScheduleId>) -> ServiceResult<()> {
        let id = id.into();
        let lease = self.lease(id);
        let _guard = lease.lock.lock().await;
        self.repository.delete_by_id(id).await?;
        info!("schedule {} deleted", id);
        Ok(())
    }

    pub async fn reserve_slot(
        &self,
        schedule_id: impl Into<ScheduleId>,
        slot_id: impl Into<SlotId>,
    ) -> ServiceResult<Schedule> {
        let slot_id = slot_id.into();
        self.mutate(schedule_id.into(), "reserve_slot", move |schedule, clock| {
            schedule.reserve_slot(slot_id, clock)
        })
        .await
    }

    pub async fn block_slot(
        &self,
        schedule_id: impl Into<ScheduleId>,
        slot_id: impl Into<SlotId>,
    ) -> ServiceResult<Schedule> {
        let slot_id = slot_id.into();
        self.mutate(schedule_id.into(), "block_slot", move |schedule, clock| {
            schedule.block_slot(slot_id, clock)
        })
        .await
    }

    pub async fn cancel_slot(
        &self,
        schedule_id: impl Into<ScheduleId>,
        slot_id: impl Into<SlotId>,
    ) -> ServiceResult<Schedule> {
        let slot_id = slot_id.into();
        self.mutate(schedule_id.into(), "cancel_slot", move |schedule, clock| {
            schedule.cancel_slot(slot_id, clock)
        })
        .await
    }

    pub async fn reopen_slot(
        &self,
        schedule_id: impl Into<ScheduleId>,
        slot_id: impl Into<SlotId>,
    ) -> ServiceResult<Schedule> {
        let slot_id = slot_id.into();
        self.mutate(schedule_id.into(), "reopen_slot", move |schedule, clock| {
            schedule.reopen_slot(slot_id, clock)
        })
        .await
    }

    pub async fn reschedule_slot(
        &self,
        schedule_id: impl Into<ScheduleId>,
        slot_id: impl Into<SlotId>,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        duration_minutes: i64,
    ) -> ServiceResult<Schedule> {
        let slot_id = slot_id.into();
        let policy = self.policy;
        self.mutate(schedule_id.into(), "reschedule_slot", move |schedule, clock| {
            schedule.reschedule_slot(slot_id, new_start, new_end, duration_minutes, &policy, clock)
        })
        .await
    }

    /// Store and return the schedule with its status derived from its slots.
    pub async fn recompute_status(&self, id: impl Into<ScheduleId>) -> ServiceResult<Schedule> {
        let id = id.into();
        let lease = self.lease(id);
        let _guard = lease.lock.lock().await;

        let schedule = self.load(id, "recompute_status").await?.recompute_status();
        self.repository.save(schedule.clone()).await?;
        Ok(schedule)
    }

    fn factory(&self) -> ScheduleFactory<'_, dyn Clock> {
        ScheduleFactory::new(self.policy, self.clock.as_ref())
    }

    async fn store(&self, schedule: Schedule) -> ServiceResult<Schedule> {
        let lease = self.lease(schedule.id());
        let _guard = lease.lock.lock().await;
        self.repository.save(schedule.clone()).await?;
        info!(
            "schedule {} stored as {} for {}",
            schedule.id(),
            schedule.status(),
            schedule.date()
        );
        Ok(schedule)
    }

    async fn load(&self, id: ScheduleId, operation: &str) -> ServiceResult<Schedule> {
        self.repository.find_by_id(id).await?.ok_or_else(|| {
            ServiceError::from(RepositoryError::not_found_with_context(
                format!("schedule {} does not exist", id),
                ErrorContext::new(operation)
                    .with_entity("schedule")
                    .with_entity_id(id),
            ))
        })
    }

    async fn mutate<F>(
        &self,
        id: ScheduleId,
        operation: &'static str,
        apply: F,
    ) -> ServiceResult<Schedule>
    where
        F: FnOnce(&mut Schedule, &dyn Clock) -> DomainResult<()> + Send,
    {
        let lease = self.lease(id);
        let _guard = lease.lock.lock().await;

        let mut schedule = self.load(id, operation).await?;
        if let Err(err) = apply(&mut schedule, self.clock.as_ref()) {
            warn!("{} on schedule {} refused: {}", operation, id, err);
            return Err(err.into());
        }
        self.repository.save(schedule.clone()).await?;
        debug!("{} on schedule {} applied", operation, id);
        Ok(schedule)
    }

    /// Share of the schedule's writer lock. Declare the guard after the
    /// lease so it is released first.
    fn lease(&self, id: ScheduleId) -> LockLease<'_> {
        let lock = Arc::clone(self.locks.lock().entry(id).or_default());
        LockLease {
            locks: &self.locks,
            id,
            lock,
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Keeps a per-schedule lock alive in the map while a call uses it.
///
/// The last lease to go drops the map entry, so the map only holds ids with
/// calls in flight.
struct LockLease<'a> {
    locks: &'a Mutex<HashMap<ScheduleId, Arc<AsyncMutex<()>>>>,
    id: ScheduleId,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        // map entry + this lease
        let idle = locks.get(&self.id).is_some_and(|entry| {
            Arc::ptr_eq(entry, &self.lock) && Arc::strong_count(entry) == 2
        });
        if idle {
            locks.remove(&self.id);
        }
    }
}

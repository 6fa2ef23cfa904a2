//! # Slot Scheduler
//!
//! Appointment slots and the daily schedules that group them.
//!
//! A [`Slot`](models::Slot) is a bounded time interval with a five-state
//! lifecycle (`AVAILABLE`, `BLOCKED`, `RESERVED`, `CANCELLED`,
//! `RESCHEDULED`). Every transition goes through one table and is refused
//! once the slot's end time has passed. A [`Schedule`](models::Schedule) is
//! the aggregate of slots for one calendar date, with a status seeded from
//! how it was created.
//!
//! ## Architecture
//!
//! - [`models`]: slots, schedules, the transition table, clocks and domain errors
//! - [`messages`]: user-facing texts for each error kind
//! - [`config`]: scheduling policy from TOML and environment
//! - [`db`]: repository trait and the in-memory backend
//! - [`services`]: schedule service with per-schedule serialization
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use slot_scheduler::models::{FixedClock, Schedule, Slot, SlotStatus};
//!
//! let clock = FixedClock::at_system_now();
//! let start = Utc::now() + Duration::hours(1);
//! let slot = Slot::new(1, start, start + Duration::minutes(30), SlotStatus::Available)?;
//! let mut schedule = Schedule::create_schedule(1, start.date_naive(), vec![slot])?;
//!
//! schedule.reserve_slot(1, &clock)?;
//! assert_eq!(schedule.slots()[0].status(), SlotStatus::Reserved);
//! # Ok::<(), slot_scheduler::models::DomainError>(())
//! ```

#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod messages;
pub mod models;
pub mod services;

pub use config::SchedulingConfig;
pub use models::{DomainError, DomainResult, ErrorKind, Schedule, Slot, SlotStatus};
pub use services::{ScheduleService, ServiceError, ServiceResult};

//! Persistence for schedules.
//!
//! The domain never talks to storage directly. The service layer depends on
//! the [`Repository`] trait, and backends implement it:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Service Layer (services) - per-schedule    │
//! │  locking, load → transition → save          │
//! └───────────────────┬─────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────┐
//! │  Repository Trait (repository)              │
//! └───────────────────┬─────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────┐
//!     │  LocalRepository (in-memory)     │
//!     └──────────────────────────────────┘
//! ```

pub mod repositories;
pub mod repository;

pub use repositories::LocalRepository;
pub use repository::{Entity, ErrorContext, Repository, RepositoryError, RepositoryResult};

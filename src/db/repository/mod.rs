//! Persistence contract consumed by the service layer.
//!
//! Entities are stored and returned whole; there are no query semantics
//! beyond lookup by identifier and enumeration.

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::models::{Schedule, ScheduleId};

/// Something a [`Repository`] can store.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Ord + Hash + Debug + Display + Send + Sync + 'static;

    /// Name used in logs and error context.
    const ENTITY_NAME: &'static str;

    fn entity_id(&self) -> Self::Id;
}

impl Entity for Schedule {
    type Id = ScheduleId;

    const ENTITY_NAME: &'static str = "schedule";

    fn entity_id(&self) -> ScheduleId {
        self.id()
    }
}

/// Generic save / find / delete store.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert `entity`, replacing any stored entity with the same id.
    async fn save(&self, entity: T) -> RepositoryResult<()>;

    /// Look up an entity; `Ok(None)` on a miss.
    async fn find_by_id(&self, id: T::Id) -> RepositoryResult<Option<T>>;

    /// Every stored entity, ordered by id.
    async fn find_all(&self) -> RepositoryResult<Vec<T>>;

    /// Remove an entity. Deleting a missing id is not an error.
    async fn delete_by_id(&self, id: T::Id) -> RepositoryResult<()>;

    /// Check that the backend is usable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

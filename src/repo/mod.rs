use crate::domain::entity::Entity;
use crate::domain::page::PageRequest;
use crate::domain::record::{NewRecord, Record};
use crate::domain::status::RecordStatus;
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod records_repo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed stored record: {0}")]
    Corrupt(String),
}

/// Durable storage for one entity's records.
#[async_trait]
pub trait RecordStore: Clone + Send + Sync + 'static {
    type Entity: Entity;
    type UnitOfWork: UnitOfWork;

    async fn begin(&self) -> Result<Self::UnitOfWork, StoreError>;

    async fn get_status(&self, id: i64) -> Result<Option<RecordStatus>, StoreError>;

    async fn list_by_owner_id(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Record>, StoreError>;

    async fn list_by_owner_email(
        &self,
        email: &str,
        page: PageRequest,
    ) -> Result<Vec<Record>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Atomic scope over the store. Dropping it without `commit` rolls back.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn insert(&mut self, record: NewRecord) -> Result<Record, StoreError>;

    async fn get_status(&mut self, id: i64) -> Result<Option<RecordStatus>, StoreError>;

    /// Sets `requested` only where the stored status still equals `expected`
    /// and the guard admits `expected -> requested`. Returns rows affected.
    async fn conditional_update_status(
        &mut self,
        id: i64,
        expected: RecordStatus,
        requested: RecordStatus,
    ) -> Result<u64, StoreError>;

    /// Moves a non-terminal record to `canceled`. Returns rows affected.
    async fn conditional_discard(&mut self, id: i64) -> Result<u64, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

use crate::domain::entity::Entity;
use crate::domain::page::PageRequest;
use crate::domain::record::{NewRecord, Record};
use crate::domain::status::RecordStatus;
use crate::repo::{RecordStore, StoreError, UnitOfWork};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedMutexGuard, RwLock};

/// In-process store with row-lock semantics. A unit of work that performs a
/// conditional write keeps the row locked until it commits or is dropped, so
/// a racing writer waits and then evaluates its predicate against the
/// committed state.
pub struct MemoryRecordStore<E: Entity> {
    shared: Arc<Shared>,
    _entity: PhantomData<E>,
}

#[derive(Default)]
struct Shared {
    rows: RwLock<BTreeMap<i64, Record>>,
    row_locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
    last_id: AtomicI64,
    unavailable: AtomicBool,
    fail_commit: AtomicBool,
}

impl Shared {
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }

    fn row_lock(&self, id: i64) -> Result<Arc<tokio::sync::Mutex<()>>, StoreError> {
        let mut locks = self
            .row_locks
            .lock()
            .map_err(|_| StoreError::Unavailable("row lock table poisoned".to_string()))?;
        Ok(locks.entry(id).or_default().clone())
    }
}

impl<E: Entity> MemoryRecordStore<E> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            _entity: PhantomData,
        }
    }

    /// Makes every subsequent operation fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.shared.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes commits fail; staged writes are discarded.
    pub fn set_commit_failure(&self, fail: bool) {
        self.shared.fail_commit.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.shared.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn list_where<F>(&self, page: PageRequest, predicate: F) -> Result<Vec<Record>, StoreError>
    where
        F: Fn(&Record) -> bool + Send,
    {
        self.shared.check_available()?;
        let limit = usize::try_from(page.limit.max(0)).unwrap_or(usize::MAX);
        let rows = self.shared.rows.read().await;
        Ok(rows
            .values()
            .filter(|r| r.id > page.cursor && predicate(r))
            .take(limit)
            .cloned()
            .collect())
    }
}

impl<E: Entity> Default for MemoryRecordStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for MemoryRecordStore<E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            _entity: PhantomData,
        }
    }
}

pub struct MemoryUnitOfWork {
    shared: Arc<Shared>,
    held: HashMap<i64, OwnedMutexGuard<()>>,
    inserts: Vec<Record>,
    updates: Vec<(i64, RecordStatus, DateTime<Utc>)>,
}

impl MemoryUnitOfWork {
    async fn lock_row(&mut self, id: i64) -> Result<(), StoreError> {
        if self.held.contains_key(&id) {
            return Ok(());
        }
        let lock = self.shared.row_lock(id)?;
        let guard = lock.lock_owned().await;
        self.held.insert(id, guard);
        Ok(())
    }

    async fn visible_status(&self, id: i64) -> Option<RecordStatus> {
        if let Some((_, status, _)) = self.updates.iter().rev().find(|(uid, _, _)| *uid == id) {
            return Some(*status);
        }
        if let Some(record) = self.inserts.iter().find(|r| r.id == id) {
            return Some(record.status);
        }
        self.shared.rows.read().await.get(&id).map(|r| r.status)
    }

    async fn guarded_write(
        &mut self,
        id: i64,
        expected: Option<RecordStatus>,
        requested: RecordStatus,
    ) -> Result<u64, StoreError> {
        self.shared.check_available()?;
        self.lock_row(id).await?;

        let Some(current) = self.visible_status(id).await else {
            return Ok(0);
        };
        if expected.is_some_and(|e| e != current) {
            return Ok(0);
        }
        if !RecordStatus::sources_for(requested).contains(&current) {
            return Ok(0);
        }

        self.updates.push((id, requested, Utc::now()));
        Ok(1)
    }
}

#[async_trait]
impl<E: Entity> RecordStore for MemoryRecordStore<E> {
    type Entity = E;
    type UnitOfWork = MemoryUnitOfWork;

    async fn begin(&self) -> Result<Self::UnitOfWork, StoreError> {
        self.shared.check_available()?;
        Ok(MemoryUnitOfWork {
            shared: self.shared.clone(),
            held: HashMap::new(),
            inserts: Vec::new(),
            updates: Vec::new(),
        })
    }

    async fn get_status(&self, id: i64) -> Result<Option<RecordStatus>, StoreError> {
        self.shared.check_available()?;
        Ok(self.shared.rows.read().await.get(&id).map(|r| r.status))
    }

    async fn list_by_owner_id(
        &self,
        owner_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Record>, StoreError> {
        self.list_where(page, |r| r.owner_id == owner_id).await
    }

    async fn list_by_owner_email(
        &self,
        email: &str,
        page: PageRequest,
    ) -> Result<Vec<Record>, StoreError> {
        let email = email.to_string();
        self.list_where(page, move |r| r.owner_email == email).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.shared.check_available()
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn insert(&mut self, record: NewRecord) -> Result<Record, StoreError> {
        self.shared.check_available()?;
        let id = self.shared.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let stored = Record {
            id,
            owner_id: record.owner_id,
            owner_email: record.owner_email,
            amount: record.amount,
            currency: record.currency,
            status: record.status,
            created_at: now,
            updated_at: now,
        };
        self.inserts.push(stored.clone());
        Ok(stored)
    }

    async fn get_status(&mut self, id: i64) -> Result<Option<RecordStatus>, StoreError> {
        self.shared.check_available()?;
        Ok(self.visible_status(id).await)
    }

    async fn conditional_update_status(
        &mut self,
        id: i64,
        expected: RecordStatus,
        requested: RecordStatus,
    ) -> Result<u64, StoreError> {
        self.guarded_write(id, Some(expected), requested).await
    }

    async fn conditional_discard(&mut self, id: i64) -> Result<u64, StoreError> {
        self.guarded_write(id, None, RecordStatus::Canceled).await
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        self.shared.check_available()?;
        if self.shared.fail_commit.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit rejected".to_string()));
        }

        let mut rows = self.shared.rows.write().await;
        for record in self.inserts.drain(..) {
            rows.insert(record.id, record);
        }
        for (id, status, at) in self.updates.drain(..) {
            if let Some(row) = rows.get_mut(&id) {
                row.status = status;
                row.updated_at = at;
            }
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

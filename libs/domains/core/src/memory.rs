//! In-memory repository and unit of work.
//!
//! Rows live in a shared [`InMemoryTable`] in insertion order. A transaction
//! snapshots the table on begin and restores the snapshot on rollback. Units of
//! work sharing a table are not isolated from each other.

use async_trait::async_trait;
use database::{DatabaseError, DatabaseResult, UnitOfWork, UnitOfWorkFactory};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::entity::DomainEntity;
use crate::repository::{Repository, RepositoryProvider};

#[derive(Debug, Clone)]
pub struct InMemoryTable<T> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T> Default for InMemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: DomainEntity> InMemoryTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    async fn snapshot(&self) -> Vec<T> {
        self.rows.read().await.clone()
    }

    async fn restore(&self, rows: Vec<T>) {
        *self.rows.write().await = rows;
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryRepository<T> {
    table: InMemoryTable<T>,
}

impl<T: DomainEntity> InMemoryRepository<T> {
    pub fn new(table: InMemoryTable<T>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl<T: DomainEntity> Repository<T> for InMemoryRepository<T> {
    async fn add(&self, entity: T) -> DatabaseResult<T> {
        let mut rows = self.table.rows.write().await;
        if rows.iter().any(|row| row.id() == entity.id()) {
            return Err(DatabaseError::Generic(format!(
                "duplicate key: {} {}",
                T::TYPE_NAME,
                entity.id()
            )));
        }
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> DatabaseResult<T> {
        let mut rows = self.table.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or_else(|| {
                DatabaseError::Generic(format!("no row to update: {} {}", T::TYPE_NAME, entity.id()))
            })?;
        *row = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, entity: &T) -> DatabaseResult<bool> {
        let mut rows = self.table.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != entity.id());
        Ok(rows.len() < before)
    }

    async fn find_by_id(&self, id: T::Id) -> DatabaseResult<Option<T>> {
        let rows = self.table.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn list(&self) -> DatabaseResult<Vec<T>> {
        Ok(self.table.snapshot().await)
    }

    async fn exists(&self, id: T::Id) -> DatabaseResult<bool> {
        let rows = self.table.rows.read().await;
        Ok(rows.iter().any(|row| row.id() == id))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionCounts {
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

#[derive(Debug, Default)]
struct Counters {
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    fail_next_commit: AtomicBool,
}

impl Counters {
    fn counts(&self) -> TransactionCounts {
        TransactionCounts {
            begins: self.begins.load(Ordering::SeqCst),
            commits: self.commits.load(Ordering::SeqCst),
            rollbacks: self.rollbacks.load(Ordering::SeqCst),
        }
    }
}

/// Unit of work over an [`InMemoryTable`].
///
/// Clones share the table, the counters and the open transaction.
#[derive(Debug, Clone)]
pub struct InMemoryUnitOfWork<T> {
    table: InMemoryTable<T>,
    snapshot: Arc<Mutex<Option<Vec<T>>>>,
    counters: Arc<Counters>,
}

impl<T: DomainEntity> Default for InMemoryUnitOfWork<T> {
    fn default() -> Self {
        Self::with_table(InMemoryTable::new())
    }
}

impl<T: DomainEntity> InMemoryUnitOfWork<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: InMemoryTable<T>) -> Self {
        Self::sharing(table, Arc::default())
    }

    fn sharing(table: InMemoryTable<T>, counters: Arc<Counters>) -> Self {
        Self {
            table,
            snapshot: Arc::new(Mutex::new(None)),
            counters,
        }
    }

    pub fn table(&self) -> &InMemoryTable<T> {
        &self.table
    }

    pub fn counts(&self) -> TransactionCounts {
        self.counters.counts()
    }

    /// Makes the next commit fail; the transaction is rolled back instead.
    pub fn fail_next_commit(&self) {
        self.counters.fail_next_commit.store(true, Ordering::SeqCst);
    }

    pub async fn in_transaction(&self) -> bool {
        self.snapshot.lock().await.is_some()
    }
}

#[async_trait]
impl<T: DomainEntity> UnitOfWork for InMemoryUnitOfWork<T> {
    async fn begin_transaction(&self) -> DatabaseResult<()> {
        let mut slot = self.snapshot.lock().await;
        if slot.is_some() {
            return Err(DatabaseError::Transaction(
                "a transaction is already open on this unit of work".to_string(),
            ));
        }

        *slot = Some(self.table.snapshot().await);
        self.counters.begins.fetch_add(1, Ordering::SeqCst);
        debug!(entity = T::TYPE_NAME, "In-memory transaction started");
        Ok(())
    }

    async fn commit_transaction(&self) -> DatabaseResult<()> {
        let snapshot = self
            .snapshot
            .lock()
            .await
            .take()
            .ok_or_else(|| DatabaseError::Transaction("no open transaction to commit".to_string()))?;

        if self.counters.fail_next_commit.swap(false, Ordering::SeqCst) {
            self.table.restore(snapshot).await;
            self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
            return Err(DatabaseError::Transaction("commit rejected by store".to_string()));
        }

        self.counters.commits.fetch_add(1, Ordering::SeqCst);
        debug!(entity = T::TYPE_NAME, "In-memory transaction committed");
        Ok(())
    }

    async fn rollback_transaction(&self) -> DatabaseResult<()> {
        let Some(snapshot) = self.snapshot.lock().await.take() else {
            return Ok(());
        };

        self.table.restore(snapshot).await;
        self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        debug!(entity = T::TYPE_NAME, "In-memory transaction rolled back");
        Ok(())
    }
}

impl<T: DomainEntity> RepositoryProvider<T> for InMemoryUnitOfWork<T> {
    type Repository = InMemoryRepository<T>;

    fn repository(&self) -> InMemoryRepository<T> {
        InMemoryRepository::new(self.table.clone())
    }
}

/// Creates units of work over one shared table. Their counters are aggregated.
#[derive(Debug, Clone)]
pub struct InMemoryUnitOfWorkFactory<T> {
    table: InMemoryTable<T>,
    counters: Arc<Counters>,
}

impl<T: DomainEntity> Default for InMemoryUnitOfWorkFactory<T> {
    fn default() -> Self {
        Self {
            table: InMemoryTable::new(),
            counters: Arc::default(),
        }
    }
}

impl<T: DomainEntity> InMemoryUnitOfWorkFactory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &InMemoryTable<T> {
        &self.table
    }

    pub fn counts(&self) -> TransactionCounts {
        self.counters.counts()
    }

    pub fn fail_next_commit(&self) {
        self.counters.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

impl<T: DomainEntity> UnitOfWorkFactory for InMemoryUnitOfWorkFactory<T> {
    type UnitOfWork = InMemoryUnitOfWork<T>;

    fn create(&self) -> InMemoryUnitOfWork<T> {
        InMemoryUnitOfWork::sharing(self.table.clone(), self.counters.clone())
    }
}

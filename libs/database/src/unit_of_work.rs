//! Transaction bracketing for a single persistence context.
//!
//! A [`UnitOfWork`] owns one connection scope and at most one open transaction.
//! Repositories bound to the same unit of work run their statements inside that
//! transaction while it is open, and directly on the connection otherwise.
//! One unit of work is created per request through a [`UnitOfWorkFactory`]
//! and is never shared between requests.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::common::{DatabaseError, DatabaseResult};

/// Transaction lifecycle of a persistence context.
///
/// - `begin_transaction` fails if a transaction is already open.
/// - `commit_transaction` fails if none is open. A commit rejected by the
///   store leaves nothing half-applied: the transaction is rolled back and the
///   store's error is returned.
/// - `rollback_transaction` discards the open transaction, and is a no-op when
///   none is open so it can be called on every failure path.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin_transaction(&self) -> DatabaseResult<()>;

    async fn commit_transaction(&self) -> DatabaseResult<()>;

    async fn rollback_transaction(&self) -> DatabaseResult<()>;
}

/// Creates a fresh [`UnitOfWork`] per logical operation.
pub trait UnitOfWorkFactory: Clone + Send + Sync + 'static {
    type UnitOfWork: UnitOfWork + 'static;

    fn create(&self) -> Self::UnitOfWork;
}

/// The executor a statement should run on.
pub enum Executor<'a> {
    Connection(&'a DatabaseConnection),
    Transaction(&'a DatabaseTransaction),
}

/// Holds the unit of work's lock for the duration of one repository call.
pub struct ExecutorGuard<'a> {
    connection: &'a DatabaseConnection,
    transaction: MutexGuard<'a, Option<DatabaseTransaction>>,
}

impl ExecutorGuard<'_> {
    pub fn executor(&self) -> Executor<'_> {
        match self.transaction.as_ref() {
            Some(transaction) => Executor::Transaction(transaction),
            None => Executor::Connection(self.connection),
        }
    }
}

/// Runs `$body` with `$db` bound to whichever executor the guard selects.
///
/// ```ignore
/// let guard = uow.executor().await;
/// let model = database::with_executor!(guard, |db| Entity::find_by_id(id).one(db).await)?;
/// ```
#[macro_export]
macro_rules! with_executor {
    ($guard:expr, |$db:ident| $body:expr) => {
        match $guard.executor() {
            $crate::unit_of_work::Executor::Connection($db) => $body,
            $crate::unit_of_work::Executor::Transaction($db) => $body,
        }
    };
}

struct Context {
    connection: DatabaseConnection,
    transaction: Mutex<Option<DatabaseTransaction>>,
}

impl Drop for Context {
    fn drop(&mut self) {
        // Dropping a SeaORM transaction rolls it back.
        if self.transaction.get_mut().take().is_some() {
            warn!("Unit of work released with an open transaction, rolling back");
        }
    }
}

/// SeaORM-backed unit of work. Clones share the same context, so repositories
/// holding a clone see the transaction opened through any other clone.
#[derive(Clone)]
pub struct SeaOrmUnitOfWork {
    context: Arc<Context>,
}

impl SeaOrmUnitOfWork {
    pub fn new(connection: DatabaseConnection) -> Self {
        Self {
            context: Arc::new(Context {
                connection,
                transaction: Mutex::new(None),
            }),
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.context.connection
    }

    /// Locks the context and returns a guard exposing the current executor.
    pub async fn executor(&self) -> ExecutorGuard<'_> {
        ExecutorGuard {
            connection: &self.context.connection,
            transaction: self.context.transaction.lock().await,
        }
    }

    pub async fn in_transaction(&self) -> bool {
        self.context.transaction.lock().await.is_some()
    }
}

#[async_trait]
impl UnitOfWork for SeaOrmUnitOfWork {
    async fn begin_transaction(&self) -> DatabaseResult<()> {
        let mut slot = self.context.transaction.lock().await;
        if slot.is_some() {
            return Err(DatabaseError::Transaction(
                "a transaction is already open on this unit of work".to_string(),
            ));
        }

        *slot = Some(self.context.connection.begin().await?);
        debug!("Transaction started");
        Ok(())
    }

    async fn commit_transaction(&self) -> DatabaseResult<()> {
        let transaction = self
            .context
            .transaction
            .lock()
            .await
            .take()
            .ok_or_else(|| DatabaseError::Transaction("no open transaction to commit".to_string()))?;

        // A failed commit drops the transaction still open, which rolls it back.
        match transaction.commit().await {
            Ok(()) => {
                debug!("Transaction committed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Commit failed, transaction rolled back");
                Err(e.into())
            }
        }
    }

    async fn rollback_transaction(&self) -> DatabaseResult<()> {
        let Some(transaction) = self.context.transaction.lock().await.take() else {
            debug!("Rollback requested with no open transaction");
            return Ok(());
        };

        transaction.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }
}

/// Hands out one [`SeaOrmUnitOfWork`] per request over a shared pool.
#[derive(Clone)]
pub struct SeaOrmUnitOfWorkFactory {
    connection: DatabaseConnection,
}

impl SeaOrmUnitOfWorkFactory {
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

impl UnitOfWorkFactory for SeaOrmUnitOfWorkFactory {
    type UnitOfWork = SeaOrmUnitOfWork;

    fn create(&self) -> SeaOrmUnitOfWork {
        SeaOrmUnitOfWork::new(self.connection.clone())
    }
}

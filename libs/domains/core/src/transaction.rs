use database::UnitOfWork;
use observability::{TransactionMetrics, TransactionOutcome};
use std::future::Future;
use tracing::warn;

use crate::error::{ServiceError, ServiceResult};

/// Runs `body` inside a transaction on `uow`.
///
/// The transaction commits when `body` succeeds and rolls back when it fails,
/// in which case `body`'s error is returned unchanged. A failed commit is
/// rolled back and reported as [`ServiceError::Store`].
pub async fn in_transaction<U, F, Fut, R>(uow: &U, entity: &'static str, body: F) -> ServiceResult<R>
where
    U: UnitOfWork + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ServiceResult<R>>,
{
    uow.begin_transaction().await?;

    let value = match body().await {
        Ok(value) => value,
        Err(err) => {
            if let Err(rollback_err) = uow.rollback_transaction().await {
                warn!(entity, error = %rollback_err, "Rollback failed");
            }
            TransactionMetrics::record(entity, TransactionOutcome::RolledBack);
            return Err(err);
        }
    };

    if let Err(commit_err) = uow.commit_transaction().await {
        if let Err(rollback_err) = uow.rollback_transaction().await {
            warn!(entity, error = %rollback_err, "Rollback after failed commit failed");
        }
        TransactionMetrics::record(entity, TransactionOutcome::CommitFailed);
        return Err(ServiceError::Store(commit_err));
    }

    TransactionMetrics::record(entity, TransactionOutcome::Committed);
    Ok(value)
}

use metrics::counter;
use strum::{AsRefStr, Display};

/// How a unit-of-work transaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TransactionOutcome {
    Committed,
    RolledBack,
    CommitFailed,
}

pub struct TransactionMetrics;

impl TransactionMetrics {
    /// Increments `uow_transactions_total{entity, outcome}`.
    pub fn record(entity: &'static str, outcome: TransactionOutcome) {
        counter!(
            "uow_transactions_total",
            "entity" => entity,
            "outcome" => outcome.as_ref().to_string()
        )
        .increment(1);
    }
}

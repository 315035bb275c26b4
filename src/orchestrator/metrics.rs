use metrics::Counter;
use metrics_derive::Metrics;

/// Metrics of a [`TransactionOrchestrator`](crate::orchestrator::TransactionOrchestrator).
#[derive(Metrics)]
#[metrics(scope = "pipeline")]
pub struct PipelineMetrics {
    /// Number of started attempts.
    pub attempts: Counter,
    /// Number of attempts that returned a transaction hash.
    pub confirmed: Counter,
    /// Number of failed attempts.
    pub failed: Counter,
    /// Number of approval transactions submitted.
    pub approvals: Counter,
    /// Number of balance or allowance reads that failed and were skipped.
    pub soft_failures: Counter,
}

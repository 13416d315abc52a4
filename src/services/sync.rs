use chrono::{Duration, NaiveDate, Utc};
use futures::{stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::submission::{SubmissionOrchestrator, SubmissionOutcome, SyncTrigger};
use crate::clients::OrderSource;
use crate::errors::ServiceError;

/// Caller-visible result of a batch run. Batch operations never raise on
/// the first failing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Caller-visible result of a single-order retrigger.
#[derive(Debug, Clone, Serialize)]
pub struct RetriggerResponse {
    pub success: bool,
    pub message: String,
    pub result: Option<SubmissionOutcome>,
}

/// Batch driver: fetches orders for a date window and runs the orchestrator
/// per order under a bounded worker pool. The bound protects the accounting
/// system, not the engine.
pub struct SyncService {
    orders: Arc<dyn OrderSource>,
    orchestrator: Arc<SubmissionOrchestrator>,
    concurrency: usize,
    window_days: i64,
}

impl SyncService {
    pub fn new(
        orders: Arc<dyn OrderSource>,
        orchestrator: Arc<SubmissionOrchestrator>,
        concurrency: usize,
        window_days: i64,
    ) -> Self {
        Self {
            orders,
            orchestrator,
            concurrency: concurrency.max(1),
            window_days,
        }
    }

    /// Runs the configured trailing window ending today.
    pub async fn run_default_window(&self) -> Result<BatchSummary, ServiceError> {
        let to = Utc::now().date_naive();
        let from = to - Duration::days(self.window_days);
        self.run_window(from, to).await
    }

    #[instrument(skip(self))]
    pub async fn run_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BatchSummary, ServiceError> {
        let orders = self.orders.orders_in_window(from, to).await?;
        let total = orders.len();
        info!(total, "starting batch sync");

        let results: Vec<(String, Result<SubmissionOutcome, ServiceError>)> =
            stream::iter(orders)
                .map(|order| {
                    let orchestrator = self.orchestrator.clone();
                    async move {
                        let order_id = order.order_id.clone();
                        let result = orchestrator
                            .process_order(&order, SyncTrigger::Scheduled, false)
                            .await;
                        (order_id, result)
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        for (order_id, result) in results {
            match result {
                Ok(outcome) if outcome.success => summary.succeeded += 1,
                Ok(outcome) => {
                    summary.failed += 1;
                    summary.errors.push(format!("{order_id}: {}", outcome.message));
                }
                Err(err) => {
                    summary.failed += 1;
                    summary.errors.push(format!("{order_id}: {err}"));
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch sync finished"
        );
        Ok(summary)
    }

    /// Re-runs a single order. `force` bypasses the already-synced
    /// short-circuit.
    pub async fn retrigger(
        &self,
        order_id: &str,
        force: bool,
    ) -> Result<RetriggerResponse, ServiceError> {
        let order = self
            .orders
            .order_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;
        let outcome = self
            .orchestrator
            .process_order(&order, SyncTrigger::Manual, force)
            .await?;
        Ok(RetriggerResponse {
            success: outcome.success,
            message: outcome.message.clone(),
            result: Some(outcome),
        })
    }
}

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use strum::Display;
use tracing::{info, instrument, warn};

use super::audit_store::AuditStore;
use crate::clients::{
    AccountingGateway, CatalogLookup, DepartmentLookup, PaymentRecordSource, ReferenceCache,
    VoucherCodeCalculator,
};
use crate::engine::{self, classify, payload::InvoicePayloadBuilder, Classification, OrderCategory};
use crate::errors::ServiceError;
use crate::models::{DocumentType, ResolvedLine, SaleOrder, SyncAudit, SyncStatus};

/// States of the per-order submission machine, in the order they are
/// entered. `Failed` is reachable from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SubmissionStep {
    Validating,
    CreatingCustomer,
    CreatingSalesOrder,
    CreatingSalesInvoice,
    CreatingSalesReturn,
    CreatingGxtTransfer,
    ProcessingPayment,
    RecordingAudit,
}

/// What kicked off this submission. Scheduled runs supersede the audit
/// record; manual retriggers append a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Scheduled,
    Manual,
}

/// Terminal result of one order's submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub order_id: String,
    pub success: bool,
    /// Short-circuited on an order already marked successful
    pub skipped: bool,
    /// At least one step was settled by a duplicate-constraint response
    pub duplicate: bool,
    pub message: String,
    pub correlation_id: Option<String>,
}

/// Accumulated step results across one order's state machine.
#[derive(Default)]
struct StepLog {
    errors: Vec<String>,
    duplicate: bool,
    correlation_id: Option<String>,
    last_raw: Option<String>,
}

pub struct OrchestratorConfig {
    pub company_code: String,
    pub gift_promotion_brands: Vec<String>,
}

/// Drives the per-order submission state machine against the accounting
/// system. One order is strictly sequential; concurrency exists only
/// across orders, bounded by the batch driver.
pub struct SubmissionOrchestrator {
    gateway: Arc<dyn AccountingGateway>,
    catalog: Arc<dyn CatalogLookup>,
    departments: Arc<dyn DepartmentLookup>,
    payments: Arc<dyn PaymentRecordSource>,
    audit: Arc<dyn AuditStore>,
    vouchers: Arc<dyn VoucherCodeCalculator>,
    builder: InvoicePayloadBuilder,
    gift_promotion_brands: HashSet<String>,
}

impl SubmissionOrchestrator {
    pub fn new(
        gateway: Arc<dyn AccountingGateway>,
        catalog: Arc<dyn CatalogLookup>,
        departments: Arc<dyn DepartmentLookup>,
        payments: Arc<dyn PaymentRecordSource>,
        audit: Arc<dyn AuditStore>,
        vouchers: Arc<dyn VoucherCodeCalculator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            catalog,
            departments,
            payments,
            audit,
            vouchers,
            builder: InvoicePayloadBuilder::new(config.company_code),
            gift_promotion_brands: config.gift_promotion_brands.into_iter().collect(),
        }
    }

    /// Runs the full state machine for one order. Business failures become
    /// a `Failed` audit record and outcome, never an `Err`; only audit
    /// persistence failures propagate.
    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    pub async fn process_order(
        &self,
        order: &SaleOrder,
        trigger: SyncTrigger,
        force_retry: bool,
    ) -> Result<SubmissionOutcome, ServiceError> {
        let previous = self.audit.find_latest(&order.order_id).await?;

        if !force_retry {
            if let Some(prev) = previous.as_ref().filter(|p| p.is_success()) {
                info!("order already synced, skipping");
                return Ok(SubmissionOutcome {
                    order_id: order.order_id.clone(),
                    success: true,
                    skipped: true,
                    duplicate: false,
                    message: "already synced".to_string(),
                    correlation_id: prev.correlation_id.clone(),
                });
            }
        }
        let retry_count = previous.map(|p| p.retry_count + 1).unwrap_or(0);

        let classification = classify(&order.order_type_label);
        info!(
            category = %classification.category,
            is_service = classification.is_service,
            "classified order"
        );

        let mut log = StepLog::default();

        // Validation: header fields and line resolution, before any
        // accounting-system call.
        if order.customer.code.trim().is_empty() {
            log.errors
                .push(format!("{}: customer code missing", SubmissionStep::Validating));
            return self.finish(order, trigger, retry_count, false, log).await;
        }
        if order.lines.is_empty() {
            log.errors
                .push(format!("{}: order has no lines", SubmissionStep::Validating));
            return self.finish(order, trigger, retry_count, false, log).await;
        }

        let resolved = match self.resolve_lines(order, classification).await {
            Ok(lines) => lines,
            Err(err) => {
                log.errors
                    .push(format!("{}: {err}", SubmissionStep::Validating));
                return self.finish(order, trigger, retry_count, false, log).await;
            }
        };
        if resolved.iter().all(|line| line.unit.trim().is_empty()) {
            log.errors.push(format!(
                "{}: no fulfillable lines (unit of measure missing everywhere)",
                SubmissionStep::Validating
            ));
            return self.finish(order, trigger, retry_count, false, log).await;
        }

        // Sale returns bypass customer, invoices and payments entirely.
        if classification.category == OrderCategory::SaleReturn {
            let ok = match self.builder.build_sales_return(order, &resolved) {
                Ok(document) => {
                    self.submit(
                        DocumentType::SalesReturn,
                        &document,
                        SubmissionStep::CreatingSalesReturn,
                        &mut log,
                    )
                    .await
                }
                Err(err) => {
                    log.errors
                        .push(format!("{}: {err}", SubmissionStep::CreatingSalesReturn));
                    false
                }
            };
            return self.finish(order, trigger, retry_count, ok, log).await;
        }

        // Customer upsert is attempted regardless of what comes later;
        // its failure is recorded but does not gate the sales order.
        match self.builder.build_customer(order) {
            Ok(document) => {
                let _ = self
                    .submit(
                        DocumentType::Customer,
                        &document,
                        SubmissionStep::CreatingCustomer,
                        &mut log,
                    )
                    .await;
            }
            Err(err) => {
                log.errors
                    .push(format!("{}: {err}", SubmissionStep::CreatingCustomer));
            }
        }

        let sales_order_ok = match self.builder.build_sales_order(order, &resolved) {
            Ok(document) => {
                self.submit(
                    DocumentType::SalesOrder,
                    &document,
                    SubmissionStep::CreatingSalesOrder,
                    &mut log,
                )
                .await
            }
            Err(err) => {
                log.errors
                    .push(format!("{}: {err}", SubmissionStep::CreatingSalesOrder));
                false
            }
        };

        // One invoice per distinct fulfillment date. Splits are
        // independent: a failing split never aborts its siblings.
        let today = Utc::now().date_naive();
        let mut all_splits_ok = true;
        let mut any_split_ok = false;
        for (date, lines) in split_by_fulfillment_date(&resolved, today) {
            match self.builder.build_invoice(order, &lines, date) {
                Ok(document) => {
                    let ok = self
                        .submit(
                            DocumentType::SalesInvoice,
                            &document,
                            SubmissionStep::CreatingSalesInvoice,
                            &mut log,
                        )
                        .await;
                    all_splits_ok &= ok;
                    any_split_ok |= ok;
                }
                Err(err) => {
                    log.errors.push(format!(
                        "{} [{date}]: {err}",
                        SubmissionStep::CreatingSalesInvoice
                    ));
                    all_splits_ok = false;
                }
            }
        }

        // Service orders move the goods to the service warehouse after
        // invoicing.
        if classification.category == OrderCategory::Service && any_split_ok {
            self.create_gxt_transfer(order, &resolved, &mut log).await;
        }

        // Payment postings only once an invoice exists upstream.
        if any_split_ok {
            self.process_payments(order, today, &mut log).await;
        }

        let success = sales_order_ok && all_splits_ok;
        self.finish(order, trigger, retry_count, success, log).await
    }

    /// Resolves every line against per-order reference snapshots.
    async fn resolve_lines(
        &self,
        order: &SaleOrder,
        classification: Classification,
    ) -> Result<Vec<ResolvedLine>, ServiceError> {
        let mut cache = ReferenceCache::new(self.catalog.clone(), self.departments.clone());
        let gift_promotion_active = self.gift_promotion_brands.contains(&order.brand);
        let mut resolved = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let catalog = cache.item(&line.item_code).await?.cloned();
            let department = cache.department(&line.branch_code).await?.cloned();
            let voucher_fallback = self.vouchers.code_for_amount(line.voucher_paid);
            let input = engine::LineResolutionInput {
                classification,
                line,
                catalog: catalog.as_ref(),
                department: department.as_ref(),
                gift_promotion_active,
                customer_channel: order.customer.channel.as_deref(),
                voucher_fallback: voucher_fallback.as_deref(),
            };
            resolved.push(engine::resolve_line(&input));
        }
        Ok(resolved)
    }

    async fn create_gxt_transfer(
        &self,
        order: &SaleOrder,
        resolved: &[ResolvedLine],
        log: &mut StepLog,
    ) {
        let department = match self.departments.by_branch_code(&order.branch_code).await {
            Ok(dept) => dept,
            Err(err) => {
                log.errors
                    .push(format!("{}: {err}", SubmissionStep::CreatingGxtTransfer));
                return;
            }
        };
        match self
            .builder
            .build_warehouse_transfer(order, resolved, department.as_ref())
        {
            Ok(document) => {
                let _ = self
                    .submit(
                        DocumentType::WarehouseTransfer,
                        &document,
                        SubmissionStep::CreatingGxtTransfer,
                        &mut *log,
                    )
                    .await;
            }
            Err(err) => {
                log.errors
                    .push(format!("{}: {err}", SubmissionStep::CreatingGxtTransfer));
            }
        }
    }

    /// Posts one cash-receipt or credit-advice per recorded payment.
    /// Individual posting failures accumulate but never flip the order's
    /// overall status.
    async fn process_payments(&self, order: &SaleOrder, date: NaiveDate, log: &mut StepLog) {
        let records = match self.payments.by_order_id(&order.order_id).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "payment record lookup failed");
                log.errors
                    .push(format!("{}: {err}", SubmissionStep::ProcessingPayment));
                return;
            }
        };
        for record in records {
            let document_type = if record.is_cash() {
                DocumentType::CashReceipt
            } else {
                DocumentType::CreditAdvice
            };
            let document = self.builder.build_payment(order, &record, document_type, date);
            let _ = self
                .submit(document_type, &document, SubmissionStep::ProcessingPayment, log)
                .await;
        }
    }

    /// Submits one document and folds the response into the step log.
    /// Duplicate-constraint responses count as settled.
    async fn submit<T: Serialize>(
        &self,
        document_type: DocumentType,
        document: &T,
        step: SubmissionStep,
        log: &mut StepLog,
    ) -> bool {
        let payload = match serde_json::to_value(document) {
            Ok(value) => value,
            Err(err) => {
                log.errors.push(format!("{step}: {err}"));
                return false;
            }
        };
        match self.gateway.submit(document_type, payload).await {
            Ok(response) => {
                log.last_raw = Some(response.raw.to_string());
                let settled = response.is_success() || response.is_duplicate();
                if response.is_duplicate() {
                    info!(%step, message = %response.message, "duplicate document reported, treating as settled");
                    log.duplicate = true;
                }
                if settled {
                    if document_type == DocumentType::SalesInvoice && log.correlation_id.is_none() {
                        log.correlation_id = response.correlation_id.clone();
                    }
                    true
                } else {
                    log.errors.push(format!("{step}: {}", response.message));
                    false
                }
            }
            Err(err) => {
                log.errors.push(format!("{step}: {err}"));
                false
            }
        }
    }

    /// Terminal transition: exactly one audit write, then the outcome.
    async fn finish(
        &self,
        order: &SaleOrder,
        trigger: SyncTrigger,
        retry_count: i32,
        success: bool,
        log: StepLog,
    ) -> Result<SubmissionOutcome, ServiceError> {
        let status = if success {
            SyncStatus::Success
        } else {
            SyncStatus::Failed
        };
        let message = if log.errors.is_empty() {
            "ok".to_string()
        } else {
            log.errors.join("; ")
        };

        let record = SyncAudit {
            order_id: order.order_id.clone(),
            status,
            message: message.clone(),
            correlation_id: log.correlation_id.clone(),
            raw_response: log.last_raw,
            retry_count,
        };
        match trigger {
            SyncTrigger::Scheduled => self.audit.upsert(record).await?,
            SyncTrigger::Manual => self.audit.append(record).await?,
        }

        if success {
            info!(duplicate = log.duplicate, "order submitted");
        } else {
            warn!(message = %message, "order submission failed");
        }

        Ok(SubmissionOutcome {
            order_id: order.order_id.clone(),
            success,
            skipped: false,
            duplicate: log.duplicate,
            message,
            correlation_id: log.correlation_id,
        })
    }
}

/// Groups resolved lines into one invoice per distinct fulfillment date.
/// Date-less lines join the earliest date's batch, or `fallback` when no
/// line carries a fulfillment record at all.
pub fn split_by_fulfillment_date(
    lines: &[ResolvedLine],
    fallback: NaiveDate,
) -> Vec<(NaiveDate, Vec<ResolvedLine>)> {
    let earliest = lines
        .iter()
        .filter_map(|line| line.fulfillment_date)
        .min()
        .unwrap_or(fallback);
    let mut groups: BTreeMap<NaiveDate, Vec<ResolvedLine>> = BTreeMap::new();
    for line in lines {
        groups
            .entry(line.fulfillment_date.unwrap_or(earliest))
            .or_default()
            .push(line.clone());
    }
    groups.into_iter().collect()
}

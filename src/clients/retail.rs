use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::{CatalogItem, Department, PaymentRecord, SaleOrder};

/// Upstream retail API: orders with lines, fulfillments and customer tags.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn orders_in_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SaleOrder>, ServiceError>;

    async fn order_by_id(&self, order_id: &str) -> Result<Option<SaleOrder>, ServiceError>;
}

/// Item reference data. Absence is an explicit `None`, never a silent
/// fallback.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn by_item_code(&self, code: &str) -> Result<Option<CatalogItem>, ServiceError>;
}

/// Branch/department reference data.
#[async_trait]
pub trait DepartmentLookup: Send + Sync {
    async fn by_branch_code(&self, code: &str) -> Result<Option<Department>, ServiceError>;
}

/// Cash/voucher payment rows recorded for an order.
#[async_trait]
pub trait PaymentRecordSource: Send + Sync {
    async fn by_order_id(&self, order_id: &str) -> Result<Vec<PaymentRecord>, ServiceError>;
}

/// Computes the generic voucher display code from the voucher amount when
/// the customer is not on a marketplace channel.
pub trait VoucherCodeCalculator: Send + Sync {
    fn code_for_amount(&self, amount: Decimal) -> Option<String>;
}

/// Default voucher calculation: denomination in thousand VND.
pub struct DenominationVoucherCalculator;

impl VoucherCodeCalculator for DenominationVoucherCalculator {
    fn code_for_amount(&self, amount: Decimal) -> Option<String> {
        if amount <= Decimal::ZERO {
            return None;
        }
        let thousands = (amount / Decimal::from(1000)).trunc();
        Some(format!("VC{}", thousands))
    }
}

/// HTTP client for the upstream retail API. Implements every read-side
/// collaborator against the same base URL and API key.
pub struct RetailApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RetailApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ServiceError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "retail API GET {} failed with status {}",
                path,
                response.status()
            )));
        }
        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl OrderSource for RetailApiClient {
    async fn orders_in_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SaleOrder>, ServiceError> {
        let path = format!("orders?from={from}&to={to}");
        Ok(self.get_json(&path).await?.unwrap_or_default())
    }

    async fn order_by_id(&self, order_id: &str) -> Result<Option<SaleOrder>, ServiceError> {
        self.get_json(&format!("orders/{order_id}")).await
    }
}

#[async_trait]
impl CatalogLookup for RetailApiClient {
    async fn by_item_code(&self, code: &str) -> Result<Option<CatalogItem>, ServiceError> {
        self.get_json(&format!("catalog/items/{code}")).await
    }
}

#[async_trait]
impl DepartmentLookup for RetailApiClient {
    async fn by_branch_code(&self, code: &str) -> Result<Option<Department>, ServiceError> {
        self.get_json(&format!("departments/{code}")).await
    }
}

#[async_trait]
impl PaymentRecordSource for RetailApiClient {
    async fn by_order_id(&self, order_id: &str) -> Result<Vec<PaymentRecord>, ServiceError> {
        Ok(self
            .get_json(&format!("orders/{order_id}/payments"))
            .await?
            .unwrap_or_default())
    }
}

/// Per-order snapshot cache over the reference lookups. Lives for one
/// order's processing pass only; no cross-order consistency is assumed.
pub struct ReferenceCache {
    catalog: Arc<dyn CatalogLookup>,
    departments: Arc<dyn DepartmentLookup>,
    items: HashMap<String, Option<CatalogItem>>,
    branches: HashMap<String, Option<Department>>,
}

impl ReferenceCache {
    pub fn new(catalog: Arc<dyn CatalogLookup>, departments: Arc<dyn DepartmentLookup>) -> Self {
        Self {
            catalog,
            departments,
            items: HashMap::new(),
            branches: HashMap::new(),
        }
    }

    pub async fn item(&mut self, code: &str) -> Result<Option<&CatalogItem>, ServiceError> {
        if !self.items.contains_key(code) {
            debug!(item_code = code, "catalog lookup");
            let fetched = self.catalog.by_item_code(code).await?;
            self.items.insert(code.to_string(), fetched);
        }
        Ok(self.items.get(code).and_then(|item| item.as_ref()))
    }

    pub async fn department(&mut self, branch: &str) -> Result<Option<&Department>, ServiceError> {
        if !self.branches.contains_key(branch) {
            debug!(branch_code = branch, "department lookup");
            let fetched = self.departments.by_branch_code(branch).await?;
            self.branches.insert(branch.to_string(), fetched);
        }
        Ok(self.branches.get(branch).and_then(|dept| dept.as_ref()))
    }
}

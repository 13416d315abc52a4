//! Test harness: in-memory collaborators for driving the submission
//! orchestrator without any network or database.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;

use possync_api::clients::{
    AccountingGateway, CatalogLookup, DenominationVoucherCalculator, DepartmentLookup,
    GatewayResponse, OrderSource, PaymentRecordSource,
};
use possync_api::errors::ServiceError;
use possync_api::models::{
    CatalogItem, CustomerInfo, Department, DocumentType, Fulfillment, PaymentRecord, ProductKind,
    SaleLine, SaleOrder,
};
use possync_api::services::audit_store::InMemoryAuditStore;
use possync_api::services::submission::{OrchestratorConfig, SubmissionOrchestrator};

// ==================== Gateway mock ====================

/// Records every submission and replays scripted responses per document
/// type; unscripted calls succeed with a generated correlation id.
#[derive(Default)]
pub struct MockGateway {
    pub submissions: Mutex<Vec<(DocumentType, Value)>>,
    scripted: Mutex<HashMap<DocumentType, VecDeque<GatewayResponse>>>,
    counter: Mutex<u32>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, document_type: DocumentType, response: GatewayResponse) {
        self.scripted
            .lock()
            .unwrap()
            .entry(document_type)
            .or_default()
            .push_back(response);
    }

    pub fn submitted(&self, document_type: DocumentType) -> Vec<Value> {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|(dt, _)| *dt == document_type)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountingGateway for MockGateway {
    async fn submit(
        &self,
        document_type: DocumentType,
        payload: Value,
    ) -> Result<GatewayResponse, ServiceError> {
        self.submissions
            .lock()
            .unwrap()
            .push((document_type, payload));
        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(&document_type)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(response) => Ok(response),
            None => {
                let mut counter = self.counter.lock().unwrap();
                *counter += 1;
                Ok(success_response(&format!("guid-{}", *counter)))
            }
        }
    }
}

pub fn success_response(guid: &str) -> GatewayResponse {
    GatewayResponse::from_raw(json!({"status": 1, "message": "ok", "guid": guid}))
}

pub fn failure_response(message: &str) -> GatewayResponse {
    GatewayResponse::from_raw(json!({"status": 0, "message": message}))
}

pub fn duplicate_response() -> GatewayResponse {
    GatewayResponse::from_raw(json!({"status": 0, "message": "Chứng từ đã tồn tại trong hệ thống"}))
}

// ==================== Reference data mocks ====================

pub struct StaticCatalog(pub HashMap<String, CatalogItem>);

impl StaticCatalog {
    pub fn with_default_items() -> Self {
        let mut items = HashMap::new();
        items.insert(
            "SP001".to_string(),
            CatalogItem {
                item_code: "SP001".into(),
                unit: "Hộp".into(),
                product_category: "Sữa bột".into(),
                track_batch: false,
                track_serial: false,
                material_code: Some("VT-SP001".into()),
            },
        );
        items.insert(
            "SP002".to_string(),
            CatalogItem {
                item_code: "SP002".into(),
                unit: "Cái".into(),
                product_category: "Đồ chơi".into(),
                track_batch: false,
                track_serial: false,
                material_code: None,
            },
        );
        StaticCatalog(items)
    }
}

#[async_trait]
impl CatalogLookup for StaticCatalog {
    async fn by_item_code(&self, code: &str) -> Result<Option<CatalogItem>, ServiceError> {
        Ok(self.0.get(code).cloned())
    }
}

pub struct StaticDepartments;

#[async_trait]
impl DepartmentLookup for StaticDepartments {
    async fn by_branch_code(&self, code: &str) -> Result<Option<Department>, ServiceError> {
        Ok(Some(Department {
            branch_code: code.to_string(),
            warehouse_company_code: "1000".into(),
            department_code: "D01".into(),
        }))
    }
}

pub struct StaticPayments(pub Vec<PaymentRecord>);

#[async_trait]
impl PaymentRecordSource for StaticPayments {
    async fn by_order_id(&self, _order_id: &str) -> Result<Vec<PaymentRecord>, ServiceError> {
        Ok(self.0.clone())
    }
}

pub struct StaticOrders(pub Vec<SaleOrder>);

#[async_trait]
impl OrderSource for StaticOrders {
    async fn orders_in_window(
        &self,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<SaleOrder>, ServiceError> {
        Ok(self.0.clone())
    }

    async fn order_by_id(&self, order_id: &str) -> Result<Option<SaleOrder>, ServiceError> {
        Ok(self.0.iter().find(|o| o.order_id == order_id).cloned())
    }
}

// ==================== Fixtures ====================

pub fn sale_line(line_number: i32, item_code: &str) -> SaleLine {
    SaleLine {
        line_number,
        item_code: item_code.into(),
        item_name: format!("Item {item_code}"),
        ordered_qty: dec!(2),
        unit_price: dec!(100000),
        line_revenue: dec!(200000),
        promotion_code: None,
        product_kind: ProductKind::Item,
        vip_discount: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        voucher_paid: Decimal::ZERO,
        tax_code: Some("V08".into()),
        tax_rate: dec!(8),
        tax_amount: dec!(16000),
        brand: "KA".into(),
        branch_code: "CH001".into(),
        warehouse_code: Some("K001".into()),
        card_code: None,
        lot_serial_value: None,
        track_batch: false,
        track_serial: false,
        discount_account_code: None,
        cost_account_code: None,
        fee_code: None,
        fulfillment: None,
    }
}

pub fn fulfilled(mut line: SaleLine, quantity: Decimal, date: Option<NaiveDate>) -> SaleLine {
    line.fulfillment = Some(Fulfillment {
        quantity,
        date,
        warehouse_code: None,
    });
    line
}

pub fn sale_order(order_id: &str, label: &str, lines: Vec<SaleLine>) -> SaleOrder {
    SaleOrder {
        order_id: order_id.into(),
        order_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        order_type_label: label.into(),
        branch_code: "CH001".into(),
        brand: "KA".into(),
        channel_code: Some("POS".into()),
        customer: CustomerInfo {
            code: "KH0001".into(),
            name: "Nguyễn Văn A".into(),
            tax_code: None,
            address: None,
            phone: None,
            channel: None,
        },
        lines,
    }
}

// ==================== Wiring ====================

pub struct TestHarness {
    pub gateway: Arc<MockGateway>,
    pub audit: Arc<InMemoryAuditStore>,
    pub orchestrator: Arc<SubmissionOrchestrator>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_payments(vec![])
    }

    pub fn with_payments(payments: Vec<PaymentRecord>) -> Self {
        let gateway = Arc::new(MockGateway::new());
        let audit = Arc::new(InMemoryAuditStore::new());
        let orchestrator = Arc::new(SubmissionOrchestrator::new(
            gateway.clone(),
            Arc::new(StaticCatalog::with_default_items()),
            Arc::new(StaticDepartments),
            Arc::new(StaticPayments(payments)),
            audit.clone(),
            Arc::new(DenominationVoucherCalculator),
            OrchestratorConfig {
                company_code: "C100".into(),
                gift_promotion_brands: vec![],
            },
        ));
        TestHarness {
            gateway,
            audit,
            orchestrator,
        }
    }
}

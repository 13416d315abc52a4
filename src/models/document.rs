use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::resolved::{DiscountSlot, ResolvedLine};

/// Accounting document families submitted to the external gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum DocumentType {
    Customer,
    SalesOrder,
    SalesInvoice,
    SalesReturn,
    CashReceipt,
    CreditAdvice,
    WarehouseTransfer,
}

impl DocumentType {
    /// Gateway endpoint path for this document family.
    pub fn endpoint_path(self) -> &'static str {
        match self {
            DocumentType::Customer => "customers",
            DocumentType::SalesOrder => "sales-orders",
            DocumentType::SalesInvoice => "sales-invoices",
            DocumentType::SalesReturn => "sales-returns",
            DocumentType::CashReceipt => "cash-receipts",
            DocumentType::CreditAdvice => "credit-advices",
            DocumentType::WarehouseTransfer => "warehouse-transfers",
        }
    }

    /// Document series code stamped on the header.
    pub fn series_code(self) -> &'static str {
        match self {
            DocumentType::Customer => "KH",
            DocumentType::SalesOrder => "SO",
            DocumentType::SalesInvoice => "HD",
            DocumentType::SalesReturn => "TH",
            DocumentType::CashReceipt => "PT",
            DocumentType::CreditAdvice => "BC",
            DocumentType::WarehouseTransfer => "PX",
        }
    }
}

/// Document header shared by every submitted accounting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub company_code: String,
    pub customer_code: String,
    pub customer_name: String,
    pub transaction_kind_code: String,
    pub document_date: NaiveDate,
    pub posting_date: NaiveDate,
    pub document_number: String,
    pub series_code: String,
    pub currency: String,
    pub exchange_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_code: Option<String>,
    /// Source warehouse for movement documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_warehouse_code: Option<String>,
    /// Target warehouse for movement documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_warehouse_code: Option<String>,
}

/// One detail row of a submitted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    pub line_number: i32,
    pub material_code: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_amount: Decimal,
    /// The 22 parallel discount slots, always fully present
    pub discounts: Vec<DiscountSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub warehouse_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_code: Option<String>,
    pub transaction_type_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_promotion_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_account_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_code: Option<String>,
}

impl DocumentLine {
    pub fn from_resolved(line: &ResolvedLine) -> Self {
        DocumentLine {
            line_number: line.line_number,
            material_code: line.material_code.clone(),
            unit: line.unit.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_amount: line.line_amount,
            discounts: line.discounts.iter().cloned().collect(),
            tax_code: line.tax_code.clone(),
            tax_rate: line.tax_rate,
            tax_amount: line.tax_amount,
            warehouse_code: line.warehouse_code.clone(),
            card_code: line.card_code.clone(),
            lot_code: line.lot_code.clone(),
            serial_code: line.serial_code.clone(),
            transaction_type_code: line.transaction_type_code.clone(),
            promotion_code: line.promotion_code.clone(),
            gift_promotion_code: line.gift_promotion_code.clone(),
            voucher_code: line.voucher_code.clone(),
            cost_account_code: line.cost_account_code.clone(),
            fee_code: line.fee_code.clone(),
        }
    }
}

/// Per-line reconciliation row: all 22 discount slots collapsed into one
/// net figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub line_number: i32,
    pub net_discount: Decimal,
}

/// Full submission document: header plus detail and summary arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingDocument {
    pub header: DocumentHeader,
    pub detail: Vec<DocumentLine>,
    pub summary: Vec<SummaryLine>,
}

/// Customer master upsert document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDocument {
    pub company_code: String,
    pub customer_code: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_code: Option<String>,
}

/// Payment posting document (cash receipt or credit advice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDocument {
    pub header: DocumentHeader,
    pub method_code: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

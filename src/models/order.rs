use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product classification carried on catalog items and order lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductKind {
    #[default]
    Item,
    Service,
    Voucher,
}

impl ProductKind {
    /// Type suffix appended to promotion display codes.
    pub fn type_suffix(self) -> &'static str {
        match self {
            ProductKind::Item => ".I",
            ProductKind::Service => ".S",
            ProductKind::Voucher => ".V",
        }
    }
}

/// Shipment/stock-movement record attached to a line once goods physically
/// left a warehouse. Absent until fulfillment happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub quantity: Decimal,
    pub date: Option<NaiveDate>,
    pub warehouse_code: Option<String>,
}

/// One item/service entry within an order, as read from the upstream retail
/// API and enriched with catalog tracking flags. Immutable once read;
/// resolution produces a derived `ResolvedLine` and never mutates the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub line_number: i32,
    pub item_code: String,
    pub item_name: String,
    pub ordered_qty: Decimal,
    pub unit_price: Decimal,
    pub line_revenue: Decimal,
    #[serde(default)]
    pub promotion_code: Option<String>,
    #[serde(default)]
    pub product_kind: ProductKind,
    /// VIP/grade discount amount
    #[serde(default)]
    pub vip_discount: Decimal,
    /// Generic (trade) discount amount
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Amount settled by voucher
    #[serde(default)]
    pub voucher_paid: Decimal,
    #[serde(default)]
    pub tax_code: Option<String>,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    pub brand: String,
    /// Branch the line was sold from; resolves to a department
    pub branch_code: String,
    #[serde(default)]
    pub warehouse_code: Option<String>,
    #[serde(default)]
    pub card_code: Option<String>,
    /// Raw lot/serial value as captured at the till
    #[serde(default)]
    pub lot_serial_value: Option<String>,
    #[serde(default)]
    pub track_batch: bool,
    #[serde(default)]
    pub track_serial: bool,
    /// Legacy discount/cost/fee account values carried on the line;
    /// the resolver passes these through when no rule claims the line.
    #[serde(default)]
    pub discount_account_code: Option<String>,
    #[serde(default)]
    pub cost_account_code: Option<String>,
    #[serde(default)]
    pub fee_code: Option<String>,
    #[serde(default)]
    pub fulfillment: Option<Fulfillment>,
}

impl SaleLine {
    /// Gift lines carry no monetary value: price and revenue both zero.
    pub fn is_gift_line(&self) -> bool {
        self.unit_price.is_zero() && self.line_revenue.is_zero()
    }

    pub fn fulfilled_qty(&self) -> Option<Decimal> {
        self.fulfillment.as_ref().map(|f| f.quantity)
    }

    pub fn fulfillment_date(&self) -> Option<NaiveDate> {
        self.fulfillment.as_ref().and_then(|f| f.date)
    }
}

/// Customer block on the order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub tax_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Sales channel the customer is tagged with (e-commerce customers
    /// carry one of the recognized marketplace channels)
    #[serde(default)]
    pub channel: Option<String>,
}

/// Top-level record identifying one customer transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleOrder {
    pub order_id: String,
    pub order_date: NaiveDate,
    /// Free-text order-type label of the first line; classification is
    /// header-level
    pub order_type_label: String,
    pub branch_code: String,
    pub brand: String,
    #[serde(default)]
    pub channel_code: Option<String>,
    pub customer: CustomerInfo,
    pub lines: Vec<SaleLine>,
}

impl SaleOrder {
    /// Distinct fulfillment dates across lines, sorted ascending.
    pub fn fulfillment_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> =
            self.lines.iter().filter_map(|l| l.fulfillment_date()).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

/// Cash/voucher payment method record previously captured for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub method_code: String,
    pub amount: Decimal,
    #[serde(default)]
    pub is_voucher: bool,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Payment method codes settled in cash; everything else posts as a
/// credit advice.
pub const CASH_METHOD_CODES: &[&str] = &["TM", "CASH"];

impl PaymentRecord {
    pub fn is_cash(&self) -> bool {
        CASH_METHOD_CODES.contains(&self.method_code.as_str())
    }
}

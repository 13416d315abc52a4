//! Order classification and invoice field resolution.
//!
//! Everything here is pure: reference data is fetched by the caller and
//! passed in, and resolution derives a `ResolvedLine` without touching the
//! source line.

pub mod accounting_fields;
pub mod batch_serial;
pub mod order_type;
pub mod payload;
pub mod price_allocation;

pub use order_type::{classify, Classification, OrderCategory};

use crate::models::{CatalogItem, Department, ResolvedLine, SaleLine};

/// Everything needed to resolve one line.
#[derive(Debug, Clone, Copy)]
pub struct LineResolutionInput<'a> {
    pub classification: Classification,
    pub line: &'a SaleLine,
    pub catalog: Option<&'a CatalogItem>,
    pub department: Option<&'a Department>,
    pub gift_promotion_active: bool,
    pub customer_channel: Option<&'a str>,
    /// Voucher display code computed by the collaborator; used when the
    /// customer is not on a marketplace channel
    pub voucher_fallback: Option<&'a str>,
}

/// Derives the full accounting view of one line.
pub fn resolve_line(input: &LineResolutionInput) -> ResolvedLine {
    let line = input.line;
    let category = input.classification.category;

    let ctx = accounting_fields::LineContext {
        category,
        line,
        department: input.department,
        gift_promotion_active: input.gift_promotion_active,
        customer_channel: input.customer_channel,
    };

    let codes = accounting_fields::resolve_account_codes(&ctx);
    let promos = accounting_fields::resolve_promotion_codes(&ctx);
    let voucher_code =
        accounting_fields::resolve_voucher_code(&ctx, input.voucher_fallback.map(str::to_string));

    // Catalog flags win over whatever the upstream line carries.
    let (unit, product_category, track_batch, track_serial, material_code) = match input.catalog {
        Some(item) => (
            item.unit.clone(),
            item.product_category.clone(),
            item.track_batch,
            item.track_serial,
            item.material_code
                .clone()
                .unwrap_or_else(|| line.item_code.clone()),
        ),
        None => (
            String::new(),
            String::new(),
            line.track_batch,
            line.track_serial,
            line.item_code.clone(),
        ),
    };

    let batch_serial = batch_serial::resolve(
        track_batch,
        track_serial,
        line.lot_serial_value.as_deref().unwrap_or(""),
        &product_category,
    );

    let allocation = price_allocation::allocate(
        line.ordered_qty,
        line.fulfilled_qty(),
        line.unit_price,
        line.line_revenue,
        category,
    );

    let quantity = line.fulfilled_qty().unwrap_or(line.ordered_qty);
    let transaction_type =
        accounting_fields::resolve_transaction_type(category, line.product_kind, quantity);

    let movement_warehouse = line
        .fulfillment
        .as_ref()
        .and_then(|f| f.warehouse_code.as_deref());
    let warehouse_code = accounting_fields::resolve_warehouse_code(
        category,
        input.department,
        movement_warehouse,
        line.warehouse_code.as_deref(),
    );

    let mut resolved = ResolvedLine {
        line_number: line.line_number,
        material_code,
        unit,
        quantity,
        unit_price: allocation.unit_price,
        line_amount: allocation.line_amount,
        discounts: accounting_fields::compose_discount_slots(&ctx, &codes),
        tax_code: line.tax_code.clone(),
        tax_rate: line.tax_rate,
        tax_amount: line.tax_amount,
        warehouse_code,
        card_code: line.card_code.clone(),
        lot_code: batch_serial.lot_code,
        serial_code: batch_serial.serial_code,
        transaction_type_code: transaction_type.to_string(),
        promotion_code: promos.promotion_code,
        gift_promotion_code: promos.gift_promotion_code,
        voucher_code,
        cost_account_code: codes.cost_account_code,
        fee_code: codes.fee_code,
        fulfillment_date: line.fulfillment_date(),
    };

    // Every monetary slot scales by the same fulfillment ratio.
    let ratio = price_allocation::fulfillment_ratio(line.ordered_qty, line.fulfilled_qty());
    price_allocation::scale_monetary_slots(&mut resolved, ratio);

    resolved
}

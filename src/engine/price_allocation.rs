use rust_decimal::Decimal;

use super::order_type::OrderCategory;
use crate::models::ResolvedLine;

/// Recomputed monetary figures for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub unit_price: Decimal,
    pub line_amount: Decimal,
}

/// Recomputes unit price and line amount under partial-fulfillment ratios.
///
/// Point-redemption lines never carry monetary value. A zero unit price with
/// positive revenue is derived back from the ordered quantity. Proportional
/// reallocation applies only to the normal family when the fulfilled
/// quantity is known and differs from the ordered one.
pub fn allocate(
    ordered_qty: Decimal,
    fulfilled_qty: Option<Decimal>,
    unit_price: Decimal,
    line_revenue: Decimal,
    category: OrderCategory,
) -> Allocation {
    if category == OrderCategory::LoyaltyPointExchange {
        return Allocation {
            unit_price: Decimal::ZERO,
            line_amount: Decimal::ZERO,
        };
    }

    let mut price = unit_price;
    if price.is_zero() && line_revenue > Decimal::ZERO && !ordered_qty.is_zero() {
        price = line_revenue / ordered_qty.abs();
    }

    let mut amount = line_revenue;
    if category.is_normal_family() {
        if let Some(fulfilled) = fulfilled_qty {
            if fulfilled != ordered_qty {
                amount = if fulfilled > Decimal::ZERO && price > Decimal::ZERO {
                    fulfilled * price
                } else if ordered_qty.is_zero() {
                    line_revenue
                } else {
                    line_revenue * fulfilled / ordered_qty
                };
            }
        }
    }

    Allocation {
        unit_price: price,
        line_amount: amount,
    }
}

/// Ratio of fulfilled to ordered quantity; `1` when fulfillment is unknown
/// or the ordered quantity is zero.
pub fn fulfillment_ratio(ordered_qty: Decimal, fulfilled_qty: Option<Decimal>) -> Decimal {
    match fulfilled_qty {
        Some(fulfilled) if !ordered_qty.is_zero() => fulfilled / ordered_qty,
        _ => Decimal::ONE,
    }
}

/// Scales every monetary slot on the line by the fulfillment ratio: all 22
/// discount amounts and the tax amount, uniformly.
pub fn scale_monetary_slots(line: &mut ResolvedLine, ratio: Decimal) {
    if ratio == Decimal::ONE {
        return;
    }
    line.discounts.scale(ratio);
    line.tax_amount *= ratio;
}

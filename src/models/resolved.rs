use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of parallel (account-code, amount) discount slots on a line.
pub const DISCOUNT_SLOT_COUNT: usize = 22;

/// Slot assignments for the discount kinds the resolver produces. Slots are
/// 1-based to match the external document layout (ck01..ck22).
pub const SLOT_VIP: usize = 1;
pub const SLOT_VOUCHER: usize = 2;
pub const SLOT_TRADE: usize = 3;
pub const SLOT_CARRYOVER: usize = 4;

/// One of the 22 parallel discount/fee positions on a line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountSlot {
    pub code: Option<String>,
    pub amount: Decimal,
}

/// Fixed-width collection of the 22 discount slots. Always fully populated
/// so scaling and summary reconciliation treat every slot uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSlots(Vec<DiscountSlot>);

impl Default for DiscountSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscountSlots {
    pub fn new() -> Self {
        DiscountSlots(vec![DiscountSlot::default(); DISCOUNT_SLOT_COUNT])
    }

    /// Sets a slot by its 1-based position.
    pub fn set(&mut self, slot: usize, code: Option<String>, amount: Decimal) {
        assert!(
            (1..=DISCOUNT_SLOT_COUNT).contains(&slot),
            "discount slot out of range: {slot}"
        );
        self.0[slot - 1] = DiscountSlot { code, amount };
    }

    pub fn get(&self, slot: usize) -> &DiscountSlot {
        &self.0[slot - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscountSlot> {
        self.0.iter()
    }

    /// Scales every slot amount by the given ratio. Applied uniformly when
    /// a line is partially fulfilled.
    pub fn scale(&mut self, ratio: Decimal) {
        for slot in &mut self.0 {
            slot.amount *= ratio;
        }
    }

    /// Net discount across all slots, used by the summary array.
    pub fn total(&self) -> Decimal {
        self.0.iter().map(|s| s.amount).sum()
    }
}

/// Derived accounting view of one sale line. Ephemeral: rebuilt on every
/// submission attempt from the immutable `SaleLine`.
///
/// Invariant: at most one of `lot_code`/`serial_code` is set, and display
/// codes carry their `.I/.S/.V` type suffix exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub line_number: i32,
    pub material_code: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_amount: Decimal,
    pub discounts: DiscountSlots,
    pub tax_code: Option<String>,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub warehouse_code: String,
    pub card_code: Option<String>,
    pub lot_code: Option<String>,
    pub serial_code: Option<String>,
    pub transaction_type_code: String,
    pub promotion_code: Option<String>,
    pub gift_promotion_code: Option<String>,
    pub voucher_code: Option<String>,
    pub cost_account_code: Option<String>,
    pub fee_code: Option<String>,
    pub fulfillment_date: Option<NaiveDate>,
}

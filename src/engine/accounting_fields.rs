use rust_decimal::Decimal;

use super::order_type::OrderCategory;
use crate::models::{
    Department, DiscountSlots, ProductKind, SaleLine,
    resolved::{SLOT_CARRYOVER, SLOT_TRADE, SLOT_VIP, SLOT_VOUCHER},
};

/// Cost/fee pair posted for promotion-style giveaways (bottle exchange,
/// loyalty redemption, investment goods, active gift programs).
pub const COST_ACCOUNT_PROMO: &str = "632KM";
pub const FEE_CODE_PROMO: &str = "64181";

/// Cost/fee pair posted for birthday-gift orders.
pub const COST_ACCOUNT_BIRTHDAY: &str = "632SN";
pub const FEE_CODE_BIRTHDAY: &str = "64182";

/// Discount account codes per discount kind and product flag.
pub const DISCOUNT_VIP_ITEM: &str = "CKVIP.I";
pub const DISCOUNT_VIP_SERVICE: &str = "CKVIP.S";
pub const DISCOUNT_VOUCHER_GIFT: &str = "CKVC.V";
pub const DISCOUNT_VOUCHER_ITEM: &str = "CKVC.I";
pub const DISCOUNT_VOUCHER_SERVICE: &str = "CKVC.S";
pub const DISCOUNT_TRADE_SERVICE: &str = "CKTM.S";
pub const DISCOUNT_TRADE_ITEM: &str = "CKTM.I";

/// Older tills emit promotion codes under this prefix; the accounting
/// system only recognizes the canonical one. A rewritten code never gets a
/// type suffix appended.
const LEGACY_PROMO_PREFIX: &str = "CTKM";
const CANONICAL_PROMO_PREFIX: &str = "KM";

/// Fixed loyalty-redemption promotion code per warehouse company code.
const LOYALTY_PROMO_BY_COMPANY: &[(&str, &str)] = &[
    ("1000", "DOIDIEM.KA"),
    ("2000", "DOIDIEM.KB"),
    ("3000", "DOIDIEM.KC"),
];
pub const LOYALTY_PROMO_DEFAULT: &str = "DOIDIEM";

/// Marketplace channels whose customers get the fixed voucher code.
pub const ECOMMERCE_CHANNELS: &[&str] = &["Shopee", "Lazada", "TikTok Shop"];

/// Fixed e-commerce voucher display code per brand.
const ECOM_VOUCHER_BY_BRAND: &[(&str, &str)] = &[("KA", "VCTMDT.KA"), ("KB", "VCTMDT.KB")];
pub const ECOM_VOUCHER_DEFAULT: &str = "VCTMDT";

const TYPE_SUFFIXES: &[&str] = &[".I", ".S", ".V"];

/// Per-line inputs shared by the resolver functions.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub category: OrderCategory,
    pub line: &'a SaleLine,
    pub department: Option<&'a Department>,
    /// A gift-promotion program is currently active for the order's brand
    pub gift_promotion_active: bool,
    /// Sales channel the customer is tagged with, if any
    pub customer_channel: Option<&'a str>,
}

/// Which branch of the account-code chain claimed the line. Decides the
/// discount slot the winning code is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountBranch {
    FixedPromo,
    Birthday,
    GiftCarryover,
    Vip,
    Voucher,
    Trade,
    PromotionCode,
    Passthrough,
}

/// Resolved account codes for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCodes {
    pub discount_code: Option<String>,
    pub cost_account_code: Option<String>,
    pub fee_code: Option<String>,
    pub branch: DiscountBranch,
}

/// Resolved promotion display codes. Gift lines carry the gift code and no
/// regular promotion code; all other lines the reverse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionCodes {
    pub promotion_code: Option<String>,
    pub gift_promotion_code: Option<String>,
}

/// Account-code precedence chain. Evaluated top to bottom, first true
/// branch wins; the order mirrors the current production behavior and is
/// deliberately not re-sorted.
pub fn resolve_account_codes(ctx: &LineContext) -> AccountCodes {
    let line = ctx.line;

    // 1. Giveaway categories always post the promotion cost/fee pair.
    if matches!(
        ctx.category,
        OrderCategory::BottleExchange
            | OrderCategory::LoyaltyPointExchange
            | OrderCategory::Investment
    ) {
        return AccountCodes {
            discount_code: None,
            cost_account_code: Some(COST_ACCOUNT_PROMO.to_string()),
            fee_code: Some(FEE_CODE_PROMO.to_string()),
            branch: DiscountBranch::FixedPromo,
        };
    }

    // 2. Birthday gifts post their own pair.
    if ctx.category == OrderCategory::BirthdayGift {
        return AccountCodes {
            discount_code: None,
            cost_account_code: Some(COST_ACCOUNT_BIRTHDAY.to_string()),
            fee_code: Some(FEE_CODE_BIRTHDAY.to_string()),
            branch: DiscountBranch::Birthday,
        };
    }

    // 3. Gift lines under an active gift program: promo pair, discount
    //    carried over from the line.
    if ctx.gift_promotion_active && line.is_gift_line() {
        return AccountCodes {
            discount_code: line.discount_account_code.clone(),
            cost_account_code: Some(COST_ACCOUNT_PROMO.to_string()),
            fee_code: Some(FEE_CODE_PROMO.to_string()),
            branch: DiscountBranch::GiftCarryover,
        };
    }

    // 4. VIP/grade discount.
    if line.vip_discount > Decimal::ZERO {
        match line.product_kind {
            ProductKind::Item => return discount_branch(line, DISCOUNT_VIP_ITEM, DiscountBranch::Vip),
            ProductKind::Service => {
                return discount_branch(line, DISCOUNT_VIP_SERVICE, DiscountBranch::Vip)
            }
            ProductKind::Voucher => {}
        }
    }

    // 5. Voucher-settled amount.
    if line.voucher_paid > Decimal::ZERO {
        if line.is_gift_line() {
            return discount_branch(line, DISCOUNT_VOUCHER_GIFT, DiscountBranch::Voucher);
        }
        match line.product_kind {
            ProductKind::Item => {
                return discount_branch(line, DISCOUNT_VOUCHER_ITEM, DiscountBranch::Voucher)
            }
            ProductKind::Service => {
                return discount_branch(line, DISCOUNT_VOUCHER_SERVICE, DiscountBranch::Voucher)
            }
            ProductKind::Voucher => {}
        }
    }

    // 6. Generic trade discount.
    if line.discount_amount > Decimal::ZERO {
        match line.product_kind {
            ProductKind::Service => {
                return discount_branch(line, DISCOUNT_TRADE_SERVICE, DiscountBranch::Trade)
            }
            ProductKind::Item => {
                return discount_branch(line, DISCOUNT_TRADE_ITEM, DiscountBranch::Trade)
            }
            ProductKind::Voucher => {}
        }
    }

    // 7. A promotion code alone claims the trade codes, except for gift
    //    lines already handled by the gift program branch.
    if line.promotion_code.is_some() && !(ctx.gift_promotion_active && line.is_gift_line()) {
        match line.product_kind {
            ProductKind::Item => {
                return discount_branch(line, DISCOUNT_TRADE_ITEM, DiscountBranch::PromotionCode)
            }
            ProductKind::Service => {
                return discount_branch(line, DISCOUNT_TRADE_SERVICE, DiscountBranch::PromotionCode)
            }
            ProductKind::Voucher => {}
        }
    }

    // 8. Legacy passthrough: keep whatever the line already carries.
    AccountCodes {
        discount_code: line.discount_account_code.clone(),
        cost_account_code: line.cost_account_code.clone(),
        fee_code: line.fee_code.clone(),
        branch: DiscountBranch::Passthrough,
    }
}

fn discount_branch(line: &SaleLine, code: &str, branch: DiscountBranch) -> AccountCodes {
    AccountCodes {
        discount_code: Some(code.to_string()),
        cost_account_code: line.cost_account_code.clone(),
        fee_code: line.fee_code.clone(),
        branch,
    }
}

/// Promotion display-code chain, parallel to the account-code chain.
pub fn resolve_promotion_codes(ctx: &LineContext) -> PromotionCodes {
    // Loyalty redemptions replace the code entirely with the fixed label
    // for the owning company; no discount code accompanies it.
    if ctx.category == OrderCategory::LoyaltyPointExchange {
        let company = ctx
            .department
            .map(|d| d.warehouse_company_code.as_str())
            .unwrap_or("");
        return PromotionCodes {
            promotion_code: Some(loyalty_promotion_code(company)),
            gift_promotion_code: None,
        };
    }

    let raw = match ctx.line.promotion_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code,
        _ => return PromotionCodes::default(),
    };

    // Recognized legacy prefix: rewrite to the canonical one and skip
    // suffix handling entirely.
    if let Some(rest) = raw.strip_prefix(LEGACY_PROMO_PREFIX) {
        let rewritten = format!("{}{}", CANONICAL_PROMO_PREFIX, rest);
        return PromotionCodes {
            promotion_code: Some(leading_segment(&rewritten).to_string()),
            gift_promotion_code: None,
        };
    }

    let segment = leading_segment(raw);

    // Gift lines in the normal family report the cut code without any type
    // suffix, in the gift position.
    if ctx.category.is_normal_family() && ctx.line.is_gift_line() {
        return PromotionCodes {
            promotion_code: None,
            gift_promotion_code: Some(strip_type_suffix(segment)),
        };
    }

    PromotionCodes {
        promotion_code: Some(ensure_type_suffix(segment, ctx.line.product_kind)),
        gift_promotion_code: None,
    }
}

/// Fixed loyalty promotion code for a warehouse company code.
pub fn loyalty_promotion_code(company_code: &str) -> String {
    LOYALTY_PROMO_BY_COMPANY
        .iter()
        .find(|(code, _)| *code == company_code)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| LOYALTY_PROMO_DEFAULT.to_string())
}

/// Voucher display code: fixed brand constant for marketplace customers,
/// otherwise the collaborator-computed fallback.
pub fn resolve_voucher_code(ctx: &LineContext, fallback: Option<String>) -> Option<String> {
    if ctx.line.voucher_paid <= Decimal::ZERO {
        return None;
    }
    if let Some(channel) = ctx.customer_channel {
        if ECOMMERCE_CHANNELS.contains(&channel) {
            return Some(ecommerce_voucher_code(&ctx.line.brand));
        }
    }
    fallback
}

fn ecommerce_voucher_code(brand: &str) -> String {
    ECOM_VOUCHER_BY_BRAND
        .iter()
        .find(|(b, _)| *b == brand)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or_else(|| ECOM_VOUCHER_DEFAULT.to_string())
}

/// Transaction-type code (loai_gd) for one line.
pub fn resolve_transaction_type(
    category: OrderCategory,
    product_kind: ProductKind,
    quantity: Decimal,
) -> &'static str {
    match category {
        OrderCategory::NormalExchange | OrderCategory::CardSeparation => {
            if quantity < Decimal::ZERO {
                "11"
            } else {
                "12"
            }
        }
        OrderCategory::Service
            if product_kind == ProductKind::Service && quantity > Decimal::ZERO =>
        {
            "01"
        }
        _ => "01",
    }
}

/// Warehouse code for one line. Card separation always forces the
/// department-derived code; everything else prefers the actual stock
/// movement, then the line's own warehouse.
pub fn resolve_warehouse_code(
    category: OrderCategory,
    department: Option<&Department>,
    movement_warehouse: Option<&str>,
    line_warehouse: Option<&str>,
) -> String {
    if category == OrderCategory::CardSeparation {
        if let Some(dept) = department {
            return format!("B{}", dept.department_code);
        }
    }
    movement_warehouse
        .or(line_warehouse)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Fills the 22 discount slots: kind amounts always occupy their designated
/// slots, the winning branch attaches its account code to the matching one,
/// and carried-over codes land in the carry-over slot.
pub fn compose_discount_slots(ctx: &LineContext, codes: &AccountCodes) -> DiscountSlots {
    let line = ctx.line;
    let mut slots = DiscountSlots::new();
    slots.set(SLOT_VIP, None, line.vip_discount);
    slots.set(SLOT_VOUCHER, None, line.voucher_paid);
    slots.set(SLOT_TRADE, None, line.discount_amount);

    match codes.branch {
        DiscountBranch::Vip => slots.set(SLOT_VIP, codes.discount_code.clone(), line.vip_discount),
        DiscountBranch::Voucher => {
            slots.set(SLOT_VOUCHER, codes.discount_code.clone(), line.voucher_paid)
        }
        DiscountBranch::Trade | DiscountBranch::PromotionCode => {
            slots.set(SLOT_TRADE, codes.discount_code.clone(), line.discount_amount)
        }
        DiscountBranch::GiftCarryover | DiscountBranch::Passthrough => {
            if codes.discount_code.is_some() {
                slots.set(SLOT_CARRYOVER, codes.discount_code.clone(), Decimal::ZERO);
            }
        }
        DiscountBranch::FixedPromo | DiscountBranch::Birthday => {}
    }
    slots
}

/// Strips a trailing type suffix, if any. Gift codes never carry one.
pub fn strip_type_suffix(code: &str) -> String {
    for suffix in TYPE_SUFFIXES {
        if let Some(stripped) = code.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    code.to_string()
}

/// Appends the product-kind suffix unless the code already ends in one of
/// the three type suffixes. Idempotent.
pub fn ensure_type_suffix(code: &str, kind: ProductKind) -> String {
    if TYPE_SUFFIXES.iter().any(|s| code.ends_with(s)) {
        code.to_string()
    } else {
        format!("{}{}", code, kind.type_suffix())
    }
}

fn leading_segment(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resolved::{SLOT_CARRYOVER, SLOT_TRADE, SLOT_VIP, SLOT_VOUCHER};
    use rust_decimal_macros::dec;

    fn line() -> SaleLine {
        SaleLine {
            line_number: 1,
            item_code: "SP001".into(),
            item_name: "Sữa bột 900g".into(),
            ordered_qty: dec!(1),
            unit_price: dec!(100000),
            line_revenue: dec!(100000),
            promotion_code: None,
            product_kind: ProductKind::Item,
            vip_discount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            voucher_paid: Decimal::ZERO,
            tax_code: None,
            tax_rate: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            brand: "KA".into(),
            branch_code: "CH001".into(),
            warehouse_code: Some("K001".into()),
            card_code: None,
            lot_serial_value: None,
            track_batch: false,
            track_serial: false,
            discount_account_code: Some("CKLEGACY".into()),
            cost_account_code: Some("632".into()),
            fee_code: Some("641".into()),
            fulfillment: None,
        }
    }

    fn ctx<'a>(category: OrderCategory, line: &'a SaleLine) -> LineContext<'a> {
        LineContext {
            category,
            line,
            department: None,
            gift_promotion_active: false,
            customer_channel: None,
        }
    }

    fn dept() -> Department {
        Department {
            branch_code: "CH001".into(),
            warehouse_company_code: "1000".into(),
            department_code: "D01".into(),
        }
    }

    #[test]
    fn giveaway_categories_take_fixed_promo_pair() {
        let l = line();
        for category in [
            OrderCategory::BottleExchange,
            OrderCategory::LoyaltyPointExchange,
            OrderCategory::Investment,
        ] {
            let codes = resolve_account_codes(&ctx(category, &l));
            assert_eq!(codes.branch, DiscountBranch::FixedPromo);
            assert_eq!(codes.cost_account_code.as_deref(), Some(COST_ACCOUNT_PROMO));
            assert_eq!(codes.fee_code.as_deref(), Some(FEE_CODE_PROMO));
            assert!(codes.discount_code.is_none());
        }
    }

    #[test]
    fn birthday_gift_takes_its_own_pair() {
        let l = line();
        let codes = resolve_account_codes(&ctx(OrderCategory::BirthdayGift, &l));
        assert_eq!(codes.cost_account_code.as_deref(), Some(COST_ACCOUNT_BIRTHDAY));
        assert_eq!(codes.fee_code.as_deref(), Some(FEE_CODE_BIRTHDAY));
    }

    #[test]
    fn active_gift_program_carries_line_discount() {
        let mut l = line();
        l.unit_price = Decimal::ZERO;
        l.line_revenue = Decimal::ZERO;
        let mut c = ctx(OrderCategory::Normal, &l);
        c.gift_promotion_active = true;
        let codes = resolve_account_codes(&c);
        assert_eq!(codes.branch, DiscountBranch::GiftCarryover);
        assert_eq!(codes.discount_code.as_deref(), Some("CKLEGACY"));
        assert_eq!(codes.cost_account_code.as_deref(), Some(COST_ACCOUNT_PROMO));
    }

    #[test]
    fn vip_discount_picks_code_by_product_kind() {
        let mut l = line();
        l.vip_discount = dec!(20000);
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.discount_code.as_deref(), Some(DISCOUNT_VIP_ITEM));

        l.product_kind = ProductKind::Service;
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.discount_code.as_deref(), Some(DISCOUNT_VIP_SERVICE));
    }

    #[test]
    fn vip_on_voucher_kind_falls_through() {
        let mut l = line();
        l.vip_discount = dec!(20000);
        l.voucher_paid = dec!(50000);
        l.product_kind = ProductKind::Voucher;
        // VIP branch has no voucher arm; the voucher branch claims it via
        // the non-gift voucher arms, which also skip voucher kind, so the
        // chain lands on passthrough.
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.branch, DiscountBranch::Passthrough);
    }

    #[test]
    fn voucher_paid_gift_line_takes_gift_code() {
        let mut l = line();
        l.unit_price = Decimal::ZERO;
        l.line_revenue = Decimal::ZERO;
        l.voucher_paid = dec!(50000);
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.discount_code.as_deref(), Some(DISCOUNT_VOUCHER_GIFT));
    }

    #[test]
    fn voucher_paid_picks_code_by_kind() {
        let mut l = line();
        l.voucher_paid = dec!(50000);
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.discount_code.as_deref(), Some(DISCOUNT_VOUCHER_ITEM));

        l.product_kind = ProductKind::Service;
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.discount_code.as_deref(), Some(DISCOUNT_VOUCHER_SERVICE));
    }

    #[test]
    fn trade_discount_precedes_promotion_code() {
        let mut l = line();
        l.discount_amount = dec!(10000);
        l.promotion_code = Some("KM01-T3".into());
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.branch, DiscountBranch::Trade);
        assert_eq!(codes.discount_code.as_deref(), Some(DISCOUNT_TRADE_ITEM));
    }

    #[test]
    fn promotion_code_alone_claims_trade_codes() {
        let mut l = line();
        l.promotion_code = Some("KM01-T3".into());
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.branch, DiscountBranch::PromotionCode);
        assert_eq!(codes.discount_code.as_deref(), Some(DISCOUNT_TRADE_ITEM));

        l.product_kind = ProductKind::Service;
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.discount_code.as_deref(), Some(DISCOUNT_TRADE_SERVICE));
    }

    #[test]
    fn bare_line_passes_legacy_values_through() {
        let l = line();
        let codes = resolve_account_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(codes.branch, DiscountBranch::Passthrough);
        assert_eq!(codes.discount_code.as_deref(), Some("CKLEGACY"));
        assert_eq!(codes.cost_account_code.as_deref(), Some("632"));
        assert_eq!(codes.fee_code.as_deref(), Some("641"));
    }

    #[test]
    fn loyalty_promotion_code_comes_from_company_table() {
        let l = line();
        let d = dept();
        let mut c = ctx(OrderCategory::LoyaltyPointExchange, &l);
        c.department = Some(&d);
        let promos = resolve_promotion_codes(&c);
        assert_eq!(promos.promotion_code.as_deref(), Some("DOIDIEM.KA"));
        assert!(promos.gift_promotion_code.is_none());
    }

    #[test]
    fn loyalty_promotion_code_defaults_when_unmapped() {
        let l = line();
        let promos = resolve_promotion_codes(&ctx(OrderCategory::LoyaltyPointExchange, &l));
        assert_eq!(promos.promotion_code.as_deref(), Some(LOYALTY_PROMO_DEFAULT));
    }

    #[test]
    fn legacy_prefix_is_rewritten_and_suffix_skipped() {
        let mut l = line();
        l.promotion_code = Some("CTKM05-T3".into());
        let promos = resolve_promotion_codes(&ctx(OrderCategory::Normal, &l));
        // prefix swapped, leading segment kept, no ".I" appended
        assert_eq!(promos.promotion_code.as_deref(), Some("KM05"));
    }

    #[test]
    fn gift_lines_get_cut_code_without_suffix() {
        let mut l = line();
        l.unit_price = Decimal::ZERO;
        l.line_revenue = Decimal::ZERO;
        l.promotion_code = Some("KMQT.I-T3".into());
        let promos = resolve_promotion_codes(&ctx(OrderCategory::Normal, &l));
        assert!(promos.promotion_code.is_none());
        assert_eq!(promos.gift_promotion_code.as_deref(), Some("KMQT"));
    }

    #[test]
    fn regular_lines_get_segment_plus_suffix() {
        let mut l = line();
        l.promotion_code = Some("KM01-T3-EXTRA".into());
        let promos = resolve_promotion_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(promos.promotion_code.as_deref(), Some("KM01.I"));
    }

    #[test]
    fn suffix_appending_is_idempotent() {
        let once = ensure_type_suffix("KM01", ProductKind::Item);
        assert_eq!(once, "KM01.I");
        let twice = ensure_type_suffix(&once, ProductKind::Item);
        assert_eq!(twice, "KM01.I");
        // an existing suffix of another kind is also left alone
        assert_eq!(ensure_type_suffix("KM01.S", ProductKind::Item), "KM01.S");
    }

    #[test]
    fn empty_promotion_code_yields_nothing() {
        let mut l = line();
        l.promotion_code = Some("   ".into());
        let promos = resolve_promotion_codes(&ctx(OrderCategory::Normal, &l));
        assert_eq!(promos, PromotionCodes::default());
    }

    #[test]
    fn voucher_code_for_marketplace_customers_is_brand_fixed() {
        let mut l = line();
        l.voucher_paid = dec!(50000);
        let mut c = ctx(OrderCategory::Normal, &l);
        c.customer_channel = Some("Shopee");
        assert_eq!(
            resolve_voucher_code(&c, Some("VC50".into())).as_deref(),
            Some("VCTMDT.KA")
        );

        l.brand = "KZ".into();
        let mut c = ctx(OrderCategory::Normal, &l);
        c.customer_channel = Some("Lazada");
        assert_eq!(
            resolve_voucher_code(&c, None).as_deref(),
            Some(ECOM_VOUCHER_DEFAULT)
        );
    }

    #[test]
    fn voucher_code_falls_back_to_collaborator_value() {
        let mut l = line();
        l.voucher_paid = dec!(50000);
        let c = ctx(OrderCategory::Normal, &l);
        assert_eq!(resolve_voucher_code(&c, Some("VC50".into())).as_deref(), Some("VC50"));
    }

    #[test]
    fn no_voucher_amount_means_no_voucher_code() {
        let l = line();
        let mut c = ctx(OrderCategory::Normal, &l);
        c.customer_channel = Some("Shopee");
        assert!(resolve_voucher_code(&c, Some("VC50".into())).is_none());
    }

    #[test]
    fn transaction_type_for_exchange_depends_on_sign() {
        assert_eq!(
            resolve_transaction_type(OrderCategory::NormalExchange, ProductKind::Item, dec!(-1)),
            "11"
        );
        assert_eq!(
            resolve_transaction_type(OrderCategory::NormalExchange, ProductKind::Item, dec!(1)),
            "12"
        );
        assert_eq!(
            resolve_transaction_type(OrderCategory::CardSeparation, ProductKind::Service, dec!(2)),
            "12"
        );
    }

    #[test]
    fn transaction_type_defaults_to_01() {
        assert_eq!(
            resolve_transaction_type(OrderCategory::Service, ProductKind::Service, dec!(1)),
            "01"
        );
        assert_eq!(
            resolve_transaction_type(OrderCategory::Normal, ProductKind::Item, dec!(2)),
            "01"
        );
    }

    #[test]
    fn card_separation_forces_department_warehouse() {
        let d = dept();
        assert_eq!(
            resolve_warehouse_code(OrderCategory::CardSeparation, Some(&d), Some("K009"), Some("K001")),
            "BD01"
        );
    }

    #[test]
    fn warehouse_prefers_movement_then_line_then_empty() {
        assert_eq!(
            resolve_warehouse_code(OrderCategory::Normal, None, Some("K009"), Some("K001")),
            "K009"
        );
        assert_eq!(
            resolve_warehouse_code(OrderCategory::Normal, None, None, Some("K001")),
            "K001"
        );
        assert_eq!(resolve_warehouse_code(OrderCategory::Normal, None, None, None), "");
    }

    #[test]
    fn slots_carry_amounts_and_winning_code() {
        let mut l = line();
        l.vip_discount = dec!(20000);
        l.voucher_paid = dec!(50000);
        l.discount_amount = dec!(10000);
        let c = ctx(OrderCategory::Normal, &l);
        let codes = resolve_account_codes(&c);
        let slots = compose_discount_slots(&c, &codes);
        // VIP branch wins, its code lands in the VIP slot
        assert_eq!(slots.get(SLOT_VIP).code.as_deref(), Some(DISCOUNT_VIP_ITEM));
        assert_eq!(slots.get(SLOT_VIP).amount, dec!(20000));
        assert_eq!(slots.get(SLOT_VOUCHER).amount, dec!(50000));
        assert!(slots.get(SLOT_VOUCHER).code.is_none());
        assert_eq!(slots.get(SLOT_TRADE).amount, dec!(10000));
    }

    #[test]
    fn passthrough_code_lands_in_carryover_slot() {
        let l = line();
        let c = ctx(OrderCategory::Normal, &l);
        let codes = resolve_account_codes(&c);
        let slots = compose_discount_slots(&c, &codes);
        assert_eq!(slots.get(SLOT_CARRYOVER).code.as_deref(), Some("CKLEGACY"));
        assert_eq!(slots.get(SLOT_CARRYOVER).amount, Decimal::ZERO);
    }
}

use serde::{Deserialize, Serialize};
use strum::Display;

/// Canonical order category assigned from the free-text order-type label.
///
/// `NormalAccountTransfer` and `NormalEcommerce` are the account/e-commerce
/// variants of a plain sale; partial-fulfillment reallocation applies to the
/// whole normal family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum OrderCategory {
    Normal,
    NormalAccountTransfer,
    NormalEcommerce,
    NormalExchange,
    Service,
    LoyaltyPointExchange,
    BirthdayGift,
    Investment,
    CardSeparation,
    BottleExchange,
    SaleReturn,
}

impl OrderCategory {
    /// Plain sale plus its account-transfer and e-commerce variants.
    pub fn is_normal_family(self) -> bool {
        matches!(
            self,
            OrderCategory::Normal
                | OrderCategory::NormalAccountTransfer
                | OrderCategory::NormalEcommerce
        )
    }
}

/// Classification result: the primary category plus the derived service
/// predicate, which is not mutually exclusive with the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: OrderCategory,
    pub is_service: bool,
}

/// Legacy label still emitted by older tills; not a category of its own but
/// counts as a service transaction.
const LEGACY_SERVICE_LABEL: &str = "Làm DV";

/// Label variants per category, evaluated top to bottom, first match wins.
///
/// The order is load-bearing: card-separation and exchange labels both
/// contain the "DV" fragment, so card separation must be tested first.
/// New spelling variants are additive entries in the matching row.
const CLASSIFICATION_TABLE: &[(&[&str], OrderCategory)] = &[
    (
        &[
            "06. Tách thẻ DV",
            "6. Tách thẻ DV",
            "Tách thẻ DV",
            "06. Tach the DV",
        ],
        OrderCategory::CardSeparation,
    ),
    (
        &[
            "05. Đổi hàng DV",
            "5. Đổi hàng DV",
            "Đổi hàng DV",
            "05. Doi hang DV",
        ],
        OrderCategory::NormalExchange,
    ),
    (
        &[
            "07. Làm dịch vụ",
            "7. Làm dịch vụ",
            "Làm dịch vụ",
            "07. Lam dich vu",
        ],
        OrderCategory::Service,
    ),
    (
        &["03. Đổi điểm", "3. Đổi điểm", "Đổi điểm", "03. Doi diem"],
        OrderCategory::LoyaltyPointExchange,
    ),
    (
        &[
            "04. Quà sinh nhật",
            "4. Quà sinh nhật",
            "Quà sinh nhật",
            "04. Qua sinh nhat",
        ],
        OrderCategory::BirthdayGift,
    ),
    (
        &["09. Đầu tư", "9. Đầu tư", "Đầu tư", "09. Dau tu"],
        OrderCategory::Investment,
    ),
    (
        &["08. Đổi vỏ", "8. Đổi vỏ", "Đổi vỏ", "08. Doi vo"],
        OrderCategory::BottleExchange,
    ),
    (
        &["10. Trả hàng", "Trả hàng", "Hàng trả lại", "10. Tra hang"],
        OrderCategory::SaleReturn,
    ),
    (
        &[
            "02. Bán hàng chuyển khoản",
            "2. Bán hàng chuyển khoản",
            "Bán hàng chuyển khoản",
            "Bán hàng CK",
        ],
        OrderCategory::NormalAccountTransfer,
    ),
    (
        &[
            "11. Bán hàng TMĐT",
            "Bán hàng TMĐT",
            "Ban hang TMDT",
            "Bán hàng online",
        ],
        OrderCategory::NormalEcommerce,
    ),
    (
        &["01. Bán hàng", "1. Bán hàng", "Bán hàng", "01. Ban hang"],
        OrderCategory::Normal,
    ),
];

/// Maps a free-text order-type label to its canonical category. Unknown
/// labels fall back to `Normal`.
pub fn classify(label: &str) -> Classification {
    let normalized = label.trim();
    let category = CLASSIFICATION_TABLE
        .iter()
        .find(|(variants, _)| variants.contains(&normalized))
        .map(|(_, category)| *category)
        .unwrap_or(OrderCategory::Normal);
    Classification {
        category,
        is_service: derive_is_service(normalized, category),
    }
}

/// Derived service predicate: true for service labels, for the two
/// service-adjacent categories, and for one legacy label that classifies
/// as `Normal` but still denotes service work.
fn derive_is_service(label: &str, category: OrderCategory) -> bool {
    matches!(
        category,
        OrderCategory::Service | OrderCategory::NormalExchange | OrderCategory::CardSeparation
    ) || label == LEGACY_SERVICE_LABEL
}

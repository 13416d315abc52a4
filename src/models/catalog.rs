use serde::{Deserialize, Serialize};

/// Catalog reference record for one item code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_code: String,
    /// Unit of measure; a line whose catalog item has no unit cannot be
    /// submitted
    #[serde(default)]
    pub unit: String,
    /// Free-text product category; drives lot-code truncation families
    #[serde(default)]
    pub product_category: String,
    #[serde(default)]
    pub track_batch: bool,
    #[serde(default)]
    pub track_serial: bool,
    /// Material code in the accounting system; falls back to the item code
    #[serde(default)]
    pub material_code: Option<String>,
}

/// Department/branch reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub branch_code: String,
    /// Company code of the owning warehouse, keys the loyalty promotion
    /// lookup
    pub warehouse_company_code: String,
    pub department_code: String,
}

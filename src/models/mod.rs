pub mod audit;
pub mod catalog;
pub mod document;
pub mod order;
pub mod resolved;

pub use audit::{SyncAudit, SyncStatus};
pub use catalog::{CatalogItem, Department};
pub use document::{
    AccountingDocument, CustomerDocument, DocumentHeader, DocumentLine, DocumentType,
    PaymentDocument, SummaryLine,
};
pub use order::{CustomerInfo, Fulfillment, PaymentRecord, ProductKind, SaleLine, SaleOrder};
pub use resolved::{DiscountSlot, DiscountSlots, ResolvedLine, DISCOUNT_SLOT_COUNT};

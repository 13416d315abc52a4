//! Collaborator interfaces consumed by the core, with their HTTP
//! implementations.

pub mod auth;
pub mod gateway;
pub mod retail;

pub use auth::AuthTokenProvider;
pub use gateway::{message_signals_duplicate, AccountingGateway, GatewayResponse, HttpAccountingGateway};
pub use retail::{
    CatalogLookup, DenominationVoucherCalculator, DepartmentLookup, OrderSource,
    PaymentRecordSource, ReferenceCache, RetailApiClient, VoucherCodeCalculator,
};

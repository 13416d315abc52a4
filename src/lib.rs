//! possync-api: bridge between a retail point-of-sale platform and an
//! external accounting system.
//!
//! Orders are fetched from the upstream retail API, classified by order
//! type, resolved line by line into accounting fields, and submitted as
//! derived documents (customer, sales order, sales invoices split by
//! fulfillment date, payments, warehouse movements). Every attempt leaves
//! exactly one audit record.

use std::sync::Arc;

pub mod clients;
pub mod config;
pub mod db;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

/// Shared application state for the HTTP surface.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub sync: Arc<services::sync::SyncService>,
}

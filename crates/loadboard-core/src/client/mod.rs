//! Client boundary to the host application's REST API.
//!
//! [`RecordStore`] is the seam the batch processor and the mirror talk to.
//! [`HttpRecordStore`] implements it over HTTP; tests substitute an in-memory
//! double.
//!
//! Contract shared by every implementation:
//!
//! - a missing anti-forgery token fails the call before any I/O
//!   ([`LoadboardError::MissingToken`](crate::LoadboardError::MissingToken))
//! - a non-2xx status is an error
//! - the cancel endpoints succeed on any 2xx without needing a body
//! - every other endpoint must answer with parsable JSON

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::Result,
    models::{Driver, Order, OrderRef, WorkOpportunity},
};

pub mod http;
pub mod token;

pub use http::HttpRecordStore;
pub use token::{PageToken, StaticToken, TokenSource};

/// Read/write operations on the host's orders, drivers, and work
/// opportunities.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Cancels a single order at the given version.
    async fn cancel_order(&self, order: &OrderRef) -> Result<()>;

    /// Cancels several orders in one call; the outcome is all-or-nothing.
    async fn cancel_orders(&self, orders: &[OrderRef]) -> Result<()>;

    /// Creates or updates an order. A payload without identity fields creates
    /// a new order.
    async fn upsert_order(&self, payload: &Value) -> Result<Value>;

    /// Lists the currently posted orders.
    async fn fetch_orders(&self) -> Result<Vec<Order>>;

    /// Lists the carrier's drivers.
    async fn fetch_drivers(&self) -> Result<Vec<Driver>>;

    /// Lists the work opportunities currently offered.
    async fn search_work_opportunities(&self) -> Result<Vec<WorkOpportunity>>;
}

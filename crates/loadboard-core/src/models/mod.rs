//! Data models for orders, drivers, and work opportunities.
//!
//! These mirror the JSON shapes the host application uses (camelCase keys),
//! so the same types are used for the remote API, the local mirror, and the
//! notification payloads. Display implementations live in
//! [`crate::display`].

pub mod driver;
pub mod opportunity;
pub mod order;
pub mod progress;
pub mod status;

#[cfg(test)]
pub(crate) mod fixtures;

pub use driver::Driver;
pub use opportunity::WorkOpportunity;
pub use order::{Distance, Money, Order, OrderRef, Rate, IDENTITY_KEYS, MAX_DRIVERS};
pub use progress::Progress;
pub use status::{DriverType, OrderAction};

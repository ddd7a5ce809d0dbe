//! Core library for bulk order management on a freight loadboard.
//!
//! The crate deletes, modifies, and clones posted truck-capacity orders in
//! bulk through the host's REST API, one record or batch at a time, and
//! reports progress through an in-process notification channel. A local
//! SQLite mirror keeps the last known orders, drivers, and work opportunities
//! for listing and selection.
//!
//! - [`processor`]: the sequential batch processor
//! - [`changes`]: sparse change sets and their application to orders
//! - [`notify`]: progress and completion events
//! - [`client`]: the record store seam and its HTTP implementation
//! - [`mirror`]: the local mirror
//! - [`display`]: terminal formatting
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use loadboard_core::{BatchRequest, ChangeSet, LoadboardBuilder, OrderAction, OrderEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loadboard = LoadboardBuilder::new()
//!     .with_database_path(Some("mirror.db"))
//!     .with_csrf_token(Some("token".to_string()))
//!     .build()
//!     .await?;
//!
//! loadboard.refresh_mirror().await?;
//! let orders = loadboard.orders().await?;
//!
//! let mut events = loadboard.notifier().subscribe();
//! let changes = ChangeSet {
//!     min_payout: Some("750".to_string()),
//!     ..ChangeSet::default()
//! };
//! let request = BatchRequest::new(OrderAction::Modify, orders).with_changes(changes);
//! let outcome = loadboard.run(&request).await?;
//!
//! while let Ok(event) = events.try_recv() {
//!     if let OrderEvent::Progress { progress, .. } = event {
//!         println!("{} of {}", progress.processed(), progress.total);
//!     }
//! }
//! println!("{} modified, {} failed", outcome.progress.completed, outcome.progress.failed);
//! # Ok(())
//! # }
//! ```

pub mod changes;
pub mod client;
pub mod db;
pub mod display;
pub mod error;
pub mod loadboard;
pub mod mirror;
pub mod models;
pub mod notify;
pub mod params;
pub mod post_truck;
pub mod processor;
pub mod region;

// Re-export commonly used types
pub use changes::{ChangeSet, DriverDirective};
pub use client::{HttpRecordStore, PageToken, RecordStore, StaticToken, TokenSource};
pub use db::Database;
pub use display::{ChangesSummary, Drivers, OperationStatus, Orders, ProgressLine, WorkOpportunities};
pub use error::{LoadboardError, Result};
pub use loadboard::{Loadboard, LoadboardBuilder};
pub use mirror::{Mirror, MirrorKey, RefreshSummary};
pub use models::{Driver, DriverType, Order, OrderAction, OrderRef, Progress, WorkOpportunity};
pub use notify::{Notifier, OrderEvent};
pub use params::{BatchRequest, PostTruck, SelectOrders};
pub use processor::{BatchOutcome, BatchProcessor, BatchSettings};
pub use region::{DistanceUnit, DomainInfo, Region};

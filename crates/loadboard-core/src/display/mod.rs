//! Display formatting for terminal output.
//!
//! Domain types get their `Display` implementations here rather than next to
//! their definitions. Collections and operation results are wrapped in
//! newtypes so each output context decides its own framing:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrapper Types   │    │   Markdown      │
//! │ (Order, Driver) │───▶│ (Orders,        │───▶│   Output        │
//! │                 │    │  ChangesSummary)│    │  (Terminal)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! - [`collections`]: lists of orders, drivers, and work opportunities
//! - [`summary`]: the changes a modify or clone is about to apply
//! - [`progress`]: live and final batch progress lines
//! - [`status`]: one-line success/error confirmations
//! - [`datetime`]: timestamps in a chosen zone
//!
//! ```rust
//! use loadboard_core::{display::ProgressLine, models::Progress};
//!
//! let mut progress = Progress::new(4);
//! progress.completed = 1;
//! progress.failed = 1;
//! assert_eq!(ProgressLine(progress).to_string(), "Processing: 2 of 4");
//! ```

pub mod collections;
pub mod datetime;
pub mod progress;
pub mod status;
pub mod summary;

pub use collections::{Drivers, Orders, WorkOpportunities};
pub use datetime::LocalDateTime;
pub use progress::{ProgressBar, ProgressLine};
pub use status::OperationStatus;
pub use summary::ChangesSummary;

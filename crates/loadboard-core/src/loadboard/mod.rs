//! High-level service API for bulk order management.
//!
//! [`Loadboard`] ties the pieces together: the record store client, the
//! notification channel, the batch processor, and the local mirror. It is
//! built once by [`LoadboardBuilder`] and shared by reference.
//!
//! ```text
//! ┌─────────────┐  request   ┌──────────────┐   calls   ┌──────────────┐
//! │  Front end  │──────────▶│ BatchProcessor│─────────▶│ RecordStore  │
//! │ (CLI, page) │◀──────────│              │           │   (HTTP)     │
//! └─────────────┘  events    └──────┬───────┘           └──────────────┘
//!                                   │ refresh
//!                                   ▼
//!                             ┌──────────┐
//!                             │  Mirror  │
//!                             └──────────┘
//! ```
//!
//! A front end either awaits [`Loadboard::run`] directly, or starts
//! [`Loadboard::spawn_dispatcher`] once and afterwards only talks through the
//! [`Notifier`]: [`Loadboard::submit`] a request, then watch the progress and
//! terminal events.
//!
//! ```rust,no_run
//! use loadboard_core::{params::SelectOrders, BatchRequest, LoadboardBuilder, OrderAction};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loadboard = LoadboardBuilder::new()
//!     .with_base_url(Some("https://relay.amazon.com".to_string()))
//!     .with_csrf_token(Some("token".to_string()))
//!     .build()
//!     .await?;
//!
//! loadboard.refresh_mirror().await?;
//! let orders = loadboard
//!     .select_orders(&SelectOrders { ids: vec!["o-1".into()], all: false })
//!     .await?;
//! let outcome = loadboard
//!     .run(&BatchRequest::new(OrderAction::Delete, orders))
//!     .await?;
//! println!("{} deleted", outcome.progress.completed);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use jiff::tz::TimeZone;
use log::{info, warn};
use serde_json::Value;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};

use crate::{
    client::RecordStore,
    error::{LoadboardError, Result},
    mirror::{Mirror, MirrorKey, RefreshSummary},
    models::{Driver, Order, WorkOpportunity},
    notify::{Notifier, OrderEvent},
    params::{BatchRequest, PostTruck, SelectOrders},
    post_truck,
    processor::{BatchOutcome, BatchProcessor},
    region::DomainInfo,
};

pub mod builder;


pub use builder::LoadboardBuilder;

/// Main service interface. Cloning shares the store, channel, guard, and
/// mirror.
#[derive(Clone)]
pub struct Loadboard {
    store: Arc<dyn RecordStore>,
    notifier: Notifier,
    processor: BatchProcessor,
    mirror: Mirror,
    domain: DomainInfo,
}

impl Loadboard {
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn processor(&self) -> &BatchProcessor {
        &self.processor
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Region and units implied by the configured host.
    pub fn domain(&self) -> DomainInfo {
        self.domain
    }

    /// Zone civil date-times are read and shown in.
    pub fn time_zone(&self) -> &TimeZone {
        &self.processor.settings().time_zone
    }

    /// Runs a batch operation and waits for it to finish. Events are emitted
    /// on [`Self::notifier`] as it goes.
    pub async fn run(&self, request: &BatchRequest) -> Result<BatchOutcome> {
        self.processor.run(request).await
    }

    /// Validates `request` and hands it to a running dispatcher as a request
    /// event. Without a dispatcher the request is dropped.
    pub fn submit(&self, request: BatchRequest) -> Result<()> {
        request.validate()?;
        self.notifier
            .emit_request(request.action, request.orders, request.changes);
        Ok(())
    }

    /// Starts a task that runs every request event as a batch operation.
    ///
    /// Each request runs on its own task so the dispatcher keeps listening.
    /// A request that arrives while another batch is running gets a
    /// [`OrderEvent::Rejected`] event; the running batch's own terminal event
    /// is the only success or error listeners see. The dispatcher runs until
    /// its handle is aborted.
    pub fn spawn_dispatcher(&self) -> JoinHandle<()> {
        let mut events = self.notifier.subscribe();
        let processor = self.processor.clone();
        let notifier = self.notifier.clone();

        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Dispatcher skipped {skipped} events");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let OrderEvent::Request {
                    action,
                    orders,
                    changes,
                } = event
                else {
                    continue;
                };

                let processor = processor.clone();
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    let request = BatchRequest {
                        action,
                        orders,
                        changes,
                    };
                    if let Err(e) = processor.run(&request).await {
                        warn!("Rejected {action} request: {e}");
                        notifier.emit_rejected(action, e.to_string());
                    }
                });
            }
        })
    }

    /// Re-reads orders, drivers, and work opportunities from the host.
    pub async fn refresh_mirror(&self) -> Result<RefreshSummary> {
        self.mirror.refresh(self.store.as_ref()).await
    }

    /// Stores a captured host response in the mirror.
    pub async fn ingest(&self, url: &str, body: Value) -> Result<Option<MirrorKey>> {
        self.mirror.ingest(url, body).await
    }

    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.mirror.orders().await
    }

    /// Active drivers only.
    pub async fn drivers(&self) -> Result<Vec<Driver>> {
        self.mirror.drivers().await
    }

    pub async fn work_opportunities(&self) -> Result<Vec<WorkOpportunity>> {
        self.mirror.work_opportunities().await
    }

    /// Picks mirrored orders by id, or all of them.
    pub async fn select_orders(&self, selection: &SelectOrders) -> Result<Vec<Order>> {
        let orders = self.mirror.orders().await?;
        selection.resolve(&orders)
    }

    /// Posts a truck for a mirrored work opportunity and returns the host's
    /// response.
    ///
    /// # Errors
    ///
    /// Returns `LoadboardError::InvalidInput` when the opportunity is not in
    /// the mirror or the form cannot be read, and the store's error when the
    /// upsert fails.
    pub async fn post_truck(&self, form: &PostTruck) -> Result<Value> {
        let opportunities = self.mirror.work_opportunities().await?;
        let opportunity = opportunities
            .iter()
            .find(|item| item.id == form.work_opportunity_id)
            .ok_or_else(|| {
                LoadboardError::invalid_input("workOpportunityId").with_reason(format!(
                    "Work opportunity {} is not in the mirror",
                    form.work_opportunity_id
                ))
            })?;

        let payload = post_truck::new_order_payload(opportunity, form, self.domain)?;
        let response = self.store.upsert_order(&payload).await?;
        info!("Posted truck for work opportunity {}", opportunity.id);
        Ok(response)
    }
}

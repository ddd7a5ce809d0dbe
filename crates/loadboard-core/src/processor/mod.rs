//! Sequential batch processor for bulk order operations.
//!
//! A [`BatchProcessor`] runs one [`BatchRequest`] at a time against a
//! [`RecordStore`], reporting through a [`Notifier`]:
//!
//! ```text
//! request ──▶ validate ──▶ guard ──▶ steps ──▶ progress × n ──▶ success | error
//!                                       │                           │
//!                                       └── store call per step     └── mirror refresh
//! ```
//!
//! Deletes are sent as batch cancels of up to [`BatchSettings::batch_size`]
//! orders; each batch succeeds or fails as a whole. Modify and clone send one
//! upsert per order, strictly in order. Steps are spaced by
//! [`BatchSettings::step_delay`] to keep the host's rate limits happy.
//!
//! Per-record failures are counted, never propagated, and never retried. A
//! panic inside a step marks every record not yet confirmed as failed and the
//! batch still ends with exactly one terminal event.

use std::{
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use futures::FutureExt;
use jiff::tz::TimeZone;
use log::{debug, error, info, warn};
use tokio::time;

use crate::{
    changes::ChangeSet,
    client::RecordStore,
    error::{LoadboardError, Result},
    mirror::Mirror,
    models::{Order, OrderAction, OrderRef, Progress},
    notify::Notifier,
    params::BatchRequest,
};


/// Orders per batch cancel call.
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Pause between consecutive store calls.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(600);
/// Pause between a successful batch and the mirror refresh.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1500);

/// Tunables for a [`BatchProcessor`].
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub step_delay: Duration,
    pub refresh_delay: Duration,
    /// Zone civil date-times in change sets are read in
    pub time_zone: TimeZone,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            step_delay: DEFAULT_STEP_DELAY,
            refresh_delay: DEFAULT_REFRESH_DELAY,
            time_zone: TimeZone::system(),
        }
    }
}

/// What a finished batch operation did.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub action: OrderAction,
    /// Final counters, with `is_complete` set
    pub progress: Progress,
    /// Ids of the orders that were not processed successfully
    pub failed_ids: Vec<String>,
}

impl BatchOutcome {
    /// True when at least one order went through.
    pub fn succeeded(&self) -> bool {
        self.progress.completed > 0
    }
}

/// Clears the in-flight flag when the running batch ends, however it ends.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>, action: OrderAction) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LoadboardError::BatchInProgress { action })?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Running counters plus the ids that failed.
struct Tally {
    progress: Progress,
    failed_ids: Vec<String>,
}

impl Tally {
    fn new(total: usize) -> Self {
        Self {
            progress: Progress::new(total),
            failed_ids: Vec::new(),
        }
    }

    fn succeed(&mut self, count: usize) {
        self.progress.completed += count;
    }

    fn fail<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.progress.failed += 1;
            self.failed_ids.push(id.to_string());
        }
    }
}

/// Runs batch operations against a record store.
#[derive(Clone)]
pub struct BatchProcessor {
    store: Arc<dyn RecordStore>,
    notifier: Notifier,
    settings: BatchSettings,
    mirror: Option<Mirror>,
    in_flight: Arc<AtomicBool>,
}

impl BatchProcessor {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Notifier, settings: BatchSettings) -> Self {
        Self {
            store,
            notifier,
            settings,
            mirror: None,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Keeps `mirror` in step with successful batches.
    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Whether a batch operation is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one batch operation to completion.
    ///
    /// Every order is attempted exactly once. Progress is emitted after each
    /// step and exactly one terminal event ends the batch. The processor is
    /// free again before that event goes out, so the mirror sync that follows
    /// a success never blocks the next batch.
    ///
    /// # Errors
    ///
    /// * `LoadboardError::InvalidInput` - When the request fails validation;
    ///   no event is emitted
    /// * `LoadboardError::BatchInProgress` - When another batch is running on
    ///   this processor; no event is emitted
    pub async fn run(&self, request: &BatchRequest) -> Result<BatchOutcome> {
        request.validate()?;
        let guard = InFlightGuard::acquire(&self.in_flight, request.action)?;

        let action = request.action;
        info!("Starting {action} of {} orders", request.orders.len());

        let tally = match action {
            OrderAction::Delete => self.process_deletes(&request.orders).await,
            OrderAction::Modify | OrderAction::Clone => {
                let changes = request.changes_or_default();
                self.process_upserts(action, &request.orders, &changes)
                    .await
            }
        };
        drop(guard);

        Ok(self.complete(action, &request.orders, tally).await)
    }

    async fn process_deletes(&self, orders: &[Order]) -> Tally {
        let action = OrderAction::Delete;
        let mut tally = Tally::new(orders.len());
        let batch_size = self.settings.batch_size.max(1);
        let batches: Vec<&[Order]> = orders.chunks(batch_size).collect();

        for (index, batch) in batches.iter().enumerate() {
            let refs: Vec<OrderRef> = batch.iter().map(Order::reference).collect();
            let ids = batch.iter().map(|order| order.id.as_str());
            debug!("Cancelling batch {} of {}", index + 1, batches.len());

            match AssertUnwindSafe(self.store.cancel_orders(&refs))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => tally.succeed(batch.len()),
                Ok(Err(e)) => {
                    warn!("Failed to cancel batch {}: {e}", index + 1);
                    tally.fail(ids);
                }
                Err(_) => {
                    error!("Unexpected fault while cancelling batch {}", index + 1);
                    let unconfirmed = batches[index..]
                        .iter()
                        .flat_map(|batch| batch.iter())
                        .map(|order| order.id.as_str());
                    tally.fail(unconfirmed);
                    self.notifier.emit_progress(action, tally.progress);
                    return tally;
                }
            }

            self.notifier.emit_progress(action, tally.progress);
            if index + 1 < batches.len() {
                time::sleep(self.settings.step_delay).await;
            }
        }

        tally
    }

    async fn process_upserts(
        &self,
        action: OrderAction,
        orders: &[Order],
        changes: &ChangeSet,
    ) -> Tally {
        let mut tally = Tally::new(orders.len());

        for (index, order) in orders.iter().enumerate() {
            match AssertUnwindSafe(self.upsert_one(action, order, changes))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => tally.succeed(1),
                Ok(Err(e)) => {
                    warn!("Failed to {action} order {}: {e}", order.id);
                    tally.fail([order.id.as_str()]);
                }
                Err(_) => {
                    error!("Unexpected fault while processing order {}", order.id);
                    tally.fail(orders[index..].iter().map(|order| order.id.as_str()));
                    self.notifier.emit_progress(action, tally.progress);
                    return tally;
                }
            }

            self.notifier.emit_progress(action, tally.progress);
            if index + 1 < orders.len() {
                time::sleep(self.settings.step_delay).await;
            }
        }

        tally
    }

    /// One modify or clone step. A change set that cannot be coerced fails
    /// the record before anything is sent.
    async fn upsert_one(
        &self,
        action: OrderAction,
        order: &Order,
        changes: &ChangeSet,
    ) -> Result<()> {
        let tz = &self.settings.time_zone;
        let payload = match action {
            OrderAction::Clone => changes.clone_payload(order, tz)?,
            _ => serde_json::to_value(changes.apply(order, tz)?)?,
        };
        self.store.upsert_order(&payload).await?;
        debug!("{action} of order {} accepted", order.id);
        Ok(())
    }

    async fn complete(&self, action: OrderAction, orders: &[Order], tally: Tally) -> BatchOutcome {
        let progress = tally.progress.finished();
        let outcome = BatchOutcome {
            action,
            progress,
            failed_ids: tally.failed_ids,
        };

        if progress.completed > 0 {
            info!(
                "{action} finished: {} succeeded, {} failed",
                progress.completed, progress.failed
            );
            self.notifier.emit_success(action, progress);
            self.sync_mirror(&outcome, orders).await;
        } else if progress.failed > 0 {
            let message = failure_message(action, progress.failed);
            warn!("{message}");
            self.notifier.emit_error(action, message);
        }

        outcome
    }

    /// Brings the mirror in line with the host after a successful batch.
    /// Mirror problems never change the outcome.
    async fn sync_mirror(&self, outcome: &BatchOutcome, orders: &[Order]) {
        let Some(mirror) = &self.mirror else {
            return;
        };

        if outcome.action == OrderAction::Delete {
            let cancelled: Vec<String> = orders
                .iter()
                .filter(|order| !outcome.failed_ids.contains(&order.id))
                .map(|order| order.id.clone())
                .collect();
            if let Err(e) = mirror.remove_orders(cancelled).await {
                warn!("Failed to drop cancelled orders from the mirror: {e}");
            }
        }

        time::sleep(self.settings.refresh_delay).await;
        if let Err(e) = mirror.refresh(self.store.as_ref()).await {
            warn!("Mirror refresh after {} failed: {e}", outcome.action);
        }
    }
}

/// Terminal error text for a batch where nothing succeeded.
pub fn failure_message(action: OrderAction, failed: usize) -> String {
    let plural = if failed == 1 { "" } else { "s" };
    format!("Failed to {action} {failed} order{plural}")
}

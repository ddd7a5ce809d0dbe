//! Command handlers.
//!
//! Each handler calls one [`Loadboard`] operation and renders its result.
//! Batch commands additionally show the changes about to be applied, follow
//! the progress events while the batch runs, and print the final status.

use std::{fs, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use loadboard_core::{
    display::{Drivers, Orders, WorkOpportunities},
    params::{PostTruck, SelectOrders},
    BatchRequest, ChangeSet, ChangesSummary, Loadboard, MirrorKey, OperationStatus, OrderAction,
    OrderEvent,
};
use log::{debug, warn};
use serde_json::Value;
use tokio::{
    sync::broadcast::{error::RecvError, Receiver},
    time::timeout,
};

use crate::{
    args::{
        ClearMirrorArgs, DriverCommands, IngestArgs, MirrorCommands, OpportunityCommands,
        OrderCommands,
    },
    renderer::TerminalRenderer,
};

/// How long a batch may go without an event before a warning is logged.
const PROGRESS_WATCHDOG: Duration = Duration::from_secs(5);

pub struct Cli {
    loadboard: Loadboard,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(loadboard: Loadboard, renderer: TerminalRenderer) -> Self {
        Self {
            loadboard,
            renderer,
        }
    }

    pub async fn handle_order_command(&self, command: OrderCommands) -> Result<()> {
        match command {
            OrderCommands::List => self.list_orders().await,
            OrderCommands::Refresh => self.refresh().await,
            OrderCommands::Delete(args) => {
                self.run_batch(OrderAction::Delete, args.select.into(), None)
                    .await
            }
            OrderCommands::Modify(args) => {
                self.run_batch(
                    OrderAction::Modify,
                    args.select.into(),
                    Some(args.changes.into()),
                )
                .await
            }
            OrderCommands::Clone(args) => {
                self.run_batch(
                    OrderAction::Clone,
                    args.select.into(),
                    Some(args.changes.into()),
                )
                .await
            }
        }
    }

    pub async fn handle_driver_command(&self, command: DriverCommands) -> Result<()> {
        match command {
            DriverCommands::List => {
                let drivers = self
                    .loadboard
                    .drivers()
                    .await
                    .context("Failed to read drivers")?;
                self.renderer.render(&Drivers(drivers).to_string())
            }
        }
    }

    pub async fn handle_opportunity_command(&self, command: OpportunityCommands) -> Result<()> {
        match command {
            OpportunityCommands::List => {
                let items = self
                    .loadboard
                    .work_opportunities()
                    .await
                    .context("Failed to read work opportunities")?;
                let listing = WorkOpportunities::new(items, self.loadboard.time_zone().clone());
                self.renderer.render(&listing.to_string())
            }
            OpportunityCommands::Post(args) => self.post_truck(args.into()).await,
        }
    }

    pub async fn handle_mirror_command(&self, command: MirrorCommands) -> Result<()> {
        match command {
            MirrorCommands::Clear(args) => self.clear_mirror(args).await,
        }
    }

    pub async fn list_orders(&self) -> Result<()> {
        let orders = self
            .loadboard
            .orders()
            .await
            .context("Failed to read orders")?;
        let listing = Orders::new(orders, self.loadboard.time_zone().clone());
        self.renderer.render(&listing.to_string())
    }

    async fn refresh(&self) -> Result<()> {
        let summary = self
            .loadboard
            .refresh_mirror()
            .await
            .context("Failed to refresh mirror")?;
        self.renderer.status(&OperationStatus::success(format!(
            "Mirrored {} orders, {} drivers, {} work opportunities",
            summary.orders, summary.drivers, summary.work_opportunities
        )))
    }

    pub async fn ingest(&self, args: IngestArgs) -> Result<()> {
        let text = fs::read_to_string(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        let body: Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not JSON", args.file.display()))?;

        match self.loadboard.ingest(&args.url, body).await? {
            Some(key) => self
                .renderer
                .status(&OperationStatus::success(format!("Mirrored {key}"))),
            None => bail!("No mirror key matches {}", args.url),
        }
    }

    async fn clear_mirror(&self, args: ClearMirrorArgs) -> Result<()> {
        let mirror = self.loadboard.mirror();
        let message = match args.key {
            Some(key) => {
                if mirror.invalidate(key).await? {
                    format!("Cleared {key}")
                } else {
                    format!("Nothing mirrored under {key}")
                }
            }
            None => {
                let cleared = mirror.invalidate_all().await?;
                format!("Cleared {cleared} of {} keys", MirrorKey::ALL.len())
            }
        };
        self.renderer.status(&OperationStatus::success(message))
    }

    async fn post_truck(&self, form: PostTruck) -> Result<()> {
        let response = self
            .loadboard
            .post_truck(&form)
            .await
            .with_context(|| format!("Failed to post truck for {}", form.work_opportunity_id))?;

        let message = match response.get("id").and_then(Value::as_str) {
            Some(id) => format!(
                "Posted truck for {} as order {id}",
                form.work_opportunity_id
            ),
            None => format!("Posted truck for {}", form.work_opportunity_id),
        };
        self.renderer.status(&OperationStatus::success(message))
    }

    async fn run_batch(
        &self,
        action: OrderAction,
        selection: SelectOrders,
        changes: Option<ChangeSet>,
    ) -> Result<()> {
        let orders = self.loadboard.select_orders(&selection).await?;
        let mut request = BatchRequest::new(action, orders);
        if let Some(changes) = changes {
            request = request.with_changes(changes);
        }
        request.validate()?;

        if let Some(changes) = &request.changes {
            let summary = ChangesSummary::new(
                changes,
                action,
                request.orders.len(),
                self.loadboard.domain(),
            );
            self.renderer.render(&summary.to_string())?;
        }

        let events = self.loadboard.notifier().subscribe();
        let watcher = tokio::spawn(follow_progress(events, self.renderer.clone()));

        let outcome = match self.loadboard.run(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                watcher.abort();
                return Err(e.into());
            }
        };
        if let Err(e) = watcher.await {
            debug!("Progress watcher ended early: {e}");
        }

        let status = OperationStatus::from_outcome(&outcome);
        if !status.success {
            return Err(anyhow!(status.message));
        }
        if !outcome.failed_ids.is_empty() {
            warn!("Failed orders: {}", outcome.failed_ids.join(", "));
        }
        self.renderer.status(&status)
    }
}

/// Renders progress events until the batch reports success or failure.
async fn follow_progress(mut events: Receiver<OrderEvent>, renderer: TerminalRenderer) {
    loop {
        let event = match timeout(PROGRESS_WATCHDOG, events.recv()).await {
            Ok(Ok(event)) => event,
            Ok(Err(RecvError::Lagged(skipped))) => {
                debug!("Skipped {skipped} progress events");
                continue;
            }
            Ok(Err(RecvError::Closed)) => return,
            Err(_) => {
                warn!(
                    "No progress for {}s, still waiting",
                    PROGRESS_WATCHDOG.as_secs()
                );
                continue;
            }
        };

        match event {
            OrderEvent::Progress { progress, .. } => renderer.progress(progress),
            OrderEvent::Success { progress, .. } => {
                renderer.progress(progress);
                return;
            }
            OrderEvent::Error { .. } => return,
            OrderEvent::Request { .. } | OrderEvent::Rejected { .. } => {}
        }
    }
}

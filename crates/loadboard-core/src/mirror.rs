//! Local mirror of the host's orders, drivers, and work opportunities.
//!
//! The mirror is a read cache for the CLI and the post-a-truck form. Each key
//! holds one list that is always replaced wholesale, either by an explicit
//! [`Mirror::refresh`] against a [`RecordStore`] or by [`Mirror::ingest`] of a
//! host response captured elsewhere.
//!
//! Every call opens the database on the blocking pool; the mirror itself only
//! holds the path and is cheap to clone.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use jiff::Timestamp;
use log::{debug, info};
use serde_json::Value;
use tokio::task;

use crate::{
    client::{
        http::{DriversEnvelope, OrdersEnvelope, SearchEnvelope},
        RecordStore,
    },
    db::Database,
    error::{LoadboardError, Result},
    models::{Driver, Order, WorkOpportunity},
};

/// The lists held by the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirrorKey {
    Orders,
    Drivers,
    WorkOpportunities,
}

impl MirrorKey {
    pub const ALL: [MirrorKey; 3] = [
        MirrorKey::Orders,
        MirrorKey::Drivers,
        MirrorKey::WorkOpportunities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MirrorKey::Orders => "orders",
            MirrorKey::Drivers => "drivers",
            MirrorKey::WorkOpportunities => "workOpportunities",
        }
    }

    /// Picks the key a captured host response belongs to, by request URL.
    pub fn for_url(url: &str) -> Option<Self> {
        if url.contains("api/drivers") {
            Some(MirrorKey::Drivers)
        } else if url.contains("/api/loadboard/orders/get") {
            Some(MirrorKey::Orders)
        } else if url.contains("api/loadboard/search") {
            Some(MirrorKey::WorkOpportunities)
        } else {
            None
        }
    }
}

impl fmt::Display for MirrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MirrorKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orders" => Ok(MirrorKey::Orders),
            "drivers" => Ok(MirrorKey::Drivers),
            "workopportunities" | "work-opportunities" | "opportunities" => {
                Ok(MirrorKey::WorkOpportunities)
            }
            _ => Err(format!("Invalid mirror key: {s}")),
        }
    }
}

/// Counts written by a [`Mirror::refresh`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub orders: usize,
    pub drivers: usize,
    pub work_opportunities: usize,
}

/// Async handle on the mirror database.
#[derive(Debug, Clone)]
pub struct Mirror {
    db_path: PathBuf,
}

impl Mirror {
    /// Creates a handle. The database is opened, and its schema ensured, on
    /// each call.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            f(&db)
        })
        .await
        .map_err(LoadboardError::join)?
    }

    async fn write<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            f(&mut db)
        })
        .await
        .map_err(LoadboardError::join)?
    }

    /// Mirrored orders, as last written.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.read(|db| db.get_list(MirrorKey::Orders.as_str())).await
    }

    /// Mirrored drivers whose status is active.
    pub async fn drivers(&self) -> Result<Vec<Driver>> {
        let drivers: Vec<Driver> = self
            .read(|db| db.get_list(MirrorKey::Drivers.as_str()))
            .await?;
        Ok(drivers.into_iter().filter(Driver::is_active).collect())
    }

    /// Mirrored work opportunities, as last written.
    pub async fn work_opportunities(&self) -> Result<Vec<WorkOpportunity>> {
        self.read(|db| db.get_list(MirrorKey::WorkOpportunities.as_str()))
            .await
    }

    pub async fn replace_orders(&self, orders: Vec<Order>) -> Result<()> {
        debug!("Mirroring {} orders", orders.len());
        self.write(move |db| db.put_list(MirrorKey::Orders.as_str(), &orders))
            .await
    }

    pub async fn replace_drivers(&self, drivers: Vec<Driver>) -> Result<()> {
        debug!("Mirroring {} drivers", drivers.len());
        self.write(move |db| db.put_list(MirrorKey::Drivers.as_str(), &drivers))
            .await
    }

    pub async fn replace_work_opportunities(&self, items: Vec<WorkOpportunity>) -> Result<()> {
        debug!("Mirroring {} work opportunities", items.len());
        self.write(move |db| db.put_list(MirrorKey::WorkOpportunities.as_str(), &items))
            .await
    }

    /// Drops the given orders from the mirror. Returns how many were present.
    pub async fn remove_orders(&self, ids: Vec<String>) -> Result<usize> {
        self.write(move |db| {
            db.retain_in_list::<Order, _>(MirrorKey::Orders.as_str(), |order| {
                !ids.contains(&order.id)
            })
        })
        .await
    }

    /// Forgets one key. Returns whether anything was stored under it.
    pub async fn invalidate(&self, key: MirrorKey) -> Result<bool> {
        self.write(move |db| db.delete_key(key.as_str())).await
    }

    /// Forgets every key.
    pub async fn invalidate_all(&self) -> Result<usize> {
        self.write(|db| db.delete_all()).await
    }

    /// When `key` was last written.
    pub async fn last_updated(&self, key: MirrorKey) -> Result<Option<Timestamp>> {
        self.read(move |db| db.updated_at(key.as_str())).await
    }

    /// Re-reads all three lists from the host and replaces them together.
    /// Nothing is written unless every read succeeds.
    pub async fn refresh(&self, store: &dyn RecordStore) -> Result<RefreshSummary> {
        let (orders, drivers, work_opportunities) = futures::try_join!(
            store.fetch_orders(),
            store.fetch_drivers(),
            store.search_work_opportunities(),
        )?;

        let summary = RefreshSummary {
            orders: orders.len(),
            drivers: drivers.len(),
            work_opportunities: work_opportunities.len(),
        };
        let entries = vec![
            (MirrorKey::Orders, serde_json::to_string(&orders)?),
            (MirrorKey::Drivers, serde_json::to_string(&drivers)?),
            (
                MirrorKey::WorkOpportunities,
                serde_json::to_string(&work_opportunities)?,
            ),
        ];
        self.write(move |db| {
            let entries: Vec<(&str, String)> = entries
                .into_iter()
                .map(|(key, raw)| (key.as_str(), raw))
                .collect();
            db.put_lists(&entries)
        })
        .await?;

        info!(
            "Mirror refreshed: {} orders, {} drivers, {} work opportunities",
            summary.orders, summary.drivers, summary.work_opportunities
        );
        Ok(summary)
    }

    /// Stores a host response captured for `url` under the key the URL maps
    /// to. Returns the key written, or `None` when the URL is not one the
    /// mirror tracks.
    ///
    /// # Errors
    ///
    /// Returns `LoadboardError::InvalidResponse` when the body does not have
    /// the shape the host uses for that endpoint.
    pub async fn ingest(&self, url: &str, body: Value) -> Result<Option<MirrorKey>> {
        let Some(key) = MirrorKey::for_url(url) else {
            debug!("Ignoring captured response for {url}");
            return Ok(None);
        };
        let invalid = |e: serde_json::Error| LoadboardError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        };

        match key {
            MirrorKey::Drivers => {
                let envelope: DriversEnvelope = serde_json::from_value(body).map_err(invalid)?;
                self.replace_drivers(envelope.data).await?;
            }
            MirrorKey::Orders => {
                let envelope: OrdersEnvelope = serde_json::from_value(body).map_err(invalid)?;
                self.replace_orders(envelope.truck_capacity_orders).await?;
            }
            MirrorKey::WorkOpportunities => {
                let envelope: SearchEnvelope = serde_json::from_value(body).map_err(invalid)?;
                self.replace_work_opportunities(envelope.work_opportunities)
                    .await?;
            }
        }
        Ok(Some(key))
    }
}

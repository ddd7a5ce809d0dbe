//! Command-line argument definitions using clap.
//!
//! Each command has a clap wrapper that converts into the matching core
//! parameter type, so the core stays free of clap derives:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Loadboard
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use loadboard_core::{
    params::{PostTruck, SelectOrders},
    ChangeSet, DriverDirective, MirrorKey,
};

/// Bulk order management for the freight loadboard
///
/// Deletes, modifies, and clones posted truck-capacity orders in bulk. Orders,
/// drivers, and work opportunities are read from a local mirror that is
/// refreshed from the host or fed with captured host responses.
#[derive(Parser)]
#[command(version, about, name = "lb")]
pub struct Args {
    /// Path to the SQLite mirror database. Defaults to
    /// $XDG_DATA_HOME/loadboard/mirror.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Origin of the loadboard host
    #[arg(long, global = true, env = "LOADBOARD_BASE_URL")]
    pub base_url: Option<String>,

    /// Anti-forgery token sent with every request
    #[arg(long, global = true, env = "LOADBOARD_CSRF_TOKEN", hide_env_values = true)]
    pub csrf_token: Option<String>,

    /// Session cookie sent with every request. Without a token, the token is
    /// read from the orders page using this cookie.
    #[arg(long, global = true, env = "LOADBOARD_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// List, refresh, and bulk-edit posted orders
    #[command(alias = "o")]
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// List drivers
    #[command(alias = "d")]
    Drivers {
        #[command(subcommand)]
        command: DriverCommands,
    },
    /// List work opportunities and post trucks against them
    #[command(aliases = ["op", "opportunity"])]
    Opportunities {
        #[command(subcommand)]
        command: OpportunityCommands,
    },
    /// Store a captured host response in the mirror
    Ingest(IngestArgs),
    /// Manage the local mirror
    Mirror {
        #[command(subcommand)]
        command: MirrorCommands,
    },
}

/// Orders to operate on
#[derive(ClapArgs)]
pub struct SelectArgs {
    /// Ids of mirrored orders, processed in the order given
    #[arg(required_unless_present = "all")]
    pub ids: Vec<String>,
    /// Select every mirrored order
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
}

impl From<SelectArgs> for SelectOrders {
    fn from(val: SelectArgs) -> Self {
        SelectOrders {
            ids: val.ids,
            all: val.all,
        }
    }
}

/// Fields to change on every selected order
///
/// Omitted flags leave the field as it is. Dates are `YYYY-MM-DD HH:MM` in
/// the local time zone, or RFC 3339.
#[derive(ClapArgs)]
pub struct ChangeArgs {
    #[arg(long, help = "New pickup window start")]
    pub start: Option<String>,
    #[arg(long, help = "New delivery window end")]
    pub end: Option<String>,
    #[arg(long, help = "Minimum payout")]
    pub min_payout: Option<String>,
    #[arg(long, help = "Minimum price per distance unit")]
    pub min_price_per_mile: Option<String>,
    #[arg(long, help = "Minimum pickup buffer in minutes")]
    pub stem_time: Option<String>,
    #[arg(long)]
    pub max_stops: Option<String>,
    #[arg(long)]
    pub origin_radius: Option<String>,
    #[arg(long)]
    pub destination_radius: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Assign these drivers (comma-separated, at most two)"
    )]
    pub drivers: Option<Vec<String>>,
    #[arg(long, conflicts_with = "drivers", help = "Remove every assigned driver")]
    pub clear_drivers: bool,
}

impl From<ChangeArgs> for ChangeSet {
    fn from(val: ChangeArgs) -> Self {
        let drivers = if val.clear_drivers {
            DriverDirective::Clear
        } else {
            match val.drivers {
                Some(ids) => DriverDirective::from_ids(Some(ids)),
                None => DriverDirective::Keep,
            }
        };
        ChangeSet {
            start_date_time: val.start,
            end_date_time: val.end,
            min_payout: val.min_payout,
            min_price_per_mile: val.min_price_per_mile,
            stem_time: val.stem_time,
            max_stops: val.max_stops,
            origin_radius: val.origin_radius,
            destination_radius: val.destination_radius,
            drivers,
        }
    }
}

/// Delete orders, in batches
#[derive(ClapArgs)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub select: SelectArgs,
}

/// Apply changes to orders, one at a time
#[derive(ClapArgs)]
pub struct ModifyArgs {
    #[command(flatten)]
    pub select: SelectArgs,
    #[command(flatten)]
    pub changes: ChangeArgs,
}

/// Create a new order from each selected order, with changes applied
#[derive(ClapArgs)]
pub struct CloneArgs {
    #[command(flatten)]
    pub select: SelectArgs,
    #[command(flatten)]
    pub changes: ChangeArgs,
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// List mirrored orders
    #[command(aliases = ["l", "ls"])]
    List,
    /// Re-read orders, drivers, and work opportunities from the host
    #[command(alias = "r")]
    Refresh,
    /// Delete orders
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteArgs),
    /// Modify orders
    #[command(alias = "m")]
    Modify(ModifyArgs),
    /// Clone orders
    #[command(alias = "c")]
    Clone(CloneArgs),
}

#[derive(Subcommand)]
pub enum DriverCommands {
    /// List active drivers
    #[command(aliases = ["l", "ls"])]
    List,
}

/// Post a truck against a work opportunity
#[derive(ClapArgs)]
pub struct PostTruckArgs {
    #[arg(help = "Id of a mirrored work opportunity")]
    pub id: String,
    #[arg(long, help = "Minimum payout; the opportunity's payout when omitted")]
    pub min_payout: Option<String>,
    #[arg(long, help = "Minimum price per distance unit")]
    pub min_price_per_mile: Option<String>,
    #[arg(long, help = "Stem time in minutes, or 'none'")]
    pub stem_time: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Drivers to assign (comma-separated, at most two)"
    )]
    pub drivers: Vec<String>,
}

impl From<PostTruckArgs> for PostTruck {
    fn from(val: PostTruckArgs) -> Self {
        PostTruck {
            work_opportunity_id: val.id,
            min_payout: val.min_payout,
            min_price_per_distance: val.min_price_per_mile,
            stem_time: val.stem_time,
            driver_ids: val.drivers,
        }
    }
}

#[derive(Subcommand)]
pub enum OpportunityCommands {
    /// List mirrored work opportunities
    #[command(aliases = ["l", "ls"])]
    List,
    /// Post a truck
    #[command(alias = "p")]
    Post(PostTruckArgs),
}

/// Store a captured host response in the mirror
///
/// The URL decides the mirror key: drivers, orders, or the loadboard search.
#[derive(ClapArgs)]
pub struct IngestArgs {
    #[arg(help = "URL the response was captured from")]
    pub url: String,
    #[arg(help = "File holding the JSON response body")]
    pub file: PathBuf,
}

/// Forget mirrored data
#[derive(ClapArgs)]
pub struct ClearMirrorArgs {
    #[arg(long, help = "Only clear this key (orders, drivers, opportunities)")]
    pub key: Option<MirrorKey>,
}

#[derive(Subcommand)]
pub enum MirrorCommands {
    /// Clear mirrored data
    Clear(ClearMirrorArgs),
}

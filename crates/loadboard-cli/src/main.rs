//! Loadboard CLI Application
//!
//! Command-line interface for bulk order management on the freight loadboard.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use loadboard_core::LoadboardBuilder;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        base_url,
        csrf_token,
        cookie,
        no_color,
        command,
    } = Args::parse();

    let loadboard = LoadboardBuilder::new()
        .with_database_path(database_file)
        .with_base_url(base_url)
        .with_csrf_token(csrf_token)
        .with_cookie(cookie)
        .build()
        .await
        .context("Failed to initialize loadboard")?;

    let renderer = TerminalRenderer::new(!no_color);
    let cli = Cli::new(loadboard, renderer);

    info!("Loadboard started");

    match command {
        Some(Orders { command }) => cli.handle_order_command(command).await,
        Some(Drivers { command }) => cli.handle_driver_command(command).await,
        Some(Opportunities { command }) => cli.handle_opportunity_command(command).await,
        Some(Ingest(args)) => cli.ingest(args).await,
        Some(Mirror { command }) => cli.handle_mirror_command(command).await,
        None => cli.list_orders().await,
    }
}

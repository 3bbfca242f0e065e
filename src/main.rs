mod cli;
mod config;
mod db;
mod models;
mod stats;
mod store;
mod utils;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers::{self, ChangeReport};
use config::AppConfig;
use config::settings::DisplayConfig;
use store::Store;
use utils::dates;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    match cli.command {
        // Config commands never touch the database
        Some(Commands::Config { action }) => handlers::handle_config(&mut config, &action),
        Some(Commands::Habit { action }) => with_store(&config, |store, ui, today| {
            handlers::handle_habit(store, ui, &action, today)
        }),
        Some(Commands::Todo { action }) => with_store(&config, |store, ui, today| {
            handlers::handle_todo(store, ui, &action, today)
        }),
        Some(Commands::Journal { action }) => with_store(&config, |store, ui, today| {
            handlers::handle_journal(store, ui, &action, today)
        }),
        Some(Commands::Stats { habit, week }) => with_store(&config, |store, ui, today| {
            handlers::handle_stats(store, ui, habit.as_deref(), week, today)
        }),
        Some(Commands::Export { json }) => with_store(&config, |store, ui, today| {
            handlers::handle_export(store, ui, json, today)
        }),
        None => with_store(&config, handlers::handle_dashboard),
    }
}

/// Open the store, run one command against it, then print the refreshed summaries.
fn with_store<F>(config: &AppConfig, run: F) -> Result<()>
where
    F: FnOnce(&Store, &DisplayConfig, NaiveDate) -> Result<()>,
{
    config.ensure_data_dir()?;
    let db_path = config.db_path()?;
    log::debug!("database at {:?}", db_path);

    let today = dates::today();
    let mut store = Store::open(&db_path, config.stats.week_start)?;
    let report = ChangeReport::default();
    store.subscribe(report.clone().subscriber(config.display.clone(), today));

    run(&store, &config.display, today)?;
    report.flush();
    Ok(())
}

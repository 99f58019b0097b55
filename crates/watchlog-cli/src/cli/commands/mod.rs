use anyhow::Context;
use serde::Serialize;
use watchlog_core::{Store, WatchlogConfig};

use super::args::GlobalArgs;

mod dispatch;
pub mod extract;
pub mod import;
pub mod query;
pub mod record;

pub use dispatch::dispatch;

/// Config file (or defaults) with command-line overrides applied on top.
pub(crate) fn load_config(global: &GlobalArgs) -> anyhow::Result<WatchlogConfig> {
    let mut cfg = match &global.config {
        Some(path) => WatchlogConfig::load(path)?,
        None => WatchlogConfig::default(),
    };
    if let Some(db) = &global.database {
        cfg.database = db.clone();
    }
    if let Some(dir) = &global.results_dir {
        cfg.results_dir = dir.clone();
    }
    Ok(cfg)
}

pub(crate) fn open_store(cfg: &WatchlogConfig) -> anyhow::Result<Store> {
    let store = Store::open(&cfg.database)?;
    store
        .init_schema()
        .with_context(|| format!("initializing schema in {}", cfg.database.display()))?;
    Ok(store)
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use watchlog_core::{DirArtifactStore, Importer, Store};

use super::super::args::{GlobalArgs, ImportArgs};
use super::{load_config, open_store, print_json};
use crate::exit_codes::SUCCESS;

pub async fn run(args: ImportArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let artifacts = cfg.artifact_store();
    let store = open_store(&cfg)?;
    let importer = Importer::new(&artifacts, &store).with_log_cap(cfg.log_cap_bytes);

    match args.every {
        None => {
            let report = importer.run()?;
            print_json(&report)?;
        }
        Some(every) if every.is_zero() => anyhow::bail!("--every must be greater than zero"),
        Some(every) => watch(&importer, every, &artifacts, &store).await?,
    }
    Ok(SUCCESS)
}

/// Periodic passes until Ctrl-C. A failed pass is logged and retried on the
/// next tick; each report is printed as one JSON line.
async fn watch(
    importer: &Importer<'_>,
    every: Duration,
    artifacts: &DirArtifactStore,
    store: &Store,
) -> anyhow::Result<()> {
    info!(
        every = %humantime::format_duration(every),
        results_dir = %artifacts.root().display(),
        "periodic import started"
    );
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => match importer.run() {
                Ok(report) => println!("{}", serde_json::to_string(&report)?),
                Err(e) => warn!(error = %e, "import pass failed"),
            },
            _ = &mut shutdown => {
                info!(total_runs = store.count_runs(None).unwrap_or_default(), "periodic import stopped");
                break;
            }
        }
    }
    Ok(())
}

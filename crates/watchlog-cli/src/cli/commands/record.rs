use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};
use watchlog_core::{Agent, CycleContext, Importer, WatchCycle};

use super::super::args::{GlobalArgs, RecordArgs};
use super::{load_config, open_store, print_json};
use crate::exit_codes::SUCCESS;

/// Stands in for a live agent by returning a transcript captured earlier.
/// A transcript that cannot be read fails the run instead of the command.
struct ReplayAgent {
    transcript: PathBuf,
}

impl Agent for ReplayAgent {
    fn run(&self, _prompt: &str, ctx: &CycleContext) -> anyhow::Result<String> {
        info!(
            run_id = %ctx.run_id,
            transcript = %self.transcript.display(),
            "replaying captured transcript"
        );
        fs::read_to_string(&self.transcript)
            .with_context(|| format!("reading transcript {}", self.transcript.display()))
    }
}

pub fn run(args: RecordArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let artifacts = cfg.artifact_store();

    // The artifact is the durable record; a run is still recorded without a database.
    let store = match open_store(&cfg) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(database = %cfg.database.display(), error = %e, "store unavailable; recording artifact only");
            None
        }
    };

    let prompt = args.prompt.unwrap_or_else(|| cfg.prompt_path.clone());
    let mut cycle = WatchCycle::new(&artifacts, prompt).with_log_cap(cfg.log_cap_bytes);
    if let Some(store) = &store {
        cycle = cycle.with_store(store);
    }

    let agent = ReplayAgent {
        transcript: args.transcript,
    };
    let run = cycle.execute(&args.namespace, &args.mode, &agent)?;

    if args.import {
        match &store {
            Some(store) => {
                let report = Importer::new(&artifacts, store)
                    .with_log_cap(cfg.log_cap_bytes)
                    .run()?;
                info!(imported = report.imported, "imported after record");
            }
            None => warn!(run_id = %run.id, "skipping import; artifact left for a later pass"),
        }
    }

    print_json(&run)?;
    Ok(SUCCESS)
}

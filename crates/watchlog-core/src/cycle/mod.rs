//! One watch cycle: prompt → agent → extractor → completed run → artifact.
//!
//! The agent process itself is an external collaborator behind [`Agent`].
//! Whatever happens inside the cycle, it ends with exactly one terminal run
//! written to the artifact store; failures only change what that run says.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::artifact::ArtifactStore;
use crate::extractor::extract_report;
use crate::ids::{RunId, RunIdSource};
use crate::model::{truncate_log, Run, DEFAULT_LOG_CAP_BYTES};
use crate::storage::Store;

/// What the agent is told about the cycle it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleContext {
    pub run_id: RunId,
    pub namespace: String,
    pub mode: String,
    /// End of the previous terminal run for this namespace, if any; lets the
    /// agent focus on what changed since then.
    pub last_completed: Option<DateTime<Utc>>,
}

/// External agent invocation. Returns the raw transcript.
pub trait Agent {
    fn run(&self, prompt: &str, ctx: &CycleContext) -> anyhow::Result<String>;
}

impl<F> Agent for F
where
    F: Fn(&str, &CycleContext) -> anyhow::Result<String>,
{
    fn run(&self, prompt: &str, ctx: &CycleContext) -> anyhow::Result<String> {
        self(prompt, ctx)
    }
}

pub struct WatchCycle<'a> {
    artifacts: &'a dyn ArtifactStore,
    store: Option<&'a Store>,
    prompt_path: PathBuf,
    ids: RunIdSource,
    log_cap: usize,
}

impl<'a> WatchCycle<'a> {
    pub fn new(artifacts: &'a dyn ArtifactStore, prompt_path: impl Into<PathBuf>) -> Self {
        Self {
            artifacts,
            store: None,
            prompt_path: prompt_path.into(),
            ids: RunIdSource::new(),
            log_cap: DEFAULT_LOG_CAP_BYTES,
        }
    }

    /// Consult `store` for the previous completion time. Optional: a cycle
    /// must still complete when the store is down.
    pub fn with_store(mut self, store: &'a Store) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_log_cap(mut self, log_cap: usize) -> Self {
        self.log_cap = log_cap;
        self
    }

    pub fn prompt_path(&self) -> &Path {
        &self.prompt_path
    }

    pub fn execute(&self, namespace: &str, mode: &str, agent: &dyn Agent) -> anyhow::Result<Run> {
        let now = Utc::now();
        let mut run = Run::start(self.ids.next_at(now), namespace, mode, now);
        info!(run_id = %run.id, namespace, mode, "watch cycle started");

        let ctx = CycleContext {
            run_id: run.id,
            namespace: namespace.to_string(),
            mode: mode.to_string(),
            last_completed: self.last_completed(namespace),
        };
        self.drive(&mut run, &ctx, agent)?;

        self.artifacts.write(&run)?;
        info!(
            run_id = %run.id,
            status = %run.status,
            pods = run.pod_count,
            errors = run.error_count,
            fixes = run.fix_count,
            "watch cycle finished"
        );
        Ok(run)
    }

    fn drive(&self, run: &mut Run, ctx: &CycleContext, agent: &dyn Agent) -> anyhow::Result<()> {
        let prompt = match fs::read_to_string(&self.prompt_path) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(run_id = %run.id, path = %self.prompt_path.display(), error = %e, "prompt missing; failing run");
                run.fail(
                    format!(
                        "prompt file not found at {}: {e}; agent was not started",
                        self.prompt_path.display()
                    ),
                    Utc::now(),
                )?;
                return Ok(());
            }
        };

        let transcript = match agent.run(&prompt, ctx) {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!(run_id = %run.id, error = %e, "agent failed");
                run.fail(format!("agent failed: {e:#}"), Utc::now())?;
                return Ok(());
            }
        };

        let extracted = extract_report(&transcript);
        run.complete(
            extracted.into_outcome(truncate_log(&transcript, self.log_cap)),
            Utc::now(),
        )?;
        Ok(())
    }

    fn last_completed(&self, namespace: &str) -> Option<DateTime<Utc>> {
        let store = self.store?;
        match store.get_last_completed_time(namespace) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(namespace, error = %e, "could not read last completion time");
                None
            }
        }
    }
}

//! Run ingestion and reporting pipeline for namespace watch-and-fix agents.
//!
//! ```text
//! transcript ──▶ extractor ──▶ Run (completed) ──▶ ArtifactStore (run_<id>.json)
//!                                                        │
//!                                                        ▼
//!                              Store (SQLite) ◀── Importer (insert-if-absent)
//!                                  │
//!                                  ▼
//!                          query layer (runs, fixes, stats)
//! ```
//!
//! The artifact file is written before any database is involved, so a run's
//! result survives an unreachable store; the importer promotes artifacts
//! lazily and is safe to call repeatedly.

pub mod artifact;
pub mod config;
pub mod cycle;
pub mod errors;
pub mod extractor;
pub mod ids;
pub mod import;
pub mod model;
pub mod storage;

pub use artifact::{ArtifactRead, ArtifactStore, DirArtifactStore, MemoryArtifactStore};
pub use config::WatchlogConfig;
pub use cycle::{Agent, CycleContext, WatchCycle};
pub use errors::{ArtifactError, ConfigError, StoreError, TransitionError};
pub use extractor::{extract_report, ExtractedReport, REPORT_END_MARKER, REPORT_START_MARKER};
pub use ids::{RunId, RunIdSource};
pub use import::{ImportReport, Importer};
pub use model::{
    normalize_status, truncate_log, Fix, FixStatus, GlobalStats, NamespaceStats, NewFix, Run,
    RunOutcome, RunStatus, DEFAULT_LOG_CAP_BYTES,
};
pub use storage::{InsertOutcome, Store};

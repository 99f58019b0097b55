use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "watchlog",
    version,
    about = "Record, import and query watch-and-fix agent runs"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// YAML config file; built-in defaults apply when omitted
    #[arg(long, global = true, env = "WATCHLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database (overrides config)
    #[arg(long, global = true, env = "WATCHLOG_DATABASE")]
    pub database: Option<PathBuf>,

    /// Directory of run_<id>.json artifacts (overrides config)
    #[arg(long, global = true, env = "WATCHLOG_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one watch cycle, replaying a captured agent transcript
    Record(RecordArgs),
    /// Print the report extracted from a transcript
    Extract(ExtractArgs),
    /// Promote run artifacts into the database
    Import(ImportArgs),
    /// List runs, newest first
    Runs(RunsArgs),
    /// Show one run and its fixes
    Show(ShowArgs),
    /// End time of the latest completed run in a namespace
    LastRun(LastRunArgs),
    /// Per-namespace run statistics
    Namespaces(NamespacesArgs),
    /// List recorded fixes, newest first
    Fixes(FixesArgs),
    /// Fix totals across all namespaces
    Stats,
    /// Print the watchlog version
    Version,
}

#[derive(Args, Clone, Debug)]
pub struct RecordArgs {
    #[arg(long, short = 'n')]
    pub namespace: String,

    #[arg(long, default_value = "autonomous")]
    pub mode: String,

    /// Captured agent transcript to replay
    #[arg(long)]
    pub transcript: PathBuf,

    /// Prompt file (overrides config)
    #[arg(long)]
    pub prompt: Option<PathBuf>,

    /// Import the new artifact right away
    #[arg(long)]
    pub import: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ExtractArgs {
    /// Transcript file; `-` reads stdin
    pub transcript: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct ImportArgs {
    /// Repeat the pass on this interval (e.g. `30s`, `5m`) until Ctrl-C
    #[arg(long, value_parser = humantime::parse_duration)]
    pub every: Option<std::time::Duration>,
}

#[derive(Args, Clone, Debug)]
pub struct RunsArgs {
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Max rows (default from config)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Clone, Debug)]
pub struct ShowArgs {
    pub id: i64,
}

#[derive(Args, Clone, Debug)]
pub struct LastRunArgs {
    #[arg(long, short = 'n')]
    pub namespace: String,
}

#[derive(Args, Clone, Debug)]
pub struct NamespacesArgs {
    /// Only this namespace (reports zeros when it has no runs)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct FixesArgs {
    /// Only fixes attributed to this run
    #[arg(long)]
    pub run: Option<i64>,

    #[arg(long)]
    pub limit: Option<usize>,
}

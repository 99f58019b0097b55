//! Read-only commands over the relational store. All print JSON on stdout.

use serde_json::json;
use watchlog_core::RunId;

use super::super::args::{FixesArgs, GlobalArgs, LastRunArgs, NamespacesArgs, RunsArgs, ShowArgs};
use super::{load_config, open_store, print_json};
use crate::exit_codes::{NOT_FOUND, SUCCESS};

pub fn runs(args: RunsArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let store = open_store(&cfg)?;
    let limit = args.limit.unwrap_or(cfg.default_limit);
    print_json(&store.get_runs(args.namespace.as_deref(), limit)?)?;
    Ok(SUCCESS)
}

pub fn show(args: ShowArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let store = open_store(&cfg)?;
    let id = RunId(args.id);

    let run = match store.get_run(id) {
        Ok(run) => run,
        Err(e) if e.is_not_found() => {
            eprintln!("run {id} not found");
            return Ok(NOT_FOUND);
        }
        Err(e) => return Err(e.into()),
    };
    let fixes = store.get_fixes_by_run(id)?;
    print_json(&json!({ "run": run, "fixes": fixes }))?;
    Ok(SUCCESS)
}

pub fn last_run(args: LastRunArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let store = open_store(&cfg)?;
    let last = store.get_last_completed_time(&args.namespace)?;
    print_json(&json!({ "namespace": args.namespace, "last_completed": last }))?;
    Ok(SUCCESS)
}

pub fn namespaces(args: NamespacesArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let store = open_store(&cfg)?;
    match args.namespace {
        Some(ns) => print_json(&store.get_stats_for_namespace(&ns)?)?,
        None => print_json(&store.get_namespace_stats()?)?,
    }
    Ok(SUCCESS)
}

pub fn fixes(args: FixesArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let store = open_store(&cfg)?;
    let fixes = match args.run {
        Some(run) => store.get_fixes_by_run(RunId(run))?,
        None => store.get_fixes(args.limit.unwrap_or(cfg.default_limit))?,
    };
    print_json(&fixes)?;
    Ok(SUCCESS)
}

pub fn stats(global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = load_config(global)?;
    let store = open_store(&cfg)?;
    print_json(&store.get_global_stats()?)?;
    Ok(SUCCESS)
}

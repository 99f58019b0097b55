use chrono::{DateTime, Duration, TimeZone, Utc};
use watchlog_core::{
    FixStatus, GlobalStats, NewFix, Run, RunId, RunOutcome, RunStatus, Store, StoreError,
};

fn store() -> anyhow::Result<Store> {
    let store = Store::memory()?;
    store.init_schema()?;
    Ok(store)
}

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn seed(store: &Store, id: i64, ns: &str, status: RunStatus, start: i64) -> anyhow::Result<Run> {
    let mut run = Run::start(RunId(id), ns, "autonomous", t(start));
    if status.is_terminal() {
        run.complete(
            RunOutcome {
                status,
                ..RunOutcome::failed("")
            },
            t(start + 5),
        )?;
    }
    store.insert_run_if_absent(&run)?;
    Ok(run)
}

fn fix(run_id: Option<i64>, minute: i64, status: FixStatus) -> NewFix {
    NewFix {
        run_id: run_id.map(RunId),
        timestamp: t(minute),
        namespace: "prod".into(),
        pod_name: "api-7f9c".into(),
        error_type: "CrashLoopBackOff".into(),
        error_message: "OOMKilled".into(),
        fix_applied: "raised memory limit".into(),
        status,
    }
}

#[test]
fn runs_are_newest_first_and_filtered_by_namespace() -> anyhow::Result<()> {
    let store = store()?;
    seed(&store, 1, "prod", RunStatus::Ok, 0)?;
    seed(&store, 2, "staging", RunStatus::Fixed, 10)?;
    seed(&store, 3, "prod", RunStatus::Failed, 20)?;

    let all: Vec<i64> = store.get_runs(None, 10)?.iter().map(|r| r.id.get()).collect();
    assert_eq!(all, vec![3, 2, 1]);

    let prod: Vec<i64> = store
        .get_runs(Some("prod"), 10)?
        .iter()
        .map(|r| r.id.get())
        .collect();
    assert_eq!(prod, vec![3, 1]);

    // Empty namespace means all namespaces.
    assert_eq!(store.get_runs(Some(""), 10)?.len(), 3);
    assert_eq!(store.get_runs(None, 2)?.len(), 2);
    assert!(store.get_runs(None, 0)?.is_empty());
    Ok(())
}

#[test]
fn get_run_reports_not_found() -> anyhow::Result<()> {
    let store = store()?;
    let err = store.get_run(RunId(404)).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, StoreError::NotFound(RunId(404))));
    Ok(())
}

#[test]
fn last_completed_time_ignores_running_runs() -> anyhow::Result<()> {
    let store = store()?;
    assert_eq!(store.get_last_completed_time("prod")?, None);

    seed(&store, 1, "prod", RunStatus::Ok, 0)?;
    seed(&store, 2, "prod", RunStatus::IssuesFound, 30)?;
    seed(&store, 3, "prod", RunStatus::Running, 60)?;
    seed(&store, 4, "staging", RunStatus::Ok, 90)?;

    assert_eq!(store.get_last_completed_time("prod")?, Some(t(35)));
    assert_eq!(store.get_last_completed_time("staging")?, Some(t(95)));
    assert_eq!(store.get_last_completed_time("dev")?, None);
    Ok(())
}

#[test]
fn namespace_stats_group_failed_and_issues_found() -> anyhow::Result<()> {
    let store = store()?;
    seed(&store, 1, "prod", RunStatus::Ok, 0)?;
    seed(&store, 2, "prod", RunStatus::Fixed, 1)?;
    seed(&store, 3, "prod", RunStatus::Failed, 2)?;
    seed(&store, 4, "prod", RunStatus::IssuesFound, 3)?;
    seed(&store, 5, "prod", RunStatus::Running, 4)?;
    seed(&store, 6, "alpha", RunStatus::Ok, 5)?;

    let stats = store.get_namespace_stats()?;
    let names: Vec<&str> = stats.iter().map(|s| s.namespace.as_str()).collect();
    assert_eq!(names, vec!["alpha", "prod"]);

    let prod = &stats[1];
    assert_eq!(prod.run_count, 5);
    assert_eq!(prod.ok_count, 1);
    assert_eq!(prod.fixed_count, 1);
    assert_eq!(prod.failed_count, 2);
    assert!(prod.terminal_count() < prod.run_count);

    let alpha = &stats[0];
    assert_eq!(alpha.terminal_count(), alpha.run_count);

    for s in &stats {
        assert!(s.ok_count + s.fixed_count + s.failed_count <= s.run_count);
    }

    assert_eq!(store.get_stats_for_namespace("prod")?, prod.clone());
    let empty = store.get_stats_for_namespace("nowhere")?;
    assert_eq!(empty.run_count, 0);
    assert_eq!(empty.namespace, "nowhere");
    Ok(())
}

#[test]
fn fixes_are_newest_first_and_scoped_by_run() -> anyhow::Result<()> {
    let store = store()?;
    seed(&store, 1, "prod", RunStatus::Fixed, 0)?;
    store.insert_fix(&fix(Some(1), 1, FixStatus::Success))?;
    store.insert_fix(&fix(Some(1), 3, FixStatus::Failed))?;
    store.insert_fix(&fix(None, 2, FixStatus::Analyzing))?;
    store.insert_fix(&fix(Some(2), 4, FixStatus::Pending))?;

    let minutes: Vec<DateTime<Utc>> = store.get_fixes(10)?.iter().map(|f| f.timestamp).collect();
    assert_eq!(minutes, vec![t(4), t(3), t(2), t(1)]);
    assert_eq!(store.get_fixes(2)?.len(), 2);

    let by_run = store.get_fixes_by_run(RunId(1))?;
    assert_eq!(by_run.len(), 2);
    assert_eq!(by_run[0].timestamp, t(3));
    assert!(by_run.iter().all(|f| f.run_id == Some(RunId(1))));

    let unattributed = store
        .get_fixes(10)?
        .into_iter()
        .find(|f| f.run_id.is_none())
        .expect("unattributed fix");
    assert_eq!(unattributed.status, FixStatus::Analyzing);
    Ok(())
}

#[test]
fn global_stats_count_analyzing_as_pending() -> anyhow::Result<()> {
    let store = store()?;
    assert_eq!(store.get_global_stats()?, GlobalStats::default());

    store.insert_fix(&fix(None, 1, FixStatus::Success))?;
    store.insert_fix(&fix(None, 2, FixStatus::Success))?;
    store.insert_fix(&fix(None, 3, FixStatus::Failed))?;
    store.insert_fix(&fix(None, 4, FixStatus::Pending))?;
    store.insert_fix(&fix(None, 5, FixStatus::Analyzing))?;
    store.insert_fix(&fix(None, 6, FixStatus::Other("skipped".into())))?;

    assert_eq!(
        store.get_global_stats()?,
        GlobalStats {
            total: 6,
            success: 2,
            failed: 1,
            pending: 2,
        }
    );
    Ok(())
}

#[test]
fn create_then_complete_is_one_terminal_transition() -> anyhow::Result<()> {
    let store = store()?;
    let mut run = Run::start(RunId(10), "prod", "report", t(0));
    store.create_run(&run)?;

    let stored = store.get_run(RunId(10))?;
    assert_eq!(stored.status, RunStatus::Running);
    assert_eq!(stored.ended_at, None);

    run.complete(
        RunOutcome {
            status: RunStatus::Fixed,
            pod_count: 9,
            error_count: 2,
            fix_count: 2,
            report: "{\"status\":\"fixed\"}".into(),
            log: "done".into(),
        },
        t(3),
    )?;
    store.complete_run(&run)?;
    assert_eq!(store.get_run(RunId(10))?, run);

    // A second completion must not rewrite the terminal record.
    let mut again = run.clone();
    again.status = RunStatus::Failed;
    let err = store.complete_run(&again).unwrap_err();
    assert!(matches!(err, StoreError::NotRunning(RunId(10))));
    assert_eq!(store.get_run(RunId(10))?.status, RunStatus::Fixed);
    Ok(())
}

#[test]
fn create_rejects_terminal_or_duplicate_runs() -> anyhow::Result<()> {
    let store = store()?;
    let mut run = Run::start(RunId(11), "prod", "report", t(0));
    store.create_run(&run)?;
    assert!(matches!(
        store.create_run(&run).unwrap_err(),
        StoreError::InvalidRun(_)
    ));

    run.fail("x", t(1))?;
    let mut other = run.clone();
    other.id = RunId(12);
    assert!(matches!(
        store.create_run(&other).unwrap_err(),
        StoreError::InvalidRun(_)
    ));
    Ok(())
}

//! Runner behavior tests over in-process fakes.
//!
//! The fakes stand in for the network: an in-memory history store, a
//! scripted SQL executor, and queued confirmation answers.

use crate::confirm::Confirmation;
use crate::error::{MigrateError, MigrateResult};
use crate::history::{HistoryStore, MigrationRecord};
use crate::runner::{wipe_sql, Mode, RunOptions, RunOutcome, Runner};
use async_trait::async_trait;
use kuppa_db::{DbError, DbResult, SqlExecutor};
use serde_json::Value;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

// ── Fakes ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum FetchBehavior {
    Normal,
    MissingTable,
    Failure,
}

struct MemoryHistory {
    rows: Mutex<Vec<(String, i64)>>,
    ensure_calls: Mutex<usize>,
    fetch: FetchBehavior,
}

impl MemoryHistory {
    fn new() -> Self {
        MemoryHistory {
            rows: Mutex::new(Vec::new()),
            ensure_calls: Mutex::new(0),
            fetch: FetchBehavior::Normal,
        }
    }

    fn with_fetch(fetch: FetchBehavior) -> Self {
        MemoryHistory {
            fetch,
            ..Self::new()
        }
    }

    fn seed(&self, name: &str, batch: i64) {
        self.rows.lock().unwrap().push((name.to_string(), batch));
    }

    fn names(&self) -> Vec<String> {
        self.rows.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    fn ensure_count(&self) -> usize {
        *self.ensure_calls.lock().unwrap()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn ensure_table(&self) -> MigrateResult<()> {
        *self.ensure_calls.lock().unwrap() += 1;
        Ok(())
    }

    async fn fetch_all(&self) -> MigrateResult<Vec<MigrationRecord>> {
        match self.fetch {
            FetchBehavior::Normal => Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .enumerate()
                .map(|(i, (name, batch))| MigrationRecord {
                    id: i as i64 + 1,
                    migration: name.clone(),
                    batch: *batch,
                    created_at: None,
                })
                .collect()),
            FetchBehavior::MissingTable => Err(MigrateError::HistoryFetch(DbError::Api {
                status: 404,
                code: "PGRST205".to_string(),
                message: "Could not find the table".to_string(),
            })),
            FetchBehavior::Failure => Err(MigrateError::HistoryFetch(DbError::Transport(
                "connection reset".to_string(),
            ))),
        }
    }

    async fn is_migrated(&self, name: &str) -> MigrateResult<bool> {
        Ok(self.rows.lock().unwrap().iter().any(|(n, _)| n == name))
    }

    async fn record(&self, name: &str, batch: i64) -> MigrateResult<()> {
        self.rows.lock().unwrap().push((name.to_string(), batch));
        Ok(())
    }

    async fn remove(&self, name: &str) -> MigrateResult<()> {
        self.rows.lock().unwrap().retain(|(n, _)| n != name);
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedExecutor {
    log: Mutex<Vec<String>>,
    fail_marker: Option<String>,
}

impl ScriptedExecutor {
    fn failing_on(marker: &str) -> Self {
        ScriptedExecutor {
            log: Mutex::new(Vec::new()),
            fail_marker: Some(marker.to_string()),
        }
    }

    fn executed(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlExecutor for ScriptedExecutor {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        if let Some(marker) = &self.fail_marker {
            if sql.contains(marker.as_str()) {
                return Err(DbError::Api {
                    status: 400,
                    code: "42601".to_string(),
                    message: format!("syntax error near {marker}"),
                });
            }
        }
        self.log.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn query(&self, _sql: &str) -> DbResult<Vec<Value>> {
        Ok(Vec::new())
    }
}

/// Pops scripted answers; errors on an unexpected prompt.
struct Answers(Mutex<VecDeque<bool>>);

impl Answers {
    fn new(answers: &[bool]) -> Self {
        Answers(Mutex::new(answers.iter().copied().collect()))
    }
}

impl Confirmation for Answers {
    fn confirm(&self, _prompt: &str) -> MigrateResult<bool> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| MigrateError::ConfirmationUnavailable("unexpected prompt".to_string()))
    }
}

/// Fails the test if any prompt is shown.
struct Untouchable;

impl Confirmation for Untouchable {
    fn confirm(&self, prompt: &str) -> MigrateResult<bool> {
        Err(MigrateError::ConfirmationUnavailable(format!(
            "prompt should not have been shown: {prompt}"
        )))
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

const FILE_A: &str = "2025_01_01_000000_create_a.sql";
const FILE_B: &str = "2025_01_02_000000_create_b.sql";
const FILE_C: &str = "2025_01_03_000000_create_c.sql";

fn write_migration(dir: &Path, name: &str, table: &str) {
    let content = format!(
        "-- kuppa:up\nCREATE TABLE IF NOT EXISTS {table} (id UUID);\n\n-- kuppa:down\nDROP TABLE IF EXISTS {table} CASCADE;\n"
    );
    std::fs::write(dir.join(name), content).unwrap();
}

fn options(dir: &Path) -> RunOptions {
    RunOptions {
        production: false,
        force: false,
        migrations_dir: dir.to_path_buf(),
        schema: "public".to_string(),
    }
}

// ── up ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn up_applies_pending_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    write_migration(dir.path(), FILE_B, "tbl_b");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();

    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));
    let outcome = runner.run(Mode::Up).await.unwrap();

    match outcome {
        RunOutcome::Applied { batch, files } => {
            assert_eq!(batch, 1);
            assert_eq!(files, vec![FILE_A, FILE_B]);
        }
        other => panic!("expected Applied, got {other:?}"),
    }
    let executed = executor.executed();
    assert!(executed[0].contains("tbl_a"));
    assert!(executed[1].contains("tbl_b"));
    assert_eq!(history.names(), vec![FILE_A, FILE_B]);
}

#[tokio::test]
async fn up_twice_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));

    runner.run(Mode::Up).await.unwrap();
    let outcome = runner.run(Mode::Up).await.unwrap();

    assert!(matches!(outcome, RunOutcome::NothingToMigrate));
    assert_eq!(history.names().len(), 1);
    assert_eq!(executor.executed().len(), 1);
}

#[tokio::test]
async fn batches_increment_per_invocation() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));
    runner.run(Mode::Up).await.unwrap();

    write_migration(dir.path(), FILE_B, "tbl_b");
    let outcome = runner.run(Mode::Up).await.unwrap();

    match outcome {
        RunOutcome::Applied { batch, files } => {
            assert_eq!(batch, 2);
            assert_eq!(files, vec![FILE_B]);
        }
        other => panic!("expected Applied, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_directory_reports_nothing_to_migrate() {
    let dir = tempfile::tempdir().unwrap();
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));

    let outcome = runner.run(Mode::Up).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NothingToMigrate));
    assert!(executor.executed().is_empty());
}

#[tokio::test]
async fn failure_halts_without_touching_later_files() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    write_migration(dir.path(), FILE_B, "tbl_boom");
    write_migration(dir.path(), FILE_C, "tbl_c");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::failing_on("tbl_boom");

    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));
    let outcome = runner.run(Mode::Up).await.unwrap();

    match outcome {
        RunOutcome::Halted { file, completed, .. } => {
            assert_eq!(file, FILE_B);
            assert_eq!(completed, vec![FILE_A]);
        }
        other => panic!("expected Halted, got {other:?}"),
    }
    // A recorded, B not recorded, C never attempted
    assert_eq!(history.names(), vec![FILE_A]);
    assert!(!executor.executed().iter().any(|sql| sql.contains("tbl_c")));
}

#[tokio::test]
async fn missing_history_table_behaves_as_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::with_fetch(FetchBehavior::MissingTable);
    let executor = ScriptedExecutor::default();

    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));
    let outcome = runner.run(Mode::Up).await.unwrap();

    match outcome {
        RunOutcome::Applied { batch, files } => {
            assert_eq!(batch, 1);
            assert_eq!(files, vec![FILE_A]);
        }
        other => panic!("expected Applied, got {other:?}"),
    }
}

#[tokio::test]
async fn history_fetch_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::with_fetch(FetchBehavior::Failure);
    let executor = ScriptedExecutor::default();

    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));
    let err = runner.run(Mode::Up).await.unwrap_err();

    assert!(matches!(err, MigrateError::HistoryFetch(_)));
    assert!(executor.executed().is_empty());
}

// ── down ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn round_trip_reverts_in_reverse_order() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    write_migration(dir.path(), FILE_B, "tbl_b");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));

    runner.run(Mode::Up).await.unwrap();
    let outcome = runner.run(Mode::Down).await.unwrap();

    match outcome {
        RunOutcome::RolledBack { batch, files } => {
            assert_eq!(batch, 1);
            assert_eq!(files, vec![FILE_B, FILE_A]);
        }
        other => panic!("expected RolledBack, got {other:?}"),
    }
    assert!(history.names().is_empty());

    let executed = executor.executed();
    let drop_statements: Vec<&String> = executed
        .iter()
        .filter(|sql| sql.starts_with("DROP TABLE"))
        .collect();
    assert_eq!(drop_statements.len(), 2);
    assert!(drop_statements[0].contains("tbl_b"));
    assert!(drop_statements[1].contains("tbl_a"));
}

#[tokio::test]
async fn down_targets_only_the_last_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    write_migration(dir.path(), FILE_B, "tbl_b");
    write_migration(dir.path(), FILE_C, "tbl_c");
    let history = MemoryHistory::new();
    history.seed(FILE_A, 1);
    history.seed(FILE_B, 2);
    history.seed(FILE_C, 2);
    let executor = ScriptedExecutor::default();

    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));
    let outcome = runner.run(Mode::Down).await.unwrap();

    match outcome {
        RunOutcome::RolledBack { batch, files } => {
            assert_eq!(batch, 2);
            assert_eq!(files, vec![FILE_C, FILE_B]);
        }
        other => panic!("expected RolledBack, got {other:?}"),
    }
    assert_eq!(history.names(), vec![FILE_A]);
}

#[tokio::test]
async fn down_with_empty_history_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();

    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));
    let outcome = runner.run(Mode::Down).await.unwrap();

    assert!(matches!(outcome, RunOutcome::NothingToRollback));
    assert!(executor.executed().is_empty());
}

// ── status ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_lists_every_file_once_and_mutates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    write_migration(dir.path(), FILE_B, "tbl_b");
    let history = MemoryHistory::new();
    history.seed(FILE_A, 1);
    let executor = ScriptedExecutor::default();

    let runner = Runner::new(&history, &executor, &Untouchable, options(dir.path()));
    let outcome = runner.run(Mode::Status).await.unwrap();

    match outcome {
        RunOutcome::Status(entries) => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].file, FILE_A);
            assert_eq!(entries[0].batch, Some(1));
            assert!(entries[0].ran());
            assert_eq!(entries[1].file, FILE_B);
            assert!(!entries[1].ran());
        }
        other => panic!("expected Status, got {other:?}"),
    }
    // Read-only: no DDL, no history writes, no bootstrap
    assert!(executor.executed().is_empty());
    assert_eq!(history.names(), vec![FILE_A]);
    assert_eq!(history.ensure_count(), 0);
}

#[tokio::test]
async fn status_never_prompts_in_production() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let mut opts = options(dir.path());
    opts.production = true;

    let runner = Runner::new(&history, &executor, &Untouchable, opts);
    assert!(matches!(
        runner.run(Mode::Status).await.unwrap(),
        RunOutcome::Status(_)
    ));
}

// ── fresh ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_wipes_then_replays_all_migrations() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let mut opts = options(dir.path());
    opts.force = true;

    let runner = Runner::new(&history, &executor, &Untouchable, opts);
    let outcome = runner.run(Mode::Fresh).await.unwrap();

    match outcome {
        RunOutcome::Wiped { replay } => match *replay {
            RunOutcome::Applied { batch, ref files } => {
                assert_eq!(batch, 1);
                assert_eq!(files, &vec![FILE_A.to_string()]);
            }
            ref other => panic!("expected Applied replay, got {other:?}"),
        },
        other => panic!("expected Wiped, got {other:?}"),
    }
    let executed = executor.executed();
    assert_eq!(executed[0], wipe_sql("public"));
    assert!(executed[1].contains("tbl_a"));
}

#[tokio::test]
async fn fresh_declined_aborts_before_any_execution() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();

    let confirm = Answers::new(&[false]);
    let runner = Runner::new(&history, &executor, &confirm, options(dir.path()));
    let outcome = runner.run(Mode::Fresh).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Aborted));
    assert!(executor.executed().is_empty());
    assert!(history.names().is_empty());
}

#[tokio::test]
async fn fresh_in_production_asks_for_both_confirmations() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let mut opts = options(dir.path());
    opts.production = true;

    let confirm = Answers::new(&[true, true]);
    let runner = Runner::new(&history, &executor, &confirm, opts);
    let outcome = runner.run(Mode::Fresh).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Wiped { .. }));
}

// ── production gate ────────────────────────────────────────────────────

#[tokio::test]
async fn production_gate_declined_aborts_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let mut opts = options(dir.path());
    opts.production = true;

    let confirm = Answers::new(&[false]);
    let runner = Runner::new(&history, &executor, &confirm, opts);
    let outcome = runner.run(Mode::Up).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Aborted));
    assert!(executor.executed().is_empty());
    assert!(history.names().is_empty());
}

#[tokio::test]
async fn production_gate_accepted_proceeds() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let mut opts = options(dir.path());
    opts.production = true;

    let confirm = Answers::new(&[true]);
    let runner = Runner::new(&history, &executor, &confirm, opts);
    let outcome = runner.run(Mode::Up).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Applied { .. }));
}

#[tokio::test]
async fn force_skips_the_production_gate() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), FILE_A, "tbl_a");
    let history = MemoryHistory::new();
    let executor = ScriptedExecutor::default();
    let mut opts = options(dir.path());
    opts.production = true;
    opts.force = true;

    let runner = Runner::new(&history, &executor, &Untouchable, opts);
    let outcome = runner.run(Mode::Up).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Applied { .. }));
}

// ── wipe SQL ───────────────────────────────────────────────────────────

#[test]
fn wipe_sql_enumerates_the_requested_schema() {
    let sql = wipe_sql("tenant");
    assert!(sql.contains("WHERE schemaname = 'tenant'"));
    assert!(sql.contains("DROP TABLE IF EXISTS ' || quote_ident(r.tablename) || ' CASCADE"));
}

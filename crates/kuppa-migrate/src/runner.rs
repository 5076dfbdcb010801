//! Migration runner
//!
//! Per invocation the runner resolves history, computes the diff
//! against local files, executes, and records — strictly sequentially,
//! because later files may depend on earlier schema state. Any per-file
//! failure halts the run; there is no partial continuation and no
//! automatic retry.

use crate::confirm::Confirmation;
use crate::error::{MigrateError, MigrateResult};
use crate::file::{self, MigrationFile};
use crate::history::HistoryStore;
use kuppa_db::SqlExecutor;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Runner operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Up,
    Down,
    Fresh,
    Status,
}

impl Mode {
    /// Whether this mode can change the database.
    pub fn is_destructive(&self) -> bool {
        !matches!(self, Mode::Status)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Up => write!(f, "UP"),
            Mode::Down => write!(f, "DOWN"),
            Mode::Fresh => write!(f, "FRESH"),
            Mode::Status => write!(f, "STATUS"),
        }
    }
}

/// Invocation options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Application is flagged production; destructive modes must be
    /// confirmed or forced.
    pub production: bool,
    /// Skip interactive confirmations.
    pub force: bool,
    /// Directory of migration files.
    pub migrations_dir: PathBuf,
    /// Schema wiped by fresh mode.
    pub schema: String,
}

/// One line of `status` output.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub file: String,
    /// Batch the file ran in, `None` when it has not run.
    pub batch: Option<i64>,
}

impl StatusEntry {
    pub fn ran(&self) -> bool {
        self.batch.is_some()
    }
}

/// What a run did.
#[derive(Debug)]
pub enum RunOutcome {
    /// Files applied as a new batch.
    Applied { batch: i64, files: Vec<String> },
    /// Files of the most recent batch reverted, in reverse order.
    RolledBack { batch: i64, files: Vec<String> },
    /// Schema wiped; `replay` is the outcome of the follow-up up run.
    Wiped { replay: Box<RunOutcome> },
    /// No pending files.
    NothingToMigrate,
    /// No applied batch to roll back.
    NothingToRollback,
    /// Operator declined a confirmation; nothing touched.
    Aborted,
    /// A file failed; everything before it in this run succeeded,
    /// nothing after it was attempted.
    Halted {
        file: String,
        message: String,
        completed: Vec<String>,
    },
    /// Status listing, read-only.
    Status(Vec<StatusEntry>),
}

/// The migration runner.
pub struct Runner<'a> {
    history: &'a dyn HistoryStore,
    executor: &'a dyn SqlExecutor,
    confirm: &'a dyn Confirmation,
    options: RunOptions,
}

impl<'a> Runner<'a> {
    pub fn new(
        history: &'a dyn HistoryStore,
        executor: &'a dyn SqlExecutor,
        confirm: &'a dyn Confirmation,
        options: RunOptions,
    ) -> Self {
        Runner {
            history,
            executor,
            confirm,
            options,
        }
    }

    /// Execute one invocation in the given mode.
    pub async fn run(&self, mode: Mode) -> MigrateResult<RunOutcome> {
        if self.options.production && mode.is_destructive() && !self.options.force {
            let prompt = format!("Application in PRODUCTION mode. Proceed with {mode}?");
            if !self.confirm.confirm(&prompt)? {
                return Ok(RunOutcome::Aborted);
            }
        }

        if mode.is_destructive() {
            // Best effort: a failure here surfaces later as a history
            // error with better context.
            if let Err(err) = self.history.ensure_table().await {
                log::warn!("could not ensure history table: {err}");
            }
        }

        match mode {
            Mode::Up => self.up().await,
            Mode::Down => self.down().await,
            Mode::Fresh => self.fresh().await,
            Mode::Status => self.status().await,
        }
    }

    async fn up(&self) -> MigrateResult<RunOutcome> {
        let files = file::discover(&self.options.migrations_dir)?;
        let history = self.fetch_history().await?;

        let migrated: HashSet<&str> = history.iter().map(|r| r.migration.as_str()).collect();
        let last_batch = history.iter().map(|r| r.batch).max().unwrap_or(0);

        let pending: Vec<&MigrationFile> = files
            .iter()
            .filter(|f| !migrated.contains(f.name()))
            .collect();
        if pending.is_empty() {
            return Ok(RunOutcome::NothingToMigrate);
        }

        let batch = last_batch + 1;
        let mut completed = Vec::new();
        for migration in pending {
            // Membership re-check guards against a stale snapshot (for
            // example a crashed run that recorded after we fetched).
            if self.history.is_migrated(migration.name()).await? {
                log::debug!("{} already recorded, skipping", migration.name());
                continue;
            }

            if let Err(err) = self.executor.execute(migration.up()).await {
                log::error!("migration {} failed: {err}", migration.name());
                return Ok(RunOutcome::Halted {
                    file: migration.name().to_string(),
                    message: err.to_string(),
                    completed,
                });
            }
            if let Err(err) = self.history.record(migration.name(), batch).await {
                log::error!("failed to record {}: {err}", migration.name());
                return Ok(RunOutcome::Halted {
                    file: migration.name().to_string(),
                    message: err.to_string(),
                    completed,
                });
            }
            log::debug!("migrated {}", migration.name());
            completed.push(migration.name().to_string());
        }

        Ok(RunOutcome::Applied {
            batch,
            files: completed,
        })
    }

    async fn down(&self) -> MigrateResult<RunOutcome> {
        let files = file::discover(&self.options.migrations_dir)?;
        let history = self.fetch_history().await?;

        let Some(last_batch) = history.iter().map(|r| r.batch).max() else {
            return Ok(RunOutcome::NothingToRollback);
        };
        let batch_files: HashSet<&str> = history
            .iter()
            .filter(|r| r.batch == last_batch)
            .map(|r| r.migration.as_str())
            .collect();

        // Only files still present locally can be reverted; process in
        // reverse file order.
        let mut targets: Vec<&MigrationFile> = files
            .iter()
            .filter(|f| batch_files.contains(f.name()))
            .collect();
        targets.reverse();

        if targets.is_empty() {
            return Ok(RunOutcome::NothingToRollback);
        }

        let mut completed = Vec::new();
        for migration in targets {
            if let Err(err) = self.executor.execute(migration.down()).await {
                log::error!("rollback of {} failed: {err}", migration.name());
                return Ok(RunOutcome::Halted {
                    file: migration.name().to_string(),
                    message: err.to_string(),
                    completed,
                });
            }
            if let Err(err) = self.history.remove(migration.name()).await {
                log::error!("failed to delete record for {}: {err}", migration.name());
                return Ok(RunOutcome::Halted {
                    file: migration.name().to_string(),
                    message: err.to_string(),
                    completed,
                });
            }
            log::debug!("rolled back {}", migration.name());
            completed.push(migration.name().to_string());
        }

        Ok(RunOutcome::RolledBack {
            batch: last_batch,
            files: completed,
        })
    }

    async fn fresh(&self) -> MigrateResult<RunOutcome> {
        if !self.options.force && !self.confirm.confirm("WIPE all tables and history?")? {
            return Ok(RunOutcome::Aborted);
        }

        self.executor
            .execute(&wipe_sql(&self.options.schema))
            .await?;
        log::info!("schema {} wiped, replaying migrations", self.options.schema);

        let replay = self.up().await?;
        Ok(RunOutcome::Wiped {
            replay: Box::new(replay),
        })
    }

    async fn status(&self) -> MigrateResult<RunOutcome> {
        let files = file::discover(&self.options.migrations_dir)?;
        let history = self.fetch_history().await?;

        let entries = files
            .iter()
            .map(|f| StatusEntry {
                file: f.name().to_string(),
                batch: history
                    .iter()
                    .find(|r| r.migration == f.name())
                    .map(|r| r.batch),
            })
            .collect();
        Ok(RunOutcome::Status(entries))
    }

    /// Fetch history, treating a missing history table as empty state.
    async fn fetch_history(&self) -> MigrateResult<Vec<crate::history::MigrationRecord>> {
        match self.history.fetch_all().await {
            Ok(records) => Ok(records),
            Err(MigrateError::HistoryFetch(err)) if err.is_missing_relation() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }
}

/// DO-block dropping every table in `schema`, cascading.
///
/// Enumerating `pg_tables` at execution time means an empty schema
/// drops nothing and still succeeds.
pub fn wipe_sql(schema: &str) -> String {
    format!(
        r#"DO $$ DECLARE r RECORD;
BEGIN
    FOR r IN (SELECT tablename FROM pg_tables WHERE schemaname = '{schema}') LOOP
        EXECUTE 'DROP TABLE IF EXISTS ' || quote_ident(r.tablename) || ' CASCADE';
    END LOOP;
END $$;"#
    )
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;

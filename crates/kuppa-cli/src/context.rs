//! Runtime context for CLI commands

use anyhow::{Context, Result};
use kuppa_core::Config;
use kuppa_db::SupabaseClient;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Runtime context containing the loaded configuration.
pub struct RuntimeContext {
    /// The loaded configuration
    pub config: Config,

    /// Project root directory
    pub project_dir: PathBuf,

    /// Verbose output enabled
    pub verbose: bool,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments.
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let project_dir = PathBuf::from(&args.project_dir);

        let config = if let Some(config_path) = &args.config {
            Config::load(Path::new(config_path)).context("Failed to load configuration file")?
        } else {
            Config::load_or_default(&project_dir).context("Failed to load project configuration")?
        };

        Ok(Self {
            config,
            project_dir,
            verbose: args.verbose,
        })
    }

    /// Absolute-ish path to the migrations directory.
    pub fn migrations_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.migrations_path)
    }

    /// Connect to the backend, or `None` when database features are
    /// disabled (missing credentials or `enabled: false`).
    ///
    /// Callers print the warning and exit cleanly; a half-configured
    /// project must not produce a stack trace.
    pub fn connect(&self) -> Result<Option<SupabaseClient>> {
        match self.config.database.credentials() {
            Some(credentials) => {
                let client = SupabaseClient::connect(&credentials)
                    .context("Failed to initialize database client")?;
                Ok(Some(client))
            }
            None => Ok(None),
        }
    }

    /// Print verbose output if enabled.
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {msg}");
        }
    }
}

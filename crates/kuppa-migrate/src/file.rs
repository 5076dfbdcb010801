//! On-disk migration files
//!
//! One `.sql` file per change set, named
//! `<YYYY_MM_DD_HHMMSS>_<descriptive_name>.sql` so lexicographic order
//! is also chronological. Each file carries two sections delimited by
//! the `-- kuppa:up` and `-- kuppa:down` markers. Files are written by
//! the generator and never mutated in place.

use crate::error::{MigrateError, MigrateResult};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Marker opening the apply section.
pub const UP_MARKER: &str = "-- kuppa:up";
/// Marker opening the revert section.
pub const DOWN_MARKER: &str = "-- kuppa:down";

/// A parsed migration file.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    name: String,
    up_sql: String,
    down_sql: String,
}

impl MigrationFile {
    /// Parse file content into its up and down sections.
    ///
    /// Both markers are required, up before down. Text before the up
    /// marker (headers, comments) is ignored.
    pub fn parse(name: &str, content: &str) -> MigrateResult<Self> {
        let invalid = |message: &str| MigrateError::InvalidFile {
            name: name.to_string(),
            message: message.to_string(),
        };

        let up_start = content
            .find(UP_MARKER)
            .ok_or_else(|| invalid("missing `-- kuppa:up` marker"))?;
        let down_start = content
            .find(DOWN_MARKER)
            .ok_or_else(|| invalid("missing `-- kuppa:down` marker"))?;
        if down_start < up_start {
            return Err(invalid("`-- kuppa:down` section precedes `-- kuppa:up`"));
        }

        let up_sql = content[up_start + UP_MARKER.len()..down_start]
            .trim()
            .to_string();
        let down_sql = content[down_start + DOWN_MARKER.len()..]
            .trim()
            .to_string();

        Ok(MigrationFile {
            name: name.to_string(),
            up_sql,
            down_sql,
        })
    }

    /// Load and parse a migration file from disk.
    pub fn load(path: &Path) -> MigrateResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&name, &content)
    }

    /// The file name, which doubles as the history record key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SQL applied on migrate.
    pub fn up(&self) -> &str {
        &self.up_sql
    }

    /// SQL applied on rollback.
    pub fn down(&self) -> &str {
        &self.down_sql
    }
}

/// Enumerate the migration files in `dir`, sorted by filename.
pub fn discover(dir: &Path) -> MigrateResult<Vec<MigrationFile>> {
    if !dir.is_dir() {
        return Err(MigrateError::DirNotFound {
            path: dir.display().to_string(),
        });
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    paths.sort();

    paths.iter().map(|p| MigrationFile::load(p)).collect()
}

/// Render the canonical migration filename for a timestamp and name.
pub fn filename(timestamp: DateTime<Utc>, name: &str) -> String {
    format!("{}_{}.sql", timestamp.format("%Y_%m_%d_%H%M%S"), name)
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

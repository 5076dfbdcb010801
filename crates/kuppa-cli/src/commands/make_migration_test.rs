//! Tests for the migration generator.

use crate::cli::{GlobalArgs, MakeMigrationArgs};
use crate::commands::make_migration::{execute, render_migration, table_name_from};
use kuppa_migrate::MigrationFile;

fn global(dir: &std::path::Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir.display().to_string(),
        config: None,
    }
}

#[test]
fn table_name_extraction() {
    assert_eq!(table_name_from("create_posts_table").as_deref(), Some("posts"));
    assert_eq!(table_name_from("create_user_roles_table").as_deref(), Some("user_roles"));
    assert!(table_name_from("add_index_to_posts").is_none());
    assert!(table_name_from("create__table").is_none());
}

#[test]
fn create_table_name_scaffolds_full_skeleton() {
    let content = render_migration("create_posts_table");
    assert!(content.contains("CREATE TABLE IF NOT EXISTS posts"));
    assert!(content.contains("id UUID PRIMARY KEY DEFAULT gen_random_uuid()"));
    assert!(content.contains("created_at TIMESTAMP WITH TIME ZONE"));
    assert!(content.contains("ENABLE ROW LEVEL SECURITY"));
    assert!(content.contains("DROP TABLE IF EXISTS posts CASCADE;"));
}

#[test]
fn other_names_scaffold_empty_sections() {
    let content = render_migration("add_index_to_posts");
    assert!(content.contains("-- kuppa:up"));
    assert!(content.contains("-- kuppa:down"));
    assert!(!content.contains("CREATE TABLE"));
}

#[test]
fn rendered_skeletons_parse_as_migration_files() {
    for name in ["create_posts_table", "add_index_to_posts"] {
        let content = render_migration(name);
        let file = MigrationFile::parse("x.sql", &content).unwrap();
        if name.starts_with("create_") {
            assert!(file.up().contains("CREATE TABLE"));
            assert!(file.down().contains("DROP TABLE"));
        }
    }
}

#[test]
fn execute_writes_a_parseable_file() {
    let dir = tempfile::tempdir().unwrap();
    let args = MakeMigrationArgs {
        name: "create_posts_table".to_string(),
    };
    execute(&args, &global(dir.path())).unwrap();

    let migrations = dir.path().join("app/migrations");
    let entries: Vec<_> = std::fs::read_dir(&migrations)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().unwrap().to_string_lossy();
    assert!(name.ends_with("_create_posts_table.sql"));
    MigrationFile::load(&entries[0]).unwrap();
}

#[test]
fn execute_rejects_traversal_names() {
    let dir = tempfile::tempdir().unwrap();
    for bad in ["../escape", "a/b", ".hidden", "-flag"] {
        let args = MakeMigrationArgs {
            name: bad.to_string(),
        };
        assert!(execute(&args, &global(dir.path())).is_err(), "accepted {bad}");
    }
}

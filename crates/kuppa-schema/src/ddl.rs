//! Migration definition vocabulary
//!
//! The operations a migration is written in terms of: `create_table`,
//! `drop_table`, `rename_table`, and `raw`. All of them return SQL text;
//! executing it is the runner's job.

use crate::table::Table;

/// Create a table and wire up row level security for it.
///
/// Supabase denies access to new tables until RLS is enabled and a
/// policy exists, so the rendered DDL enables RLS and adds a permissive
/// allow-all policy. The policy creation is guarded by a `pg_policy`
/// existence check, keeping the whole statement safe to re-run.
pub fn create_table(name: &str, build: impl FnOnce(&mut Table)) -> String {
    let mut table = Table::new();
    build(&mut table);
    let table_sql = table.build(name);

    format!(
        r#"{table_sql}
ALTER TABLE public.{name} ENABLE ROW LEVEL SECURITY;
DO $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM pg_policy WHERE polname = 'Enable access for all' AND polrelid = 'public.{name}'::regclass) THEN
        CREATE POLICY "Enable access for all" ON public.{name} FOR ALL USING (true) WITH CHECK (true);
    END IF;
END $$;"#
    )
}

/// Drop a table, cascading to dependent objects.
pub fn drop_table(name: &str) -> String {
    format!("DROP TABLE IF EXISTS {name} CASCADE;")
}

/// Rename an existing table.
pub fn rename_table(from: &str, to: &str) -> String {
    format!("ALTER TABLE {from} RENAME TO {to};")
}

/// Manual SQL escape hatch.
pub fn raw(sql: &str) -> String {
    sql.to_string()
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod tests;

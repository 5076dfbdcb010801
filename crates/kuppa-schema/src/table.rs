//! Table builder rendering CREATE TABLE statements

use crate::column::{quote_literal, ColumnDefinition};

/// An in-progress table definition: ordered columns plus free-form
/// constraint strings.
///
/// Built once per `create_table` call, rendered to a single DDL string
/// by [`build`], and not retained afterward.
///
/// ```
/// use kuppa_schema::Table;
///
/// let mut t = Table::new();
/// t.id();
/// t.string("title").unique();
/// t.timestamps();
/// let ddl = t.build("posts");
/// assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS posts"));
/// ```
///
/// [`build`]: Table::build
#[derive(Debug, Default)]
pub struct Table {
    columns: Vec<ColumnDefinition>,
    constraints: Vec<String>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    fn add_column(&mut self, name: &str, sql_type: &str) -> &mut ColumnDefinition {
        self.columns.push(ColumnDefinition::new(name, sql_type));
        self.columns.last_mut().unwrap()
    }

    /// UUID primary key named `id`, defaulting to a random UUID.
    pub fn id(&mut self) -> &mut ColumnDefinition {
        let column = self.add_column("id", "UUID");
        column.primary_key().default_expr("gen_random_uuid()");
        column
    }

    /// UUID column.
    pub fn uuid(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, "UUID")
    }

    /// Short text column (TEXT in Postgres; length limits add nothing).
    pub fn string(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, "TEXT")
    }

    /// Long text column.
    pub fn text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, "TEXT")
    }

    /// Integer column (BIGINT).
    pub fn integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, "BIGINT")
    }

    /// Boolean column.
    pub fn boolean(&mut self, name: &str) -> &mut ColumnDefinition {
        self.add_column(name, "BOOLEAN")
    }

    /// Fixed-precision numeric column.
    pub fn decimal(&mut self, name: &str, precision: u8, scale: u8) -> &mut ColumnDefinition {
        self.add_column(name, &format!("NUMERIC({precision}, {scale})"))
    }

    /// Enumerated TEXT column constrained by a CHECK over the allowed
    /// values.
    pub fn enum_(&mut self, name: &str, allowed: &[&str]) -> &mut ColumnDefinition {
        let values = allowed
            .iter()
            .map(|v| quote_literal(v))
            .collect::<Vec<_>>()
            .join(", ");
        self.constraints
            .push(format!("CONSTRAINT {name}_check CHECK ({name} IN ({values}))"));
        self.add_column(name, "TEXT")
    }

    /// `created_at` and `updated_at` timestamps, timezone-aware, NOT
    /// NULL, defaulting to NOW().
    pub fn timestamps(&mut self) {
        self.add_column("created_at", "TIMESTAMP WITH TIME ZONE")
            .default_expr("NOW()");
        self.add_column("updated_at", "TIMESTAMP WITH TIME ZONE")
            .default_expr("NOW()");
    }

    /// Append a free-form table constraint verbatim.
    pub fn constraint(&mut self, sql: &str) {
        self.constraints.push(sql.to_string());
    }

    /// Render the full `CREATE TABLE IF NOT EXISTS` statement.
    ///
    /// Columns appear in declaration order, followed by explicit
    /// constraints in declaration order, followed by foreign keys in
    /// column order.
    pub fn build(self, table_name: &str) -> String {
        let mut lines: Vec<String> = self.columns.iter().map(|c| c.render()).collect();
        lines.extend(self.constraints);
        lines.extend(self.columns.iter().filter_map(|c| c.render_foreign_key()));

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n);",
            table_name,
            lines.join(",\n  ")
        )
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;

//! Column definitions and the chainable column handle

use std::fmt;

/// Referential action for a foreign key's ON DELETE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDelete {
    #[default]
    Cascade,
    Restrict,
    SetNull,
    NoAction,
}

impl fmt::Display for OnDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnDelete::Cascade => write!(f, "CASCADE"),
            OnDelete::Restrict => write!(f, "RESTRICT"),
            OnDelete::SetNull => write!(f, "SET NULL"),
            OnDelete::NoAction => write!(f, "NO ACTION"),
        }
    }
}

/// Foreign key target for a column.
#[derive(Debug, Clone)]
pub(crate) struct ForeignKey {
    pub(crate) table: String,
    pub(crate) column: String,
    pub(crate) on_delete: OnDelete,
}

/// A single column in a table definition.
///
/// Columns default to NOT NULL. The handle returned by the [`Table`]
/// type methods is chainable; once the table is rendered the definition
/// is consumed and cannot change.
///
/// [`Table`]: crate::table::Table
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub(crate) name: String,
    sql_type: String,
    primary_key: bool,
    nullable: bool,
    default: Option<String>,
    unique: bool,
    pub(crate) foreign_key: Option<ForeignKey>,
}

impl ColumnDefinition {
    pub(crate) fn new(name: &str, sql_type: &str) -> Self {
        ColumnDefinition {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            primary_key: false,
            nullable: false,
            default: None,
            unique: false,
            foreign_key: None,
        }
    }

    pub(crate) fn primary_key(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    /// Allow NULL values for this column.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Set a default value with string-literal quoting.
    ///
    /// A value containing call syntax (an opening and closing
    /// parenthesis) is treated as an expression and passed through
    /// verbatim; anything else is quoted as a string literal with
    /// embedded quotes doubled. Use [`default_expr`] to bypass the
    /// heuristic entirely.
    ///
    /// [`default_expr`]: ColumnDefinition::default_expr
    pub fn default_value(&mut self, value: &str) -> &mut Self {
        self.default = Some(render_default(value));
        self
    }

    /// Set a default expression verbatim, with no quoting.
    pub fn default_expr(&mut self, expr: &str) -> &mut Self {
        self.default = Some(expr.to_string());
        self
    }

    /// Add a UNIQUE constraint on this column.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Reference another table's `id` column as a foreign key.
    ///
    /// ON DELETE defaults to CASCADE; change it with [`on_delete`].
    ///
    /// [`on_delete`]: ColumnDefinition::on_delete
    pub fn references(&mut self, table: &str) -> &mut Self {
        self.references_column(table, "id")
    }

    /// Reference a specific column of another table as a foreign key.
    pub fn references_column(&mut self, table: &str, column: &str) -> &mut Self {
        self.foreign_key = Some(ForeignKey {
            table: table.to_string(),
            column: column.to_string(),
            on_delete: OnDelete::default(),
        });
        self
    }

    /// Set the ON DELETE action of a previously declared foreign key.
    ///
    /// A no-op when no `references` call preceded it.
    pub fn on_delete(&mut self, action: OnDelete) -> &mut Self {
        if let Some(fk) = self.foreign_key.as_mut() {
            fk.on_delete = action;
        }
        self
    }

    /// Render the column clause: `name TYPE [UNIQUE] [DEFAULT x] [NOT NULL]`.
    pub(crate) fn render(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        // PRIMARY KEY already implies NOT NULL
        if !self.nullable && !self.primary_key {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    /// Render the table-level FOREIGN KEY constraint, if any.
    pub(crate) fn render_foreign_key(&self) -> Option<String> {
        self.foreign_key.as_ref().map(|fk| {
            format!(
                "FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE {}",
                self.name, fk.table, fk.column, fk.on_delete
            )
        })
    }
}

/// Quote a string as a SQL literal, doubling embedded quotes.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Apply the default-value quoting heuristic: call syntax passes
/// through, everything else becomes a quoted literal.
fn render_default(value: &str) -> String {
    let looks_like_call = value
        .find('(')
        .and_then(|open| value.rfind(')').map(|close| open < close))
        .unwrap_or(false);
    if looks_like_call {
        value.to_string()
    } else {
        quote_literal(value)
    }
}

#[cfg(test)]
#[path = "column_test.rs"]
mod tests;

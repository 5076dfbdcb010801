//! Tests for column rendering and the default-value quoting heuristic.

use crate::column::{ColumnDefinition, OnDelete};

#[test]
fn plain_column_is_not_null() {
    let col = ColumnDefinition::new("title", "TEXT");
    assert_eq!(col.render(), "title TEXT NOT NULL");
}

#[test]
fn nullable_drops_not_null() {
    let mut col = ColumnDefinition::new("subtitle", "TEXT");
    col.nullable();
    assert_eq!(col.render(), "subtitle TEXT");
}

#[test]
fn unique_and_default_order() {
    let mut col = ColumnDefinition::new("slug", "TEXT");
    col.unique().default_value("untitled");
    assert_eq!(col.render(), "slug TEXT UNIQUE DEFAULT 'untitled' NOT NULL");
}

#[test]
fn plain_string_default_is_quoted() {
    let mut col = ColumnDefinition::new("status", "TEXT");
    col.default_value("draft");
    assert_eq!(col.render(), "status TEXT DEFAULT 'draft' NOT NULL");
}

#[test]
fn call_syntax_default_is_not_quoted() {
    let mut col = ColumnDefinition::new("created", "TIMESTAMP WITH TIME ZONE");
    col.default_value("NOW()");
    assert_eq!(
        col.render(),
        "created TIMESTAMP WITH TIME ZONE DEFAULT NOW() NOT NULL"
    );
}

#[test]
fn nested_call_default_is_not_quoted() {
    let mut col = ColumnDefinition::new("code", "TEXT");
    col.default_value("upper(substr(md5(random()::text), 1, 8))");
    assert!(col.render().contains("DEFAULT upper(substr"));
}

#[test]
fn unbalanced_parenthesis_is_still_a_literal() {
    // ")(" is not call syntax; neither is a lone "(".
    let mut col = ColumnDefinition::new("note", "TEXT");
    col.default_value("a ) b ( c");
    assert_eq!(col.render(), "note TEXT DEFAULT 'a ) b ( c' NOT NULL");
}

#[test]
fn embedded_quote_is_doubled() {
    let mut col = ColumnDefinition::new("greeting", "TEXT");
    col.default_value("it's");
    assert_eq!(col.render(), "greeting TEXT DEFAULT 'it''s' NOT NULL");
}

#[test]
fn default_expr_bypasses_quoting() {
    let mut col = ColumnDefinition::new("count", "BIGINT");
    col.default_expr("0");
    assert_eq!(col.render(), "count BIGINT DEFAULT 0 NOT NULL");
}

#[test]
fn references_defaults_to_id_and_cascade() {
    let mut col = ColumnDefinition::new("author_id", "UUID");
    col.references("users");
    assert_eq!(
        col.render_foreign_key().unwrap(),
        "FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE"
    );
}

#[test]
fn references_column_and_on_delete() {
    let mut col = ColumnDefinition::new("owner", "TEXT");
    col.references_column("accounts", "email")
        .on_delete(OnDelete::SetNull);
    assert_eq!(
        col.render_foreign_key().unwrap(),
        "FOREIGN KEY (owner) REFERENCES accounts(email) ON DELETE SET NULL"
    );
}

#[test]
fn on_delete_without_references_is_a_noop() {
    let mut col = ColumnDefinition::new("author_id", "UUID");
    col.on_delete(OnDelete::Restrict);
    assert!(col.render_foreign_key().is_none());
}

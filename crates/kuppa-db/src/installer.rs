//! Self-installation DDL for the raw-SQL remote procedure
//!
//! The backend's REST surface cannot run DDL, so the whole migration
//! core hinges on one `SECURITY DEFINER` function being present. The
//! installer drops and recreates it on every invocation and re-grants
//! execute to every backend role, so drift or an accidental revocation
//! heals itself the next time anything installs.

/// Name of the remote procedure the bridge calls.
pub const SQL_FUNCTION: &str = "kuppa_execute_sql";

/// Ask PostgREST to reload its schema cache.
///
/// Needed after creating tables or functions that the REST surface must
/// see immediately, before its periodic reload would pick them up.
pub const SCHEMA_RELOAD_SQL: &str = "NOTIFY pgrst, 'reload schema';";

/// DDL that (re)installs the remote procedure and its grants.
///
/// The function wraps SELECT statements in `jsonb_agg` so the caller
/// receives a JSON array of rows, and executes anything else as a bare
/// statement. The EXCEPTION block re-executes the statement and
/// discards the original error; that lossy fallback is part of the
/// deployed contract and is pinned by a test rather than silently
/// trusted.
pub fn installer_sql() -> &'static str {
    r#"DROP FUNCTION IF EXISTS kuppa_execute_sql(text);

CREATE OR REPLACE FUNCTION kuppa_execute_sql(sql_query TEXT)
RETURNS JSONB AS $$
DECLARE
    result JSONB;
BEGIN
    IF (LOWER(sql_query) LIKE 'select%') THEN
        EXECUTE 'SELECT jsonb_agg(t) FROM (' || sql_query || ') t' INTO result;
        RETURN result;
    ELSE
        EXECUTE sql_query;
        RETURN NULL;
    END IF;
EXCEPTION WHEN OTHERS THEN
    EXECUTE sql_query;
    RETURN NULL;
END;
$$ LANGUAGE plpgsql SECURITY DEFINER;

GRANT EXECUTE ON FUNCTION kuppa_execute_sql(text) TO postgres;
GRANT EXECUTE ON FUNCTION kuppa_execute_sql(text) TO anon;
GRANT EXECUTE ON FUNCTION kuppa_execute_sql(text) TO authenticated;
GRANT EXECUTE ON FUNCTION kuppa_execute_sql(text) TO service_role;

NOTIFY pgrst, 'reload schema';"#
}

#[cfg(test)]
#[path = "installer_test.rs"]
mod tests;

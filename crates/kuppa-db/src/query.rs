//! Fluent query builder for the per-table REST interface

use crate::client::SupabaseClient;
use crate::error::{DbError, DbResult};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// A single request against one table, built up by chaining and fired
/// by one of the terminal methods ([`fetch`], [`fetch_one`],
/// [`execute`]).
///
/// Each chaining method consumes and returns the builder, so a query is
/// a value assembled in one expression, never shared mutable state.
///
/// [`fetch`]: TableQuery::fetch
/// [`fetch_one`]: TableQuery::fetch_one
/// [`execute`]: TableQuery::execute
#[derive(Debug)]
pub struct TableQuery {
    client: SupabaseClient,
    table: String,
    method: Method,
    params: Vec<(String, String)>,
    body: Option<Value>,
    single: bool,
    prefer: Option<&'static str>,
}

impl TableQuery {
    pub(crate) fn new(client: SupabaseClient, table: &str) -> Self {
        TableQuery {
            client,
            table: table.to_string(),
            method: Method::GET,
            params: Vec::new(),
            body: None,
            single: false,
            prefer: None,
        }
    }

    /// Choose the columns to return.
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    /// Filter rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Order results by a column.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    /// Cap the number of returned rows.
    pub fn limit(mut self, count: usize) -> Self {
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    /// Request exactly one row (the backend errors on zero or many).
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Insert one row or an array of rows.
    pub fn insert(mut self, rows: Value) -> Self {
        self.method = Method::POST;
        self.body = Some(rows);
        self.prefer = Some("return=minimal");
        self
    }

    /// Update rows matched by the current filters.
    pub fn update(mut self, values: Value) -> Self {
        self.method = Method::PATCH;
        self.body = Some(values);
        self.prefer = Some("return=minimal");
        self
    }

    /// Delete rows matched by the current filters.
    pub fn delete(mut self) -> Self {
        self.method = Method::DELETE;
        self.prefer = Some("return=minimal");
        self
    }

    /// Run the query and decode all rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> DbResult<Vec<T>> {
        let body = self.send().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Run the query and decode a single row.
    pub async fn fetch_one<T: DeserializeOwned>(self) -> DbResult<T> {
        let body = self.single().send().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Run the query, discarding any response body.
    pub async fn execute(self) -> DbResult<()> {
        self.send().await?;
        Ok(())
    }

    pub(crate) fn url(&self) -> DbResult<Url> {
        let mut url = self.client.endpoint(&["rest", "v1", &self.table])?;
        if !self.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub(crate) fn method(&self) -> &Method {
        &self.method
    }

    pub(crate) fn prefer_header(&self) -> Option<&'static str> {
        self.prefer
    }

    async fn send(self) -> DbResult<String> {
        let url = self.url()?;
        log::debug!("{} {}", self.method, url.path());
        let mut request = self.client.http().request(self.method.clone(), url);
        if self.single {
            request = request.header(ACCEPT, "application/vnd.pgrst.object+json");
        }
        if let Some(prefer) = self.prefer {
            request = request.header("Prefer", prefer);
        }
        if let Some(body) = &self.body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(DbError::from)?;
        SupabaseClient::check(response).await
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;

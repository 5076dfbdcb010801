//! Supabase REST client

use crate::error::{DbError, DbResult};
use crate::query::TableQuery;
use kuppa_core::Credentials;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Error body shape returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    hint: Option<String>,
}

/// Client for the Supabase REST surface.
///
/// Holds the project URL and service key; every request carries the
/// `apikey` and bearer headers. Cheap to clone — the underlying HTTP
/// client is reference counted.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base: Url,
}

impl SupabaseClient {
    /// Build a client from a project URL and service key.
    pub fn new(url: &str, key: &str) -> DbResult<Self> {
        let base = Url::parse(url).map_err(|e| DbError::ConnectionError(format!("{url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(DbError::ConnectionError(format!(
                "{url}: not a usable base URL"
            )));
        }

        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(key)
            .map_err(|_| DbError::ConnectionError("invalid characters in key".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| DbError::ConnectionError("invalid characters in key".to_string()))?;
        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            "x-application-name",
            HeaderValue::from_static("kuppa"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        Ok(SupabaseClient { http, base })
    }

    /// Build a client from resolved configuration credentials.
    pub fn connect(credentials: &Credentials) -> DbResult<Self> {
        Self::new(&credentials.url, &credentials.key)
    }

    /// Start a query against one table.
    pub fn from(&self, table: &str) -> TableQuery {
        TableQuery::new(self.clone(), table)
    }

    /// Invoke a remote procedure with JSON parameters.
    pub async fn rpc(&self, function: &str, params: Value) -> DbResult<Value> {
        let url = self.endpoint(&["rest", "v1", "rpc", function])?;
        log::debug!("rpc {function}");
        let response = self.http.post(url).json(&params).send().await?;
        let body = Self::check(response).await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Build an absolute endpoint URL from path segments.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> DbResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DbError::ConnectionError("URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Turn a response into its body text, converting non-2xx statuses
    /// into classified [`DbError::Api`] values.
    pub(crate) async fn check(response: reqwest::Response) -> DbResult<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = if parsed.message.is_empty() {
            body.chars().take(200).collect()
        } else {
            parsed.message
        };
        if let Some(hint) = parsed.hint {
            log::debug!("backend hint: {hint}");
        }
        Err(DbError::Api {
            status: status.as_u16(),
            code: parsed.code,
            message,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use tracing::debug;

use crate::error::DirectoryError;
use crate::traits::{Directory, Row};

/// RestDirectory talks to a PostgREST-style table endpoint
/// (`{base_url}/rest/v1/{table}`), as exposed by Supabase.
///
/// Every request carries the API key both as `apikey` and as a bearer
/// token, and asks for `return=representation` so writes echo the rows
/// they touched. Each request is bounded by the timeout given to
/// [`RestDirectory::new`]; a store that does not answer in time surfaces as
/// [`DirectoryError::Remote`].
pub struct RestDirectory {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RestDirectory {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: table_endpoint(base_url, table),
            api_key: api_key.into(),
        })
    }

    /// The table URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.http
            .request(method, &self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
    }

    async fn rows(&self, builder: RequestBuilder) -> Result<Vec<Row>, DirectoryError> {
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = remote_message(&body);
            debug!(%status, "directory call failed: {}", message);
            return Err(if status == StatusCode::CONFLICT {
                DirectoryError::Conflict(message)
            } else {
                DirectoryError::Remote(message)
            });
        }

        parse_rows(&body)
    }
}

#[async_trait]
impl Directory for RestDirectory {
    async fn insert(&self, fields: Row) -> Result<Row, DirectoryError> {
        let rows = self.rows(self.request(Method::POST).json(&fields)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DirectoryError::Decode("insert returned no rows".into()))
    }

    async fn select_by(&self, filters: &[(&str, &str)]) -> Result<Vec<Row>, DirectoryError> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(eq_filters(filters));
        self.rows(self.request(Method::GET).query(&query)).await
    }

    async fn update(&self, id: &str, fields: Row) -> Result<Option<Row>, DirectoryError> {
        let rows = self
            .rows(
                self.request(Method::PATCH)
                    .query(&eq_filters(&[("id", id)]))
                    .json(&fields),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<bool, DirectoryError> {
        let rows = self
            .rows(self.request(Method::DELETE).query(&eq_filters(&[("id", id)])))
            .await?;
        Ok(!rows.is_empty())
    }
}

/// Build `{base_url}/rest/v1/{table}`, tolerating a trailing slash.
fn table_endpoint(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
}

/// Column equality filters in PostgREST syntax: `col=eq.value`.
fn eq_filters(filters: &[(&str, &str)]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(column, value)| (column.to_string(), format!("eq.{}", value)))
        .collect()
}

/// Extract the error message from a PostgREST error body, or fall back to
/// the raw body.
fn remote_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn parse_rows(body: &str) -> Result<Vec<Row>, DirectoryError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| DirectoryError::Decode(e.to_string()))?;
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(row) => Ok(row),
                other => Err(DirectoryError::Decode(format!("row is not an object: {}", other))),
            })
            .collect(),
        serde_json::Value::Object(row) => Ok(vec![row]),
        other => Err(DirectoryError::Decode(format!("expected rows, got {}", other))),
    }
}

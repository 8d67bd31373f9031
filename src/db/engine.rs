//! Supabase PostgREST engine
//!
//! Every query runs with the caller's own access token so the project's
//! row-level security policies scope the results.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SupabaseSettings;
use crate::errors::{AppError, AppResult};

const RETURN_ROWS: &str = "return=representation";

/// Query parameters in PostgREST form, e.g. `("user_id", "eq.<id>")`
pub type Query<'q> = [(&'q str, String)];

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Connection details for the Supabase REST interface
pub struct SupabaseEngine {
    client: Client,
    rest_url: String,
    anon_key: String,
}

impl SupabaseEngine {
    pub fn new(settings: &SupabaseSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            rest_url: settings.rest_url(),
            anon_key: settings.anon_key.clone(),
        }
    }

    /// Queries on behalf of the user owning `token`
    pub fn scoped<'a>(&'a self, token: &'a str) -> DbScope<'a> {
        DbScope {
            engine: self,
            token,
        }
    }

    fn is_configured(&self) -> bool {
        !self.anon_key.is_empty() && self.rest_url.starts_with("http")
    }
}

/// A user-scoped view of the database
pub struct DbScope<'a> {
    engine: &'a SupabaseEngine,
    token: &'a str,
}

impl DbScope<'_> {
    fn request(&self, method: Method, table: &str, prefer: &str) -> AppResult<RequestBuilder> {
        if !self.engine.is_configured() {
            return Err(AppError::Config("Supabase is not configured".into()));
        }

        Ok(self
            .engine
            .client
            .request(method, format!("{}/{}", self.engine.rest_url, table))
            .header("apikey", &self.engine.anon_key)
            .bearer_auth(self.token)
            .header("Prefer", prefer))
    }

    /// `GET /<table>?<query>`
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query<'_>) -> AppResult<Vec<T>> {
        let resp = self.request(Method::GET, table, RETURN_ROWS)?.query(query).send().await?;
        read_rows(table, resp).await
    }

    /// `POST /<table>`
    pub async fn insert<T, B>(&self, table: &str, body: &B) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self.request(Method::POST, table, RETURN_ROWS)?.json(body).send().await?;
        read_rows(table, resp).await
    }

    /// `POST /<table>?on_conflict=<columns>` merging duplicates
    pub async fn upsert<T, B>(&self, table: &str, on_conflict: &str, body: &B) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .request(
                Method::POST,
                table,
                "resolution=merge-duplicates,return=representation",
            )?
            .query(&[("on_conflict", on_conflict)])
            .json(body)
            .send()
            .await?;
        read_rows(table, resp).await
    }

    /// `PATCH /<table>?<query>`
    pub async fn update<T, B>(&self, table: &str, query: &Query<'_>, body: &B) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .request(Method::PATCH, table, RETURN_ROWS)?
            .query(query)
            .json(body)
            .send()
            .await?;
        read_rows(table, resp).await
    }

    /// `DELETE /<table>?<query>`, returns the deleted rows
    pub async fn delete<T: DeserializeOwned>(&self, table: &str, query: &Query<'_>) -> AppResult<Vec<T>> {
        let resp = self.request(Method::DELETE, table, RETURN_ROWS)?.query(query).send().await?;
        read_rows(table, resp).await
    }
}

/// `eq.<value>` filter
pub fn eq(value: impl AsRef<str>) -> String {
    format!("eq.{}", value.as_ref())
}

async fn read_rows<T: DeserializeOwned>(table: &str, resp: Response) -> AppResult<Vec<T>> {
    let status = resp.status();

    if status == StatusCode::NO_CONTENT {
        return Ok(Vec::new());
    }

    if status.is_success() {
        return resp.json::<Vec<T>>().await.map_err(|e| {
            AppError::Upstream(format!("Unexpected response from table '{}': {}", table, e))
        });
    }

    let body = resp.text().await.unwrap_or_default();
    let parsed: Option<PostgrestError> = serde_json::from_str(&body).ok();
    let (code, message) = match parsed {
        Some(err) => {
            let message = match (err.message, err.details) {
                (Some(m), Some(d)) => format!("{} ({})", m, d),
                (Some(m), None) => m,
                (None, Some(d)) => d,
                (None, None) => status.to_string(),
            };
            (err.code.unwrap_or_default(), message)
        }
        None => (String::new(), status.to_string()),
    };

    tracing::warn!("Supabase error on '{}': {} {} {}", table, status, code, message);

    Err(match status {
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ if code == "23505" => AppError::Conflict(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::Upstream(message),
    })
}

//! Dropbox HTTP API client
//!
//! Covers the OAuth code flow (authorize, exchange, refresh, revoke) and the
//! handful of file endpoints the library needs: folder listing, temporary
//! links and uploads.

use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::DropboxSettings;
use crate::errors::{AppError, AppResult};

const USER_AGENT: &str = concat!("soundvault/", env!("CARGO_PKG_VERSION"));

/// Body of a successful `oauth2/token` call
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Only issued for the authorization code grant
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Error body of the `oauth2/token` endpoint
#[derive(Debug, Default, Deserialize)]
struct OAuthError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// File or folder metadata as returned by the files endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(rename = ".tag", default)]
    pub tag: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl FileEntry {
    pub fn is_file(&self) -> bool {
        self.tag == "file"
    }
}

/// One page of `files/list_folder`
#[derive(Debug, Clone, Deserialize)]
pub struct ListFolderPage {
    pub entries: Vec<FileEntry>,
    #[serde(default)]
    pub cursor: String,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
struct TemporaryLink {
    link: String,
}

#[derive(Serialize)]
struct UploadArg<'a> {
    path: String,
    mode: &'a str,
    autorename: bool,
}

pub struct DropboxClient {
    client: Client,
    settings: DropboxSettings,
}

impl DropboxClient {
    pub fn new(settings: DropboxSettings) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self { client, settings }
    }

    pub fn settings(&self) -> &DropboxSettings {
        &self.settings
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.settings.app_key.is_empty() || self.settings.app_secret.is_empty() {
            return Err(AppError::Config(
                "Dropbox app credentials are not configured".into(),
            ));
        }
        Ok(())
    }

    /// Consent page the browser is sent to
    pub fn authorize_url(&self, state: &str) -> AppResult<String> {
        self.ensure_configured()?;

        let url = Url::parse_with_params(
            &self.settings.authorize_url,
            &[
                ("client_id", self.settings.app_key.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("response_type", "code"),
                ("token_access_type", "offline"),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Config(format!("Invalid Dropbox authorize url: {}", e)))?;

        Ok(url.to_string())
    }

    /// Trade an authorization code for access and refresh tokens
    pub async fn exchange_code(&self, code: &str) -> AppResult<TokenGrant> {
        self.ensure_configured()?;

        let resp = self
            .client
            .post(&self.settings.oauth_url)
            .basic_auth(&self.settings.app_key, Some(&self.settings.app_secret))
            .form(&[
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = read_oauth_error(resp).await;
            let description = err
                .error_description
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
            warn!("Dropbox code exchange failed: {} {}", status, description);

            return Err(AppError::dropbox_with(
                format!("Failed to exchange authorization code: {}", description),
                err.error.unwrap_or_else(|| "unknown_error".to_string()),
                description,
            ));
        }

        Ok(resp.json().await?)
    }

    /// Obtain a new access token from a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenGrant> {
        self.ensure_configured()?;

        let resp = self
            .client
            .post(&self.settings.oauth_url)
            .basic_auth(&self.settings.app_key, Some(&self.settings.app_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = read_oauth_error(resp).await;
            warn!("Dropbox token refresh failed: {} {:?}", status, err.error);

            return Err(AppError::dropbox_with(
                "Failed to refresh token",
                err.error.unwrap_or_else(|| "unknown_error".to_string()),
                err.error_description
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
            ));
        }

        Ok(resp.json().await?)
    }

    /// Invalidate an access token
    pub async fn revoke(&self, access_token: &str) -> AppResult<()> {
        let resp = self
            .client
            .post(format!("{}/2/auth/token/revoke", self.settings.api_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let body: serde_json::Value = resp.json().await.unwrap_or_default();
        let code = error_tag(&body).unwrap_or_else(|| "unknown_error".to_string());
        warn!("Dropbox revoke failed: {} {}", status, code);

        Err(match code.as_str() {
            "invalid_access_token" => {
                AppError::dropbox("Token already expired or invalid", "invalid_access_token")
            }
            "expired_access_token" => {
                AppError::dropbox("Token has already expired", "expired_access_token")
            }
            _ => AppError::dropbox_with(
                "Failed to revoke access",
                code.clone(),
                body["error_description"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
            ),
        })
    }

    /// First page of the root folder
    pub async fn list_folder(&self, access_token: &str) -> AppResult<ListFolderPage> {
        debug!("Listing Dropbox root folder");
        let resp = self
            .client
            .post(format!("{}/2/files/list_folder", self.settings.api_url))
            .bearer_auth(access_token)
            .json(&serde_json::json!({
                "path": "",
                "limit": self.settings.page_size,
                "include_media_info": true,
            }))
            .send()
            .await?;

        read_api(resp).await
    }

    /// Next page of a listing
    pub async fn list_folder_continue(&self, access_token: &str, cursor: &str) -> AppResult<ListFolderPage> {
        debug!("Continuing Dropbox listing");
        let resp = self
            .client
            .post(format!("{}/2/files/list_folder/continue", self.settings.api_url))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "cursor": cursor }))
            .send()
            .await?;

        read_api(resp).await
    }

    /// Short-lived direct download url for a file
    pub async fn get_temporary_link(&self, access_token: &str, path: &str) -> AppResult<String> {
        let resp = self
            .client
            .post(format!("{}/2/files/get_temporary_link", self.settings.api_url))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await?;

        let link: TemporaryLink = read_api(resp).await?;
        Ok(link.link)
    }

    /// Upload a file to the root folder, overwriting with autorename
    pub async fn upload(&self, access_token: &str, name: &str, contents: Vec<u8>) -> AppResult<FileEntry> {
        let arg = UploadArg {
            path: format!("/{}", name),
            mode: "overwrite",
            autorename: true,
        };
        let arg = header_safe_json(&serde_json::to_string(&arg)?);

        let resp = self
            .client
            .post(format!("{}/2/files/upload", self.settings.content_url))
            .bearer_auth(access_token)
            .header("Dropbox-API-Arg", arg)
            .header("Content-Type", "application/octet-stream")
            .body(contents)
            .send()
            .await?;

        let mut entry: FileEntry = read_api(resp).await?;
        // upload answers with bare file metadata, without a tag
        if entry.tag.is_empty() {
            entry.tag = "file".to_string();
        }
        Ok(entry)
    }
}

async fn read_oauth_error(resp: Response) -> OAuthError {
    resp.json().await.unwrap_or_default()
}

/// `.tag` of an API error body, or the plain string form
fn error_tag(body: &serde_json::Value) -> Option<String> {
    match &body["error"] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj.get(".tag").and_then(|t| t.as_str()).map(str::to_string),
        _ => None,
    }
}

async fn read_api<T: serde::de::DeserializeOwned>(resp: Response) -> AppResult<T> {
    if resp.status().is_success() {
        return Ok(resp.json().await?);
    }

    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let body: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
    let summary = body["error_summary"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| if text.is_empty() { status.to_string() } else { text.clone() });

    warn!("Dropbox API error: {} {}", status, summary);
    Err(map_api_error(&summary, error_tag(&body)))
}

/// Translate a Dropbox error summary into the messages shown to users
pub fn map_api_error(summary: &str, tag: Option<String>) -> AppError {
    if summary.contains("path/not_found") {
        AppError::dropbox(
            "Could not find the specified path in your Dropbox",
            "path/not_found",
        )
    } else if summary.contains("invalid_access_token") || summary.contains("expired_access_token") {
        AppError::dropbox("Your Dropbox session has expired", "invalid_access_token")
    } else {
        AppError::dropbox_with(
            summary,
            tag.unwrap_or_else(|| "unknown_error".to_string()),
            summary,
        )
    }
}

/// Escape non-ascii characters so JSON can travel in an HTTP header
fn header_safe_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

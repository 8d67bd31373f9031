//! Per-user Dropbox session state

use serde::{Deserialize, Serialize};

/// Dropbox authorization and listing state for one user.
///
/// Only tokens, expiry and the auth flags are persisted; the error, the
/// listing cursor and the pending OAuth state live for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropboxSession {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Milliseconds since the unix epoch
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub is_authenticating: bool,
    #[serde(skip)]
    pub error: Option<String>,
    #[serde(skip)]
    pub cursor: Option<String>,
    #[serde(skip, default = "default_true")]
    pub has_more: bool,
    #[serde(skip)]
    pub pending_state: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for DropboxSession {
    fn default() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_at: None,
            is_authenticated: false,
            is_authenticating: false,
            error: None,
            cursor: None,
            has_more: true,
            pending_state: None,
        }
    }
}

impl DropboxSession {
    /// Store a freshly issued access token.
    ///
    /// A refresh response carries no refresh token, so the existing one is
    /// kept when `refresh_token` is `None`.
    pub fn apply_tokens(
        &mut self,
        access_token: String,
        refresh_token: Option<String>,
        expires_in_secs: i64,
        now_ms: i64,
    ) {
        self.access_token = Some(access_token);
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self.expires_at = Some(now_ms + expires_in_secs * 1000);
        self.is_authenticated = true;
        self.is_authenticating = false;
        self.error = None;
    }

    /// Record a failed auth attempt
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.is_authenticating = false;
    }

    /// Milliseconds until the access token expires, `None` without a token
    pub fn time_until_expiry(&self, now_ms: i64) -> Option<i64> {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => Some(expires_at - now_ms),
            _ => None,
        }
    }

    /// Whether the token expires within `margin_secs`
    pub fn needs_refresh(&self, now_ms: i64, margin_secs: u64) -> bool {
        self.time_until_expiry(now_ms)
            .map(|left| left < margin_secs as i64 * 1000)
            .unwrap_or(false)
    }

    /// Remember where the listing continues
    pub fn set_page_state(&mut self, has_more: bool, cursor: Option<String>) {
        self.has_more = has_more;
        self.cursor = if has_more { cursor } else { None };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            is_authenticated: self.is_authenticated,
            is_authenticating: self.is_authenticating,
            expires_at: self.expires_at,
            error: self.error.clone(),
            has_more: self.has_more,
        }
    }
}

/// Public view of a session, without tokens
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_authenticated: bool,
    pub is_authenticating: bool,
    pub expires_at: Option<i64>,
    pub error: Option<String>,
    pub has_more: bool,
}

//! Dropbox session lifecycle: login, token refresh, revocation

use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::SessionStatus;
use crate::plugins::DropboxClient;
use crate::stores::SessionStore;
use crate::utils::auth::generate_random_string;
use crate::utils::dates::now_ms;

const STATE_LENGTH: usize = 32;

pub const NOT_AUTHENTICATED: &str = "Not authenticated with Dropbox";

/// Dropbox session functions
pub struct DropboxLib;

impl DropboxLib {
    /// Start the OAuth flow, remembering the issued `state`
    pub fn start_login(client: &DropboxClient, sessions: &SessionStore, user_id: &str) -> AppResult<String> {
        let state = generate_random_string(STATE_LENGTH);
        let url = client.authorize_url(&state)?;

        sessions.update(user_id, |s| {
            s.pending_state = Some(state);
            s.is_authenticating = true;
            s.error = None;
        });

        Ok(url)
    }

    /// Finish the OAuth flow with the code Dropbox redirected back with.
    ///
    /// A `state` sent by the client must match the one issued by
    /// [`DropboxLib::start_login`].
    pub async fn complete_login(
        client: &DropboxClient,
        sessions: &SessionStore,
        user_id: &str,
        code: &str,
        state: Option<&str>,
    ) -> AppResult<SessionStatus> {
        if code.trim().is_empty() {
            return Err(AppError::BadRequest("Authorization code is required".into()));
        }

        if let Some(state) = state {
            let expected = sessions.get(user_id).pending_state;
            if expected.as_deref() != Some(state) {
                warn!("OAuth state mismatch for {}", user_id);
                sessions.update(user_id, |s| s.fail("Invalid OAuth state"));
                return Err(AppError::BadRequest("Invalid OAuth state".into()));
            }
        }

        sessions.update(user_id, |s| s.is_authenticating = true);

        let grant = match client.exchange_code(code).await {
            Ok(grant) => grant,
            Err(e) => {
                sessions.update(user_id, |s| s.fail(e.to_string()));
                return Err(e);
            }
        };

        let status = sessions.update(user_id, |s| {
            s.apply_tokens(grant.access_token, grant.refresh_token, grant.expires_in, now_ms());
            s.pending_state = None;
            s.status()
        });
        sessions.persist();

        info!("Dropbox connected for {}", user_id);
        Ok(status)
    }

    /// Trade the stored refresh token for a new access token
    pub async fn refresh(client: &DropboxClient, sessions: &SessionStore, user_id: &str) -> AppResult<SessionStatus> {
        let Some(refresh_token) = sessions.get(user_id).refresh_token else {
            return Err(AppError::Unauthorized("No refresh token available".into()));
        };

        let grant = match client.refresh(&refresh_token).await {
            Ok(grant) => grant,
            Err(e) => {
                sessions.update(user_id, |s| s.error = Some(e.to_string()));
                return Err(e);
            }
        };

        let status = sessions.update(user_id, |s| {
            s.apply_tokens(grant.access_token, grant.refresh_token, grant.expires_in, now_ms());
            s.status()
        });
        sessions.persist();

        info!("Dropbox token refreshed for {}", user_id);
        Ok(status)
    }

    /// A usable access token, refreshed first when it is about to expire.
    ///
    /// A failed refresh falls back to the current token while it has not
    /// actually expired yet.
    pub async fn access_token(client: &DropboxClient, sessions: &SessionStore, user_id: &str) -> AppResult<String> {
        let session = sessions.get(user_id);
        let now = now_ms();

        let (Some(token), Some(_)) = (session.access_token.clone(), session.expires_at) else {
            return Err(AppError::Unauthorized(NOT_AUTHENTICATED.into()));
        };

        if !session.needs_refresh(now, client.settings().refresh_margin_secs) {
            return Ok(token);
        }

        match Self::refresh(client, sessions, user_id).await {
            Ok(_) => sessions
                .get(user_id)
                .access_token
                .ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.into())),
            Err(e) if session.time_until_expiry(now).unwrap_or(0) > 0 => {
                warn!("Token refresh failed, using current token: {}", e);
                Ok(token)
            }
            Err(e) => Err(e),
        }
    }

    /// Revoke the access token and forget the session.
    ///
    /// The session is cleared even when Dropbox rejects the revocation.
    pub async fn revoke(client: &DropboxClient, sessions: &SessionStore, user_id: &str) -> AppResult<()> {
        let token = sessions.get(user_id).access_token;

        let result = match token {
            Some(token) => client.revoke(&token).await,
            None => Ok(()),
        };

        sessions.update(user_id, |s| s.clear());
        sessions.persist();

        if let Err(e) = &result {
            warn!("Dropbox revoke failed for {}: {}", user_id, e);
        } else {
            info!("Dropbox disconnected for {}", user_id);
        }

        result
    }
}

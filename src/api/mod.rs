//! REST API routes for SoundVault

pub mod auth;
pub mod client;
pub mod dropbox;
pub mod genius;
pub mod library;
pub mod lyrics;
pub mod player;
pub mod playlist;
pub mod track;
pub mod users;

use actix_web::web;

use crate::config::Settings;
use crate::core::DropboxLib;
use crate::db::SupabaseEngine;
use crate::errors::AppResult;
use crate::plugins::{DropboxClient, GeniusClient, MusixmatchProvider};
use crate::stores::{MetadataStore, SessionStore};
use crate::utils::auth::Caller;

/// Shared state handed to every handler
pub struct AppState {
    pub settings: Settings,
    pub db: SupabaseEngine,
    pub dropbox: DropboxClient,
    pub genius: GeniusClient,
    pub lyrics: MusixmatchProvider,
    pub sessions: SessionStore,
    pub metadata: MetadataStore,
    /// Plain client for downloading temporary links
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(settings: Settings, sessions: SessionStore) -> Self {
        Self {
            db: SupabaseEngine::new(&settings.supabase),
            dropbox: DropboxClient::new(settings.dropbox.clone()),
            genius: GeniusClient::new(settings.genius.clone()),
            lyrics: MusixmatchProvider::new(settings.lyrics.clone()),
            sessions,
            metadata: MetadataStore::new(),
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Dropbox access token of the caller, refreshed when close to expiry
    pub async fn dropbox_token(&self, caller: &Caller) -> AppResult<String> {
        DropboxLib::access_token(&self.dropbox, &self.sessions, &caller.id).await
    }
}

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Account routes
        .service(web::scope("/auth").configure(auth::configure))
        .service(web::scope("/users").configure(users::configure))
        // Dropbox connection routes
        .service(web::scope("/dropbox").configure(dropbox::configure))
        // Library routes
        .service(web::scope("/library").configure(library::configure))
        // Track metadata and link routes
        .service(web::scope("/tracks").configure(track::configure))
        // Player queue routes
        .service(web::scope("/player").configure(player::configure))
        // Playlist routes
        .service(web::scope("/playlists").configure(playlist::configure))
        // Lyrics routes
        .service(web::scope("/lyrics").configure(lyrics::configure))
        // Genius routes
        .service(web::scope("/genius").configure(genius::configure));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::utils::auth::tests::make_token;

    pub(crate) const SECRET: &str = "test-secret";

    /// Settings pointing every upstream at `upstream`
    pub(crate) fn settings_for(upstream: &str) -> Settings {
        let mut settings = Settings::default();
        settings.supabase.url = upstream.to_string();
        settings.supabase.anon_key = "anon".into();
        settings.supabase.jwt_secret = Some(SECRET.into());
        settings.dropbox.app_key = "key".into();
        settings.dropbox.app_secret = "secret".into();
        settings.dropbox.api_url = upstream.to_string();
        settings.dropbox.content_url = upstream.to_string();
        settings.dropbox.oauth_url = format!("{}/oauth2/token", upstream);
        settings.genius.api_url = format!("{}/genius", upstream);
        settings.genius.access_token = "g".into();
        settings.lyrics.api_url = format!("{}/mxm", upstream);
        settings.lyrics.api_key = "m".into();
        settings.metadata.batch_delay_ms = 0;
        settings
    }

    pub(crate) fn state_for(upstream: &str) -> web::Data<AppState> {
        web::Data::new(AppState::new(settings_for(upstream), SessionStore::in_memory()))
    }

    /// Authorization header value for `user`
    pub(crate) fn bearer(user: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", make_token(user, SECRET, 3600)))
    }

    /// Give `user` a live Dropbox session
    pub(crate) fn connect_dropbox(state: &AppState, user: &str) {
        state.sessions.update(user, |s| {
            s.apply_tokens("dbx-token".into(), Some("dbx-refresh".into()), 14_400, crate::utils::dates::now_ms())
        });
    }
}

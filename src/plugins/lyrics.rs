//! Musixmatch lyrics provider

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LyricsSettings;
use crate::errors::{AppError, AppResult};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Musixmatch lyrics provider
pub struct MusixmatchProvider {
    client: Client,
    settings: LyricsSettings,
}

impl MusixmatchProvider {
    pub fn new(settings: LyricsSettings) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self { client, settings }
    }

    pub fn is_configured(&self) -> bool {
        !self.settings.api_key.is_empty()
    }

    /// Make authenticated request
    async fn get(&self, action: &str, params: &[(&str, &str)]) -> AppResult<serde_json::Value> {
        if !self.is_configured() {
            return Err(AppError::Config("Musixmatch api key is not configured".into()));
        }

        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("apikey", self.settings.api_key.as_str()));

        let url = format!("{}/{}", self.settings.api_url, action);
        let resp = self.client.get(&url).query(&query).send().await?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Musixmatch {} returned {}",
                action,
                resp.status()
            )));
        }

        Ok(resp.json().await?)
    }

    /// Find the Musixmatch track id for a title and artist
    pub async fn match_track(&self, title: &str, artist: &str) -> AppResult<Option<String>> {
        // exact artist first, then its ASCII transliteration
        let mut artist_variants = vec![artist.to_string()];
        let decoded = deunicode::deunicode(artist);
        if decoded != artist {
            artist_variants.push(decoded);
        }

        for artist_name in artist_variants {
            let json = self
                .get(
                    "matcher.track.get",
                    &[("q_track", title), ("q_artist", &artist_name)],
                )
                .await?;

            let track_id = &json["message"]["body"]["track"]["track_id"];
            let id = match track_id {
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                _ => None,
            };

            if id.is_some() {
                return Ok(id);
            }
        }

        Ok(None)
    }

    /// Plain lyrics body by track id
    pub async fn lyrics_by_id(&self, track_id: &str) -> AppResult<Option<String>> {
        let json = self
            .get("track.lyrics.get", &[("track_id", track_id)])
            .await?;

        let lyrics = json["message"]["body"]["lyrics"]["lyrics_body"]
            .as_str()
            .map(|s| s.to_string());

        Ok(lyrics)
    }

    /// Match then fetch. Any provider failure is treated as "not found".
    pub async fn search_lyrics(&self, title: &str, artist: &str) -> Option<String> {
        let track_id = match self.match_track(title, artist).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("Musixmatch has no match for {} by {}", title, artist);
                return None;
            }
            Err(e) => {
                warn!("Musixmatch lookup failed: {}", e);
                return None;
            }
        };

        match self.lyrics_by_id(&track_id).await {
            Ok(lyrics) => lyrics.filter(|l| !l.replace('\n', "").trim().is_empty()),
            Err(e) => {
                warn!("Musixmatch lyrics fetch failed: {}", e);
                None
            }
        }
    }
}

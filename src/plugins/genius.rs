//! Genius API client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::GeniusSettings;
use crate::errors::{AppError, AppResult};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// A search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeniusSong {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub image_url: String,
    pub lyrics_url: String,
}

/// Full song record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeniusSongDetails {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub release_date: String,
    pub image_url: String,
    pub lyrics_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics_state: Option<String>,
}

fn text(value: &serde_json::Value) -> String {
    value.as_str().unwrap_or("").to_string()
}

pub struct GeniusClient {
    client: Client,
    settings: GeniusSettings,
}

impl GeniusClient {
    pub fn new(settings: GeniusSettings) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self { client, settings }
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.settings.access_token.is_empty() {
            return Err(AppError::Config("Genius access token is not configured".into()));
        }
        Ok(())
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> AppResult<serde_json::Value> {
        self.ensure_configured()?;

        let resp = self
            .client
            .get(format!("{}{}", self.settings.api_url, path))
            .bearer_auth(&self.settings.access_token)
            .query(query)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            warn!("Genius request {} failed: {}", path, status);
            return Err(AppError::Upstream(format!("Genius API returned {}", status)));
        }

        Ok(resp.json().await?)
    }

    /// Search songs by free text, typically "<title> <artist>"
    pub async fn search(&self, query: &str) -> AppResult<Vec<GeniusSong>> {
        info!("Searching Genius for: {}", query);
        let json = self.get("/search", &[("q", query)]).await?;

        let hits = json["response"]["hits"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let songs = hits
            .iter()
            .filter_map(|hit| {
                let result = &hit["result"];
                Some(GeniusSong {
                    id: result["id"].as_i64()?,
                    title: text(&result["title"]),
                    artist: text(&result["primary_artist"]["name"]),
                    image_url: text(&result["song_art_image_url"]),
                    lyrics_url: text(&result["url"]),
                })
            })
            .collect();

        Ok(songs)
    }

    /// Song details by Genius id
    pub async fn song(&self, id: i64) -> AppResult<GeniusSongDetails> {
        let json = self.get(&format!("/songs/{}", id), &[]).await?;
        let song = &json["response"]["song"];

        if song.is_null() {
            return Err(AppError::NotFound(format!("Genius song {} not found", id)));
        }

        Ok(GeniusSongDetails {
            id: song["id"].as_i64().unwrap_or(id),
            title: text(&song["title"]),
            artist: text(&song["primary_artist"]["name"]),
            album: text(&song["album"]["name"]),
            release_date: text(&song["release_date"]),
            image_url: text(&song["song_art_image_url"]),
            lyrics_url: text(&song["url"]),
            lyrics_state: song["lyrics_state"].as_str().map(str::to_string),
        })
    }

    /// Raw HTML of a song page
    pub async fn fetch_page(&self, url: &str) -> AppResult<String> {
        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Genius page returned {}",
                resp.status()
            )));
        }

        Ok(resp.text().await?)
    }
}

//! Lyrics resolution across Musixmatch and Genius

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::plugins::{GeniusClient, MusixmatchProvider};

lazy_static! {
    static ref LEGACY_LYRICS_DIV: Regex =
        Regex::new(r#"(?s)<div class="lyrics">(.*?)</div>"#).unwrap();
    static ref LYRICS_CONTAINER: Regex =
        Regex::new(r#"(?s)<div[^>]*data-lyrics-container="true"[^>]*>(.*?)</div>"#).unwrap();
    static ref LINE_BREAK: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Lyrics with the provider they came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLyrics {
    pub lyrics: String,
    pub source: String,
}

/// Lyrics library
pub struct LyricsLib;

impl LyricsLib {
    fn decode_entities(text: &str) -> String {
        text.replace("&quot;", "\"")
            .replace("&#x27;", "'")
            .replace("&#39;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    fn to_text(fragment: &str) -> String {
        let with_breaks = LINE_BREAK.replace_all(fragment, "\n");
        let stripped = TAG.replace_all(&with_breaks, "");
        Self::decode_entities(stripped.trim())
    }

    /// Pull the lyrics text out of a Genius song page.
    ///
    /// Older pages keep everything in one `<div class="lyrics">`; current ones
    /// split it over several `data-lyrics-container` blocks.
    pub fn extract_from_html(html: &str) -> String {
        if let Some(caps) = LEGACY_LYRICS_DIV.captures(html) {
            let text = Self::to_text(&caps[1]);
            if !text.is_empty() {
                return text;
            }
        }

        let blocks: Vec<String> = LYRICS_CONTAINER
            .captures_iter(html)
            .map(|caps| Self::to_text(&caps[1]))
            .collect();

        if blocks.is_empty() {
            return String::new();
        }

        EXCESS_NEWLINES
            .replace_all(&blocks.join("\n"), "\n\n")
            .trim()
            .to_string()
    }

    /// Message pointing at the Genius page when its text cannot be scraped
    pub fn genius_placeholder(title: &str, artist: &str, url: &str) -> String {
        format!(
            "Lyrics for \"{}\" by {} are available on Genius.\n\nPlease visit: {}",
            title, artist, url
        )
    }

    async fn from_genius(genius: &GeniusClient, track: &str, artist: &str) -> Option<ResolvedLyrics> {
        let query = format!("{} {}", track, artist).trim().to_string();

        let hits = match genius.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Genius search failed: {}", e);
                return None;
            }
        };

        let Some(first) = hits.first() else {
            debug!("No Genius results for: {}", query);
            return None;
        };

        let song = match genius.song(first.id).await {
            Ok(song) => song,
            Err(e) => {
                warn!("Genius song lookup failed: {}", e);
                return None;
            }
        };

        if song.lyrics_url.is_empty() {
            debug!("No lyrics URL for song: {}", song.title);
            return None;
        }

        let scraped = match genius.fetch_page(&song.lyrics_url).await {
            Ok(html) => Self::extract_from_html(&html),
            Err(e) => {
                warn!("Failed to fetch Genius page {}: {}", song.lyrics_url, e);
                String::new()
            }
        };

        if scraped.is_empty() {
            return Some(ResolvedLyrics {
                lyrics: Self::genius_placeholder(&song.title, &song.artist, &song.lyrics_url),
                source: "genius-link".to_string(),
            });
        }

        Some(ResolvedLyrics {
            lyrics: scraped,
            source: "genius".to_string(),
        })
    }

    /// Musixmatch first, then Genius
    pub async fn resolve(
        musixmatch: &MusixmatchProvider,
        genius: &GeniusClient,
        track: &str,
        artist: &str,
    ) -> Option<ResolvedLyrics> {
        info!("Searching lyrics for {} by {}", track, artist);

        if let Some(lyrics) = musixmatch.search_lyrics(track, artist).await {
            return Some(ResolvedLyrics {
                lyrics,
                source: "musixmatch".to_string(),
            });
        }

        Self::from_genius(genius, track, artist).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeniusSettings, LyricsSettings};
    use crate::testing::spawn_upstream;
    use actix_web::{web, HttpRequest, HttpResponse};

    #[test]
    fn test_extract_legacy_layout() {
        let html = r#"<html><div class="lyrics"><p>Line one<br/>Line <a href="x">two</a></p></div></html>"#;
        assert_eq!(LyricsLib::extract_from_html(html), "Line one\nLine two");
    }

    #[test]
    fn test_extract_container_layout() {
        let html = concat!(
            r#"<div class="x" data-lyrics-container="true">[Verse]<br>Don&#x27;t stop<br><br><br><br>now</div>"#,
            r#"<span>ad</span>"#,
            r#"<div data-lyrics-container="true" class="y">Tom &amp; Jerry</div>"#,
        );
        assert_eq!(
            LyricsLib::extract_from_html(html),
            "[Verse]\nDon't stop\n\nnow\nTom & Jerry"
        );
    }

    #[test]
    fn test_extract_nothing() {
        assert_eq!(LyricsLib::extract_from_html("<html><body>nope</body></html>"), "");
    }

    #[test]
    fn test_placeholder() {
        let text = LyricsLib::genius_placeholder("Song", "Band", "http://g/1");
        assert_eq!(
            text,
            "Lyrics for \"Song\" by Band are available on Genius.\n\nPlease visit: http://g/1"
        );
    }

    fn fake_services(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "/mxm/matcher.track.get",
            web::get().to(|req: HttpRequest| async move {
                let body = if req.query_string().contains("q_track=Known") {
                    serde_json::json!({ "track": { "track_id": 1 } })
                } else {
                    serde_json::json!([])
                };
                HttpResponse::Ok().json(serde_json::json!({ "message": { "body": body } }))
            }),
        )
        .route(
            "/mxm/track.lyrics.get",
            web::get().to(|| async {
                HttpResponse::Ok().json(serde_json::json!({
                    "message": { "body": { "lyrics": { "lyrics_body": "from musixmatch" } } }
                }))
            }),
        )
        .route(
            "/genius/search",
            web::get().to(|req: HttpRequest| async move {
                let hits = if req.query_string().contains("Missing") {
                    serde_json::json!([])
                } else {
                    serde_json::json!([{ "result": { "id": 5, "title": "T", "primary_artist": { "name": "A" } } }])
                };
                HttpResponse::Ok().json(serde_json::json!({ "response": { "hits": hits } }))
            }),
        )
        .route(
            "/genius/songs/5",
            web::get().to(|req: HttpRequest| async move {
                let page = format!("http://{}/page/5", req.connection_info().host());
                HttpResponse::Ok().json(serde_json::json!({
                    "response": { "song": {
                        "id": 5, "title": "T", "primary_artist": { "name": "A" }, "url": page
                    }}
                }))
            }),
        )
        .route(
            "/page/5",
            web::get().to(|| async { HttpResponse::Ok().body("<html>no lyrics markup</html>") }),
        );
    }

    async fn clients() -> (MusixmatchProvider, GeniusClient) {
        let url = spawn_upstream(fake_services).await;
        (
            MusixmatchProvider::new(LyricsSettings {
                api_url: format!("{}/mxm", url),
                api_key: "k".into(),
            }),
            GeniusClient::new(GeniusSettings {
                api_url: format!("{}/genius", url),
                access_token: "g".into(),
            }),
        )
    }

    #[actix_web::test]
    async fn test_musixmatch_wins() {
        let (mxm, genius) = clients().await;
        let found = LyricsLib::resolve(&mxm, &genius, "Known", "Band").await.unwrap();
        assert_eq!(found.lyrics, "from musixmatch");
        assert_eq!(found.source, "musixmatch");
    }

    #[actix_web::test]
    async fn test_genius_placeholder_when_page_has_no_lyrics() {
        let (mxm, genius) = clients().await;
        let found = LyricsLib::resolve(&mxm, &genius, "Other", "Band").await.unwrap();
        assert_eq!(found.source, "genius-link");
        assert!(found.lyrics.starts_with("Lyrics for \"T\" by A are available on Genius."));
        assert!(found.lyrics.ends_with("/page/5"));
    }

    #[actix_web::test]
    async fn test_nothing_found() {
        let (mxm, genius) = clients().await;
        assert!(LyricsLib::resolve(&mxm, &genius, "Missing", "").await.is_none());
    }
}

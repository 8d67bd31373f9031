//! Library paging over the user's Dropbox root folder

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::errors::{AppError, AppResult};
use crate::models::Track;
use crate::plugins::{DropboxClient, FileEntry, ListFolderPage};
use crate::utils::filesystem::is_music_file;

/// One page of playable tracks
#[derive(Debug, Clone, Serialize)]
pub struct LibraryPage {
    pub tracks: Vec<Track>,
    /// Present only while more entries remain
    pub cursor: Option<String>,
    pub has_more: bool,
}

impl LibraryPage {
    pub fn empty() -> Self {
        Self {
            tracks: Vec::new(),
            cursor: None,
            has_more: false,
        }
    }
}

/// Library functions
pub struct LibraryLib;

impl LibraryLib {
    /// Turn listing entries into tracks with fresh temporary links.
    ///
    /// Folders, entries without a path or name, and non-audio files are
    /// skipped. Links are requested concurrently but tracks keep listing
    /// order. Individual failures are tolerated unless nothing succeeds.
    pub async fn process_entries(
        client: &DropboxClient,
        access_token: &str,
        entries: Vec<FileEntry>,
    ) -> AppResult<Vec<Track>> {
        let candidates: Vec<(String, String)> = entries
            .into_iter()
            .filter_map(|entry| {
                if !entry.is_file() {
                    debug!("Skipping non-file entry: {} {:?}", entry.tag, entry.path_display);
                    return None;
                }
                let (path, name) = match (entry.path_display, entry.name) {
                    (Some(path), Some(name)) if !path.is_empty() && !name.is_empty() => (path, name),
                    (path, name) => {
                        debug!("Skipping entry with missing path or name: {:?} {:?}", path, name);
                        return None;
                    }
                };
                if !is_music_file(&path) {
                    debug!("Skipping non-music file: {}", path);
                    return None;
                }
                Some((path, name))
            })
            .collect();

        let concurrency = client.settings().link_concurrency.max(1);
        let results: Vec<(String, String, AppResult<String>)> = stream::iter(candidates)
            .map(|(path, name)| async move {
                let link = client.get_temporary_link(access_token, &path).await;
                (path, name, link)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut tracks = Vec::with_capacity(results.len());
        let mut failures: Vec<(String, String)> = Vec::new();

        for (path, name, link) in results {
            match link {
                Ok(link) => tracks.push(Track::new(path, name, link)),
                Err(e) => {
                    error!("Failed to get temporary link for {}: {}", name, e);
                    failures.push((name, e.to_string()));
                }
            }
        }

        if tracks.is_empty() && !failures.is_empty() {
            let summary = failures
                .iter()
                .map(|(name, err)| format!("{} ({})", name, err))
                .collect::<Vec<_>>()
                .join(", ");

            return Err(AppError::dropbox(
                format!("Failed to process any files. Errors: {}", summary),
                "processing_failed",
            ));
        }

        Ok(tracks)
    }

    /// First page of the root folder
    pub async fn first_page(client: &DropboxClient, access_token: &str) -> AppResult<LibraryPage> {
        info!("Fetching initial files from Dropbox root directory");
        let listing = client.list_folder(access_token).await?;
        Self::into_page(client, access_token, listing).await
    }

    /// Page following `cursor`
    pub async fn next_page(client: &DropboxClient, access_token: &str, cursor: &str) -> AppResult<LibraryPage> {
        info!("Fetching more files using cursor");
        let listing = client.list_folder_continue(access_token, cursor).await?;
        Self::into_page(client, access_token, listing).await
    }

    async fn into_page(
        client: &DropboxClient,
        access_token: &str,
        listing: ListFolderPage,
    ) -> AppResult<LibraryPage> {
        debug!("Files found: {}", listing.entries.len());
        let tracks = Self::process_entries(client, access_token, listing.entries).await?;

        Ok(LibraryPage {
            tracks,
            cursor: if listing.has_more { Some(listing.cursor) } else { None },
            has_more: listing.has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DropboxSettings;
    use crate::testing::spawn_upstream;
    use actix_web::{web, HttpResponse};

    fn client_for(url: &str) -> DropboxClient {
        DropboxClient::new(DropboxSettings {
            app_key: "key".into(),
            app_secret: "secret".into(),
            api_url: url.to_string(),
            link_concurrency: 2,
            ..Default::default()
        })
    }

    fn entry(tag: &str, name: Option<&str>, path: Option<&str>) -> FileEntry {
        FileEntry {
            tag: tag.to_string(),
            name: name.map(str::to_string),
            path_display: path.map(str::to_string),
            id: None,
        }
    }

    fn links(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "/2/files/get_temporary_link",
            web::post().to(|body: web::Json<serde_json::Value>| async move {
                let path = body["path"].as_str().unwrap_or_default().to_string();
                if path.contains("broken") {
                    return HttpResponse::Conflict().json(serde_json::json!({
                        "error_summary": "path/restricted_content/",
                        "error": { ".tag": "path" },
                    }));
                }
                // later entries answer first to exercise ordering
                if path.ends_with("a.mp3") {
                    actix_web::rt::time::sleep(std::time::Duration::from_millis(50)).await;
                }
                HttpResponse::Ok().json(serde_json::json!({ "link": format!("https://dl{}", path) }))
            }),
        )
        .route(
            "/2/files/list_folder",
            web::post().to(|| async {
                HttpResponse::Ok().json(serde_json::json!({
                    "entries": [
                        { ".tag": "file", "name": "a.mp3", "path_display": "/a.mp3" },
                        { ".tag": "file", "name": "notes.txt", "path_display": "/notes.txt" },
                    ],
                    "cursor": "c-ignored",
                    "has_more": false,
                }))
            }),
        );
    }

    #[actix_web::test]
    async fn test_filters_and_keeps_order() {
        let url = spawn_upstream(links).await;
        let client = client_for(&url);

        let entries = vec![
            entry("folder", Some("Music"), Some("/Music")),
            entry("file", Some("a.mp3"), Some("/a.mp3")),
            entry("file", None, Some("/nameless.mp3")),
            entry("file", Some("cover.jpg"), Some("/cover.jpg")),
            entry("file", Some("b.FLAC"), Some("/b.FLAC")),
            entry("file", Some("c.opus"), Some("/c.opus")),
        ];

        let tracks = LibraryLib::process_entries(&client, "at", entries).await.unwrap();
        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();

        assert_eq!(ids, vec!["/a.mp3", "/b.FLAC", "/c.opus"]);
        assert_eq!(tracks[0].temporary_link, "https://dl/a.mp3");
        assert_eq!(tracks[0].encrypted_key, "");
        assert_eq!(tracks[0].iv, "");
    }

    #[actix_web::test]
    async fn test_partial_failures_are_tolerated() {
        let url = spawn_upstream(links).await;
        let client = client_for(&url);

        let entries = vec![
            entry("file", Some("broken.mp3"), Some("/broken.mp3")),
            entry("file", Some("b.mp3"), Some("/b.mp3")),
        ];

        let tracks = LibraryLib::process_entries(&client, "at", entries).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "b.mp3");
    }

    #[actix_web::test]
    async fn test_all_failures_are_reported() {
        let url = spawn_upstream(links).await;
        let client = client_for(&url);

        let entries = vec![
            entry("file", Some("broken1.mp3"), Some("/broken1.mp3")),
            entry("file", Some("broken2.mp3"), Some("/broken2.mp3")),
        ];

        let err = LibraryLib::process_entries(&client, "at", entries)
            .await
            .unwrap_err()
            .to_string();

        assert!(err.starts_with("Failed to process any files. Errors: broken1.mp3 ("));
        assert!(err.contains(", broken2.mp3 ("));
    }

    #[actix_web::test]
    async fn test_no_music_is_an_empty_list() {
        let client = client_for("http://127.0.0.1:9");
        let entries = vec![entry("file", Some("a.txt"), Some("/a.txt"))];
        let tracks = LibraryLib::process_entries(&client, "at", entries).await.unwrap();
        assert!(tracks.is_empty());
    }

    #[actix_web::test]
    async fn test_last_page_has_no_cursor() {
        let url = spawn_upstream(links).await;
        let page = LibraryLib::first_page(&client_for(&url), "at").await.unwrap();

        assert_eq!(page.tracks.len(), 1);
        assert!(!page.has_more);
        assert!(page.cursor.is_none());
    }
}

//! Clients for the third-party services SoundVault builds on
//!
//! Dropbox stores the audio files, Musixmatch and Genius provide lyrics.

pub mod dropbox;
pub mod genius;
pub mod lyrics;

pub use dropbox::{DropboxClient, FileEntry, ListFolderPage};
pub use genius::GeniusClient;
pub use lyrics::MusixmatchProvider;

//! Core library functions for SoundVault

pub mod dropboxlib;
pub mod library;
pub mod lyrics;
pub mod metadata;
pub mod playlistlib;
pub mod queue;

pub use dropboxlib::DropboxLib;
pub use library::{LibraryLib, LibraryPage};
pub use lyrics::LyricsLib;
pub use metadata::MetadataLib;
pub use playlistlib::PlaylistLib;
pub use queue::PlayQueue;

//! Data models for SoundVault
//!
//! Records mirrored from the Supabase schema plus the per-user session state.

mod metadata;
mod playlist;
mod session;
mod track;
mod user;

pub use metadata::{AudioMetadata, Picture, FRONT_COVER, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
pub use playlist::{NewPlaylist, Playlist, PlaylistEntry, PlaylistTrack, PlaylistUpdate};
pub use session::{DropboxSession, SessionStatus};
pub use track::{NewStoredTrack, StoredTrack, Track};
pub use user::{KeyPairUpdate, ProfileUpsert, UserProfile};

//! Database table operations

mod playlist_table;
mod playlist_track_table;
mod profile_table;
mod track_table;

pub use playlist_table::PlaylistTable;
pub use playlist_track_table::PlaylistTrackTable;
pub use profile_table::ProfileTable;
pub use track_table::TrackTable;

//! File name helpers

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Streamable formats, matched against the end of a Dropbox path
    static ref MUSIC_FILE_PATTERN: Regex =
        Regex::new(r"(?i)\.(mp3|m4a|wav|ogg|flac|opus)$").unwrap();
}

/// Check if a path names a streamable audio file
pub fn is_music_file(path: &str) -> bool {
    MUSIC_FILE_PATTERN.is_match(path)
}

/// Final path component, without any leading directories
pub fn file_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_music_file() {
        assert!(is_music_file("/Music/track.mp3"));
        assert!(is_music_file("/Music/TRACK.FLAC"));
        assert!(is_music_file("/a/b/c.opus"));
        assert!(!is_music_file("/Music/cover.jpg"));
        assert!(!is_music_file("/Music/track.mp3.txt"));
        assert!(!is_music_file("/Music/mp3"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/Music/Album/song.mp3"), "song.mp3");
        assert_eq!(file_name("C:\\tmp\\song.ogg"), "song.ogg");
        assert_eq!(file_name("song.wav"), "song.wav");
    }
}

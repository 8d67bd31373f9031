//! Per-user play queue

use serde::{Deserialize, Serialize};

use crate::models::{AudioMetadata, Track};

/// What a user is listening to and what comes next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayQueue {
    pub current: Option<Track>,
    pub is_playing: bool,
    /// 0.0 ..= 1.0
    pub volume: f32,
    pub tracks: Vec<Track>,
    /// Seconds into the current track
    pub current_time: f64,
    pub duration: f64,
}

impl Default for PlayQueue {
    fn default() -> Self {
        Self {
            current: None,
            is_playing: false,
            volume: 1.0,
            tracks: Vec::new(),
            current_time: 0.0,
            duration: 0.0,
        }
    }
}

impl PlayQueue {
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    pub fn append(&mut self, tracks: Vec<Track>) {
        self.tracks.extend(tracks);
    }

    pub fn set_current(&mut self, track: Option<Track>) {
        self.current = track;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() { 1.0 } else { volume.clamp(0.0, 1.0) };
    }

    pub fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds.max(0.0);
    }

    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = seconds.max(0.0);
    }

    fn current_index(&self) -> Option<usize> {
        let current = self.current.as_ref()?;
        self.tracks.iter().position(|t| t.id == current.id)
    }

    fn jump_to(&mut self, index: usize) {
        self.current = self.tracks.get(index).cloned();
        self.current_time = 0.0;
        self.is_playing = true;
    }

    /// Move to the next track, wrapping to the start
    pub fn skip_forward(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        if let Some(index) = self.current_index() {
            self.jump_to((index + 1) % self.tracks.len());
        }
    }

    /// Move to the previous track, wrapping to the end
    pub fn skip_backward(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        if let Some(index) = self.current_index() {
            let len = self.tracks.len();
            self.jump_to((index + len - 1) % len);
        }
    }

    /// Attach parsed tags to every queued copy of a track
    pub fn attach_metadata(&mut self, track_id: &str, metadata: &AudioMetadata) {
        for track in self.tracks.iter_mut().filter(|t| t.id == track_id) {
            track.metadata = Some(metadata.clone());
        }
        if let Some(current) = self.current.as_mut().filter(|t| t.id == track_id) {
            current.metadata = Some(metadata.clone());
        }
    }
}

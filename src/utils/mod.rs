//! Utility modules for SoundVault

pub mod auth;
pub mod dates;
pub mod filesystem;

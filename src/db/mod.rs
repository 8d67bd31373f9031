//! Database module for SoundVault
//!
//! Rows live in Supabase; this module talks to its PostgREST interface.

mod engine;
pub mod tables;

pub use engine::{eq, DbScope, SupabaseEngine};

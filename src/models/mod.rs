//! Core data models for the player registry.

mod ids;
mod profile;
mod record;
mod tournament;

pub use ids::*;
pub use profile::*;
pub use record::*;
pub use tournament::*;

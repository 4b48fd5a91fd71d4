//! Identifier types.
//!
//! Two kinds of key flow through the registry and must not be confused:
//! - [`ScopeKey`]: unique per (player, tournament, stage) record.
//! - [`IdentityKey`]: the player identity used to merge records into a profile.
//!
//! [`EntityId`] provides deterministic SHA-256 derived ids for generated
//! identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Sentinel stage id meaning "whole event".
pub const ALL_STAGES: &str = "all";

/// A deterministic entity ID derived from content hash.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Generate an EntityId from input fields.
    /// Uses SHA256 and takes the first 16 characters for brevity.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let result = hasher.finalize();
        let hash = hex::encode(result);
        Self(hash[..16].to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// Scoped record id: `{raw_id}_{tournament_id}_{stage_id}`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ScopeKey(String);

impl ScopeKey {
    pub fn new(raw_id: &str, tournament_id: &str, stage_id: &str) -> Self {
        Self(format!("{}_{}_{}", raw_id, tournament_id, stage_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeKey({})", self.0)
    }
}

impl From<&str> for ScopeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Player identity key used to group records into one profile.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Pick the first non-empty candidate, in priority order.
    pub fn first_non_empty<'a, I>(candidates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({})", self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Fallback id for a row with no source identifier, derived from its content.
pub fn content_id(name: &str, team: &str, rating: &str) -> String {
    format!("gen-{}", EntityId::generate(&[name, team, rating]))
}

/// Pseudo identifier derived from a player name only.
///
/// The same name always yields the same id, so records repaired this way
/// re-merge on later imports.
pub fn name_pseudo_id(name: &str) -> String {
    format!("name-{}", EntityId::generate(&["player", name.trim()]))
}

/// Pseudo identifier for a record with neither an id nor a name, derived
/// from its scoped id so distinct records stay distinct.
pub fn scope_pseudo_id(scope: &ScopeKey) -> String {
    format!("scope-{}", EntityId::generate(&["scope", scope.as_str()]))
}

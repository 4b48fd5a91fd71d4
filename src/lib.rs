//! # Player Registry
//!
//! Imports competitive-match player statistics from heterogeneous spreadsheet
//! exports and aggregates them into one profile per player across tournaments.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (records, tournaments, profiles, keys)
//! - **ingest**: Sheet reading, column mapping, row normalization, scoping
//! - **calculate**: Profile aggregation, ranking and lookup
//! - **reconcile**: Identity repair for legacy registries
//! - **storage**: JSONL registry and tournament catalog
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod reconcile;
pub mod storage;

pub use calculate::aggregate;
pub use ingest::{import_batch, parse_sheet};
pub use models::*;
pub use reconcile::reconcile;

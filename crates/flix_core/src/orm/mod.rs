//! Explicit mapping between catalogue entities and SQLite tables.
//!
//! # Responsibility
//! - Name every mapped column and convert rows to entities (`tables`).
//! - Materialize and persist associations through junction tables
//!   (`relations`).
//!
//! # Invariants
//! - Cardinalities: User 1-N Review, Movie 1-N Review, Movie N-M
//!   Genre/Actor/Director, Actor N-N Actor via `actor_actors`.
//! - Loaded collections are ordered by the id of the other side.
//! - Link writers are idempotent for pairs that already exist.

pub mod relations;
pub mod tables;

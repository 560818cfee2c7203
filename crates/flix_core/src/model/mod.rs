//! Catalogue domain model.
//!
//! # Responsibility
//! - Define the entities browsed and reviewed by the application.
//! - Keep both ends of every association in sync while values live in memory.
//!
//! # Invariants
//! - Relationships are materialized as owned summaries (`GenreRef`,
//!   `PersonRef`, id lists), never as shared object graphs.
//! - Deletion is not modelled; entities are only created.

pub mod genre;
pub mod movie;
pub mod person;
pub mod review;
pub mod user;

pub type MovieId = i64;
pub type ActorId = i64;
pub type DirectorId = i64;
pub type GenreId = i64;
pub type UserId = i64;
pub type ReviewId = i64;

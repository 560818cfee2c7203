//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the one data-access contract the presentation layer may call.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Point lookups report "not found" as `None`, never as an error.
//! - `add_review` is the only write validated before persistence.
//! - Every write runs inside its own unit of work.

pub mod catalog_repo;

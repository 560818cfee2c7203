//! Core data layer for the CS235Flix movie catalogue.
//! This crate owns the domain model, the SQLite schema and every rule the
//! presentation layer relies on.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod orm;
pub mod password;
pub mod populate;
pub mod repo;
pub mod service;

pub use config::{ConfigError, FlixConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult, Session, SessionFactory, UnitOfWork};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::genre::{Genre, GenreRef};
pub use model::movie::{
    make_cast_association, make_director_association, make_genre_association, Movie,
};
pub use model::person::{Actor, Director, PersonRef};
pub use model::review::{make_review, Review, ReviewError};
pub use model::user::User;
pub use model::{ActorId, DirectorId, GenreId, MovieId, ReviewId, UserId};
pub use populate::{is_store_empty, populate, PopulateError, PopulateResult, PopulateSummary};
pub use repo::catalog_repo::{
    CatalogRepository, RepoError, RepoResult, SqliteCatalogRepository,
};
pub use service::catalog_service::{
    ActorProfile, CatalogService, CatalogServiceError, CatalogServiceResult, DirectorProfile,
    YearPage,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

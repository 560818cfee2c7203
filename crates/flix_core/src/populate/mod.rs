//! One-shot catalogue population from CSV sources.
//!
//! # Responsibility
//! - Read the movie, people, user and review sources into memory.
//! - Derive genres, junction rows and colleague pairs through an explicit
//!   `CrossReferences` accumulator.
//! - Bulk-insert everything in dependency order inside one transaction.
//!
//! # Invariants
//! - Runs only against an empty store.
//! - Either every row is written or none is.
//! - Logs carry counts only, never passwords or review text.

pub mod cross_refs;
pub mod records;

use crate::db::{DbError, UnitOfWork};
use crate::model::genre::Genre;
use crate::orm::relations::{
    insert_colleague_pair, insert_movie_actor, insert_movie_director, insert_movie_genre,
};
use crate::orm::tables::{
    insert_actor, insert_director, insert_genre, insert_movie, insert_review, insert_user,
};
use crate::password::PasswordError;
use crate::repo::catalog_repo::RepoError;
use cross_refs::genre_id_for_index;
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use cross_refs::CrossReferences;
pub use records::{load_sources, CatalogSources};

pub type PopulateResult<T> = Result<T, PopulateError>;

/// Tables checked before a load; any row in one of them means the store is
/// already populated.
const POPULATED_TABLES: &[&str] = &["movies", "actors", "directors", "genres", "users", "reviews"];

#[derive(Debug)]
pub enum PopulateError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        file: &'static str,
        source: csv::Error,
    },
    InvalidRecord {
        file: &'static str,
        line: u64,
        message: String,
    },
    StoreNotEmpty,
    Password(PasswordError),
    Repo(RepoError),
}

impl Display for PopulateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot open source `{}`: {source}", path.display())
            }
            Self::Csv { file, source } => write!(f, "malformed csv in `{file}`: {source}"),
            Self::InvalidRecord {
                file,
                line,
                message,
            } => write!(f, "invalid record in `{file}` at line {line}: {message}"),
            Self::StoreNotEmpty => write!(f, "refusing to populate a non-empty store"),
            Self::Password(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PopulateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Password(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InvalidRecord { .. } | Self::StoreNotEmpty => None,
        }
    }
}

impl From<PasswordError> for PopulateError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}

impl From<RepoError> for PopulateError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for PopulateError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for PopulateError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Rows written per table by one `populate` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub movies: usize,
    pub actors: usize,
    pub directors: usize,
    pub genres: usize,
    pub movie_genres: usize,
    pub movie_actors: usize,
    pub movie_directors: usize,
    pub colleague_pairs: usize,
    pub users: usize,
    pub reviews: usize,
}

/// Loads the CSV sources under `data_dir` into an empty store.
///
/// # Errors
/// - `StoreNotEmpty` when any catalogue table already holds rows.
/// - `Io`/`Csv`/`InvalidRecord` when a source cannot be read or parsed.
/// - `Repo` when the store rejects a row; nothing is committed then.
pub fn populate(conn: &Connection, data_dir: impl AsRef<Path>) -> PopulateResult<PopulateSummary> {
    let data_dir = data_dir.as_ref();
    let started_at = Instant::now();
    info!(
        "event=catalog_populate module=populate status=start data_dir={}",
        data_dir.display()
    );

    let result = run_populate(conn, data_dir);
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(summary) => info!(
            "event=catalog_populate module=populate status=ok movies={} actors={} directors={} genres={} users={} reviews={} colleague_pairs={} duration_ms={duration_ms}",
            summary.movies,
            summary.actors,
            summary.directors,
            summary.genres,
            summary.users,
            summary.reviews,
            summary.colleague_pairs,
        ),
        Err(err) => error!(
            "event=catalog_populate module=populate status=error duration_ms={duration_ms} error={err}"
        ),
    }
    result
}

/// Returns whether no catalogue table holds any row.
pub fn is_store_empty(conn: &Connection) -> PopulateResult<bool> {
    for table in POPULATED_TABLES {
        let has_rows: i64 = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table});"),
            [],
            |row| row.get(0),
        )?;
        if has_rows == 1 {
            return Ok(false);
        }
    }
    Ok(true)
}

fn run_populate(conn: &Connection, data_dir: &Path) -> PopulateResult<PopulateSummary> {
    if !is_store_empty(conn)? {
        return Err(PopulateError::StoreNotEmpty);
    }

    let sources = load_sources(data_dir)?;
    let uow = UnitOfWork::begin(conn, "catalog_populate")?;
    let summary = write_sources(&uow, &sources)?;
    uow.commit()?;
    Ok(summary)
}

fn write_sources(conn: &Connection, sources: &CatalogSources) -> PopulateResult<PopulateSummary> {
    let refs = &sources.cross_refs;
    let mut summary = PopulateSummary::default();

    for movie in &sources.movies {
        insert_movie(conn, movie)?;
    }
    summary.movies = sources.movies.len();

    for actor in &sources.actors {
        insert_actor(conn, actor)?;
    }
    summary.actors = sources.actors.len();

    for director in &sources.directors {
        insert_director(conn, director)?;
    }
    summary.directors = sources.directors.len();

    for (index, name) in refs.genre_names().enumerate() {
        let mut genre = Genre::new(name);
        genre.id = Some(genre_id_for_index(index));
        insert_genre(conn, &genre)?;
    }
    summary.genres = refs.genre_count();

    let movie_genres = refs.movie_genre_links();
    for &(movie_id, genre_id) in &movie_genres {
        insert_movie_genre(conn, movie_id, genre_id)?;
    }
    summary.movie_genres = movie_genres.len();

    let movie_actors = refs.movie_actor_links();
    for &(movie_id, actor_id) in &movie_actors {
        insert_movie_actor(conn, movie_id, actor_id)?;
    }
    summary.movie_actors = movie_actors.len();

    let movie_directors = refs.movie_director_links();
    for &(movie_id, director_id) in &movie_directors {
        insert_movie_director(conn, movie_id, director_id)?;
    }
    summary.movie_directors = movie_directors.len();

    let colleague_pairs = refs.colleague_pairs();
    for &(actor_id, colleague_id) in &colleague_pairs {
        insert_colleague_pair(conn, actor_id, colleague_id)?;
    }
    summary.colleague_pairs = colleague_pairs.len();

    for user in &sources.users {
        insert_user(conn, user)?;
    }
    summary.users = sources.users.len();

    for (review, user_id) in &sources.reviews {
        insert_review(conn, review, Some(*user_id))?;
    }
    summary.reviews = sources.reviews.len();

    Ok(summary)
}

//! Catalogue repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the read/write operations over movies, people, genres, users
//!   and reviews.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Reads return entities with every association loaded.
//! - Movie ordering is `release_year ASC, id ASC` wherever "first"/"last"
//!   is meant; collections are otherwise ordered by id.
//! - Username and genre name uniqueness is enforced by the store; actor and
//!   director name lookups resolve to the lowest id.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{DbError, UnitOfWork};
use crate::model::genre::Genre;
use crate::model::movie::Movie;
use crate::model::person::{Actor, Director};
use crate::model::review::{Review, ReviewError};
use crate::model::user::{normalize_username, User};
use crate::model::{ActorId, DirectorId, GenreId, MovieId, ReviewId, UserId};
use crate::orm::relations::{
    find_genre_id, link_actor, link_director, link_genre, link_movie_genres, link_movie_people,
    load_actor_relations, load_director_relations, load_genre_relations, load_movie_relations,
    load_user_relations, movie_ids_for_genre,
};
use crate::orm::tables::{
    actor_from_row, director_from_row, genre_from_row, insert_actor, insert_director,
    insert_genre, insert_movie, insert_review, insert_user, movie_from_row, review_from_row,
    user_from_row, ACTOR_SELECT_SQL, DIRECTOR_SELECT_SQL, GENRE_SELECT_SQL, MOVIE_SELECT_SQL,
    REQUIRED_COLUMNS, REVIEW_SELECT_SQL, USER_SELECT_SQL,
};
use log::{debug, warn};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Params};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Upper bound on bound parameters per batch lookup, well under SQLite's limit.
const MAX_IDS_PER_QUERY: usize = 500;

/// Repository error for catalogue persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Review is not linked both ways with its movie and user.
    Review(ReviewError),
    /// Transport or constraint failure raised by the store.
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Review(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalogue data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Review(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReviewError> for RepoError {
    fn from(value: ReviewError) -> Self {
        Self::Review(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    /// Returns whether the store rejected the write on a constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(failure, _)))
                if failure.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

/// Every persistence operation the application may perform.
pub trait CatalogRepository {
    /// Stores `movie` with its genre, cast and director links.
    ///
    /// Reviews carried on the movie are not written; reviews are stored only
    /// through `add_review`.
    fn add_movie(&self, movie: &Movie) -> RepoResult<MovieId>;
    fn add_genre(&self, genre: &Genre) -> RepoResult<GenreId>;
    /// Stores `user`. Reviews carried on the user are not written; reviews
    /// are stored only through `add_review`.
    fn add_user(&self, user: &User) -> RepoResult<UserId>;
    fn add_actor(&self, actor: &Actor) -> RepoResult<ActorId>;
    fn add_director(&self, director: &Director) -> RepoResult<DirectorId>;
    /// Stores `review` after checking it is linked both ways with `movie`
    /// and `user`.
    fn add_review(&self, review: &Review, movie: &Movie, user: &User) -> RepoResult<ReviewId>;

    fn get_movie(&self, id: MovieId) -> RepoResult<Option<Movie>>;
    fn get_actor(&self, full_name: &str) -> RepoResult<Option<Actor>>;
    fn get_director(&self, full_name: &str) -> RepoResult<Option<Director>>;
    fn get_user(&self, username: &str) -> RepoResult<Option<User>>;

    fn get_movies(&self) -> RepoResult<Vec<Movie>>;
    fn get_actors(&self) -> RepoResult<Vec<Actor>>;
    fn get_directors(&self) -> RepoResult<Vec<Director>>;
    fn get_genres(&self) -> RepoResult<Vec<Genre>>;
    fn get_reviews(&self) -> RepoResult<Vec<Review>>;

    /// Movies released in `year`, or every movie when `year` is `None`.
    fn get_movies_by_date(&self, year: Option<i32>) -> RepoResult<Vec<Movie>>;
    /// Movies whose id is listed; unknown ids are dropped.
    fn get_movies_by_id(&self, ids: &[MovieId]) -> RepoResult<Vec<Movie>>;
    /// Ascending ids of movies tagged by `genre_name`; empty when unknown.
    fn get_movie_ids_for_genre(&self, genre_name: &str) -> RepoResult<Vec<MovieId>>;
    fn get_first_movie(&self) -> RepoResult<Option<Movie>>;
    fn get_last_movie(&self) -> RepoResult<Option<Movie>>;
    /// Nearest release year strictly before `movie`'s.
    fn get_date_of_previous_movie(&self, movie: &Movie) -> RepoResult<Option<i32>>;
    /// Nearest release year strictly after `movie`'s.
    fn get_date_of_next_movie(&self, movie: &Movie) -> RepoResult<Option<i32>>;
    fn get_number_of_movies(&self) -> RepoResult<usize>;
    /// Actors sharing at least one movie with `actor`, ordered by id.
    fn get_actor_colleagues(&self, actor: &Actor) -> RepoResult<Vec<Actor>>;
}

/// SQLite-backed catalogue repository borrowing one session.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_movies<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Movie>> {
        let mut movies = {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params, movie_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for movie in &mut movies {
            load_movie_relations(self.conn, movie)?;
        }
        Ok(movies)
    }

    fn query_actors<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Actor>> {
        let mut actors = {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params, actor_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for actor in &mut actors {
            load_actor_relations(self.conn, actor)?;
        }
        Ok(actors)
    }

    fn query_directors<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Director>> {
        let mut directors = {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params, director_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for director in &mut directors {
            load_director_relations(self.conn, director)?;
        }
        Ok(directors)
    }

    fn query_year(&self, sql: &str, release_year: i32) -> RepoResult<Option<i32>> {
        let year = self
            .conn
            .query_row(sql, [release_year], |row| row.get::<_, Option<i32>>(0))?;
        Ok(year)
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn add_movie(&self, movie: &Movie) -> RepoResult<MovieId> {
        let uow = UnitOfWork::begin(self.conn, "add_movie")?;
        insert_movie(&uow, movie)?;
        link_movie_genres(&uow, movie)?;
        link_movie_people(&uow, movie)?;
        uow.commit()?;

        debug!(
            "event=repo_write module=repo op=add_movie status=ok id={} reviews_skipped={}",
            movie.id,
            movie.reviews.len()
        );
        Ok(movie.id)
    }

    fn add_genre(&self, genre: &Genre) -> RepoResult<GenreId> {
        let uow = UnitOfWork::begin(self.conn, "add_genre")?;
        let genre_id = insert_genre(&uow, genre)?;
        link_genre(&uow, genre_id, genre)?;
        uow.commit()?;

        debug!("event=repo_write module=repo op=add_genre status=ok id={genre_id}");
        Ok(genre_id)
    }

    fn add_user(&self, user: &User) -> RepoResult<UserId> {
        let uow = UnitOfWork::begin(self.conn, "add_user")?;
        let user_id = insert_user(&uow, user)?;
        uow.commit()?;

        debug!(
            "event=repo_write module=repo op=add_user status=ok id={user_id} reviews_skipped={}",
            user.reviews.len()
        );
        Ok(user_id)
    }

    fn add_actor(&self, actor: &Actor) -> RepoResult<ActorId> {
        let uow = UnitOfWork::begin(self.conn, "add_actor")?;
        insert_actor(&uow, actor)?;
        link_actor(&uow, actor)?;
        uow.commit()?;

        debug!("event=repo_write module=repo op=add_actor status=ok id={}", actor.id);
        Ok(actor.id)
    }

    fn add_director(&self, director: &Director) -> RepoResult<DirectorId> {
        let uow = UnitOfWork::begin(self.conn, "add_director")?;
        insert_director(&uow, director)?;
        link_director(&uow, director)?;
        uow.commit()?;

        debug!(
            "event=repo_write module=repo op=add_director status=ok id={}",
            director.id
        );
        Ok(director.id)
    }

    fn add_review(&self, review: &Review, movie: &Movie, user: &User) -> RepoResult<ReviewId> {
        if let Err(err) = review.ensure_linked(movie, user) {
            warn!("event=repo_write module=repo op=add_review status=rejected reason={err}");
            return Err(err.into());
        }

        let uow = UnitOfWork::begin(self.conn, "add_review")?;
        let user_id = match user.id {
            Some(user_id) => Some(user_id),
            None => uow
                .query_row(
                    "SELECT id FROM users WHERE username = ?1;",
                    [normalize_username(&user.username)],
                    |row| row.get::<_, UserId>(0),
                )
                .optional()?,
        };
        let review_id = insert_review(&uow, review, user_id)?;
        uow.commit()?;

        debug!(
            "event=repo_write module=repo op=add_review status=ok id={review_id} movie_id={}",
            movie.id
        );
        Ok(review_id)
    }

    fn get_movie(&self, id: MovieId) -> RepoResult<Option<Movie>> {
        let movie = self
            .query_movies(&format!("{MOVIE_SELECT_SQL} WHERE id = ?1;"), [id])?
            .into_iter()
            .next();
        Ok(movie)
    }

    fn get_actor(&self, full_name: &str) -> RepoResult<Option<Actor>> {
        let actor = self
            .query_actors(
                &format!("{ACTOR_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC LIMIT 1;"),
                [full_name.trim()],
            )?
            .into_iter()
            .next();
        Ok(actor)
    }

    fn get_director(&self, full_name: &str) -> RepoResult<Option<Director>> {
        let director = self
            .query_directors(
                &format!("{DIRECTOR_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC LIMIT 1;"),
                [full_name.trim()],
            )?
            .into_iter()
            .next();
        Ok(director)
    }

    fn get_user(&self, username: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
                [normalize_username(username)],
                user_from_row,
            )
            .optional()?;

        match user {
            Some(mut user) => {
                load_user_relations(self.conn, &mut user)?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    fn get_movies(&self) -> RepoResult<Vec<Movie>> {
        self.query_movies(&format!("{MOVIE_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn get_actors(&self) -> RepoResult<Vec<Actor>> {
        self.query_actors(&format!("{ACTOR_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn get_directors(&self) -> RepoResult<Vec<Director>> {
        self.query_directors(&format!("{DIRECTOR_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn get_genres(&self) -> RepoResult<Vec<Genre>> {
        let mut genres = {
            let mut stmt = self
                .conn
                .prepare(&format!("{GENRE_SELECT_SQL} ORDER BY id ASC;"))?;
            let rows = stmt.query_map([], genre_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for genre in &mut genres {
            load_genre_relations(self.conn, genre)?;
        }
        Ok(genres)
    }

    fn get_reviews(&self) -> RepoResult<Vec<Review>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVIEW_SELECT_SQL} ORDER BY r.id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(review_from_row(row)?);
        }
        Ok(reviews)
    }

    fn get_movies_by_date(&self, year: Option<i32>) -> RepoResult<Vec<Movie>> {
        match year {
            Some(year) => self.query_movies(
                &format!("{MOVIE_SELECT_SQL} WHERE release_year = ?1 ORDER BY id ASC;"),
                [year],
            ),
            None => self.get_movies(),
        }
    }

    fn get_movies_by_id(&self, ids: &[MovieId]) -> RepoResult<Vec<Movie>> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        // Sorted, disjoint chunks keep the merged result ordered by id.
        let mut movies = Vec::new();
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            movies.extend(self.query_movies(
                &format!("{MOVIE_SELECT_SQL} WHERE id IN ({placeholders}) ORDER BY id ASC;"),
                params_from_iter(chunk.iter()),
            )?);
        }
        Ok(movies)
    }

    fn get_movie_ids_for_genre(&self, genre_name: &str) -> RepoResult<Vec<MovieId>> {
        match find_genre_id(self.conn, genre_name.trim())? {
            Some(genre_id) => movie_ids_for_genre(self.conn, genre_id),
            None => Ok(Vec::new()),
        }
    }

    fn get_first_movie(&self) -> RepoResult<Option<Movie>> {
        let movie = self
            .query_movies(
                &format!("{MOVIE_SELECT_SQL} ORDER BY release_year ASC, id ASC LIMIT 1;"),
                [],
            )?
            .into_iter()
            .next();
        Ok(movie)
    }

    fn get_last_movie(&self) -> RepoResult<Option<Movie>> {
        let movie = self
            .query_movies(
                &format!("{MOVIE_SELECT_SQL} ORDER BY release_year DESC, id DESC LIMIT 1;"),
                [],
            )?
            .into_iter()
            .next();
        Ok(movie)
    }

    fn get_date_of_previous_movie(&self, movie: &Movie) -> RepoResult<Option<i32>> {
        self.query_year(
            "SELECT MAX(release_year) FROM movies WHERE release_year < ?1;",
            movie.release_year,
        )
    }

    fn get_date_of_next_movie(&self, movie: &Movie) -> RepoResult<Option<i32>> {
        self.query_year(
            "SELECT MIN(release_year) FROM movies WHERE release_year > ?1;",
            movie.release_year,
        )
    }

    fn get_number_of_movies(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM movies;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("invalid movie count `{count}`")))
    }

    fn get_actor_colleagues(&self, actor: &Actor) -> RepoResult<Vec<Actor>> {
        self.query_actors(
            &format!(
                "{ACTOR_SELECT_SQL}
                 WHERE id IN (SELECT colleague_id FROM actor_actors WHERE actor_id = ?1)
                 ORDER BY id ASC;"
            ),
            [actor.id],
        )
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

//! Table and column bindings plus row mappers and single-row writers.

use crate::model::genre::Genre;
use crate::model::movie::Movie;
use crate::model::person::{Actor, Director, PersonRef};
use crate::model::review::{Review, MAX_RATING, MIN_RATING, TIMESTAMP_FORMAT};
use crate::model::user::{normalize_username, User};
use crate::model::{GenreId, ReviewId, UserId};
use crate::repo::catalog_repo::{RepoError, RepoResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};

/// Mapped tables with the columns each must expose.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "movies",
        &[
            "id",
            "title",
            "release_year",
            "description",
            "hyperlink",
            "image_hyperlink",
        ],
    ),
    (
        "actors",
        &["id", "name", "description", "hyperlink", "image_hyperlink"],
    ),
    (
        "directors",
        &["id", "name", "description", "hyperlink", "image_hyperlink"],
    ),
    ("genres", &["id", "name"]),
    ("users", &["id", "username", "password"]),
    (
        "reviews",
        &[
            "id",
            "user_id",
            "movie_id",
            "rating",
            "review_text",
            "timestamp",
        ],
    ),
    ("movie_genres", &["id", "movie_id", "genre_id"]),
    ("movie_actors", &["id", "movie_id", "actor_id"]),
    ("movie_directors", &["id", "movie_id", "director_id"]),
    ("actor_actors", &["id", "actor_id", "colleague_id"]),
];

pub const MOVIE_SELECT_SQL: &str = "SELECT
    id,
    title,
    release_year,
    description,
    hyperlink,
    image_hyperlink
FROM movies";

pub const ACTOR_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    hyperlink,
    image_hyperlink
FROM actors";

pub const DIRECTOR_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    hyperlink,
    image_hyperlink
FROM directors";

pub const GENRE_SELECT_SQL: &str = "SELECT id, name FROM genres";

pub const USER_SELECT_SQL: &str = "SELECT id, username, password FROM users";

pub const REVIEW_SELECT_SQL: &str = "SELECT
    r.id,
    r.movie_id,
    u.username,
    r.rating,
    r.review_text,
    r.timestamp
FROM reviews r
INNER JOIN users u ON u.id = r.user_id";

/// Maps a `MOVIE_SELECT_SQL` row. Associations start empty.
pub fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get("id")?,
        title: row.get("title")?,
        release_year: row.get("release_year")?,
        description: row.get("description")?,
        hyperlink: row.get("hyperlink")?,
        image_hyperlink: row.get("image_hyperlink")?,
        genres: Vec::new(),
        actors: Vec::new(),
        directors: Vec::new(),
        reviews: Vec::new(),
    })
}

pub fn actor_from_row(row: &Row<'_>) -> rusqlite::Result<Actor> {
    Ok(Actor {
        id: row.get("id")?,
        full_name: row.get("name")?,
        description: row.get("description")?,
        hyperlink: row.get("hyperlink")?,
        image_hyperlink: row.get("image_hyperlink")?,
        acted_movies: Vec::new(),
        colleagues: Vec::new(),
    })
}

pub fn director_from_row(row: &Row<'_>) -> rusqlite::Result<Director> {
    Ok(Director {
        id: row.get("id")?,
        full_name: row.get("name")?,
        description: row.get("description")?,
        hyperlink: row.get("hyperlink")?,
        image_hyperlink: row.get("image_hyperlink")?,
        directed_movies: Vec::new(),
    })
}

pub fn genre_from_row(row: &Row<'_>) -> rusqlite::Result<Genre> {
    Ok(Genre {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        movie_ids: Vec::new(),
    })
}

pub fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get("id")?),
        username: row.get("username")?,
        password_hash: row.get("password")?,
        reviews: Vec::new(),
    })
}

/// Maps a `REVIEW_SELECT_SQL` row, rejecting values the schema should have
/// prevented.
pub fn review_from_row(row: &Row<'_>) -> RepoResult<Review> {
    let rating_value: i64 = row.get("rating")?;
    let rating = u8::try_from(rating_value)
        .ok()
        .filter(|value| (MIN_RATING..=MAX_RATING).contains(value))
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid rating `{rating_value}` in reviews.rating"))
        })?;

    let timestamp_text: String = row.get("timestamp")?;
    let timestamp = parse_timestamp(&timestamp_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{timestamp_text}` in reviews.timestamp"
        ))
    })?;

    Ok(Review {
        id: Some(row.get(0)?),
        movie_id: Some(row.get("movie_id")?),
        username: Some(row.get("username")?),
        rating,
        review_text: row.get("review_text")?,
        timestamp,
    })
}

/// Maps an `(id, name)` row of actors or directors.
pub fn person_ref_from_row(row: &Row<'_>) -> rusqlite::Result<PersonRef> {
    Ok(PersonRef {
        id: row.get(0)?,
        full_name: row.get(1)?,
    })
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn insert_movie(conn: &Connection, movie: &Movie) -> RepoResult<()> {
    conn.prepare_cached(
        "INSERT INTO movies (
            id,
            title,
            release_year,
            description,
            hyperlink,
            image_hyperlink
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
    )?
    .execute(params![
        movie.id,
        movie.title.as_str(),
        movie.release_year,
        movie.description.as_str(),
        movie.hyperlink.as_str(),
        movie.image_hyperlink.as_str(),
    ])?;
    Ok(())
}

pub fn insert_actor(conn: &Connection, actor: &Actor) -> RepoResult<()> {
    conn.prepare_cached(
        "INSERT INTO actors (
            id,
            name,
            description,
            hyperlink,
            image_hyperlink
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
    )?
    .execute(params![
        actor.id,
        actor.full_name.as_str(),
        actor.description.as_str(),
        actor.hyperlink.as_str(),
        actor.image_hyperlink.as_str(),
    ])?;
    Ok(())
}

pub fn insert_director(conn: &Connection, director: &Director) -> RepoResult<()> {
    conn.prepare_cached(
        "INSERT INTO directors (
            id,
            name,
            description,
            hyperlink,
            image_hyperlink
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
    )?
    .execute(params![
        director.id,
        director.full_name.as_str(),
        director.description.as_str(),
        director.hyperlink.as_str(),
        director.image_hyperlink.as_str(),
    ])?;
    Ok(())
}

/// Inserts a genre, keeping `genre.id` when set. Returns the stored id.
pub fn insert_genre(conn: &Connection, genre: &Genre) -> RepoResult<GenreId> {
    conn.prepare_cached("INSERT INTO genres (id, name) VALUES (?1, ?2);")?
        .execute(params![genre.id, genre.name.as_str()])?;
    Ok(conn.last_insert_rowid())
}

/// Inserts a user under its normalized username, keeping `user.id` when set.
/// Returns the stored id.
pub fn insert_user(conn: &Connection, user: &User) -> RepoResult<UserId> {
    conn.prepare_cached("INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3);")?
        .execute(params![
            user.id,
            normalize_username(&user.username),
            user.password_hash.as_str()
        ])?;
    Ok(conn.last_insert_rowid())
}

/// Inserts a review authored by `user_id`, keeping `review.id` when set.
///
/// A missing user or movie id is left for the store's NOT NULL and foreign
/// key constraints to reject.
pub fn insert_review(
    conn: &Connection,
    review: &Review,
    user_id: Option<UserId>,
) -> RepoResult<ReviewId> {
    conn.prepare_cached(
        "INSERT INTO reviews (
            id,
            user_id,
            movie_id,
            rating,
            review_text,
            timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
    )?
    .execute(params![
        review.id,
        user_id,
        review.movie_id,
        review.rating,
        review.review_text.as_str(),
        format_timestamp(&review.timestamp),
    ])?;
    Ok(conn.last_insert_rowid())
}

//! Relationship loaders and junction-row writers.

use super::tables::{insert_genre, person_ref_from_row, review_from_row, REVIEW_SELECT_SQL};
use crate::model::genre::{Genre, GenreRef};
use crate::model::movie::Movie;
use crate::model::person::{Actor, Director, PersonRef};
use crate::model::review::Review;
use crate::model::user::User;
use crate::model::{ActorId, DirectorId, GenreId, MovieId};
use crate::repo::catalog_repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Fills genres, cast, directors and reviews of a freshly mapped movie.
pub fn load_movie_relations(conn: &Connection, movie: &mut Movie) -> RepoResult<()> {
    movie.genres = load_genre_refs(conn, movie.id)?;
    movie.actors = query_person_refs(
        conn,
        "SELECT a.id, a.name
         FROM movie_actors ma
         INNER JOIN actors a ON a.id = ma.actor_id
         WHERE ma.movie_id = ?1
         ORDER BY a.id ASC;",
        movie.id,
    )?;
    movie.directors = query_person_refs(
        conn,
        "SELECT d.id, d.name
         FROM movie_directors md
         INNER JOIN directors d ON d.id = md.director_id
         WHERE md.movie_id = ?1
         ORDER BY d.id ASC;",
        movie.id,
    )?;
    movie.reviews = query_reviews(
        conn,
        &format!("{REVIEW_SELECT_SQL} WHERE r.movie_id = ?1 ORDER BY r.id ASC;"),
        movie.id,
    )?;
    Ok(())
}

/// Fills filmography and colleagues of a freshly mapped actor.
pub fn load_actor_relations(conn: &Connection, actor: &mut Actor) -> RepoResult<()> {
    actor.acted_movies = query_ids(
        conn,
        "SELECT movie_id FROM movie_actors WHERE actor_id = ?1 ORDER BY movie_id ASC;",
        actor.id,
    )?;
    actor.colleagues = load_colleague_refs(conn, actor.id)?;
    Ok(())
}

pub fn load_director_relations(conn: &Connection, director: &mut Director) -> RepoResult<()> {
    director.directed_movies = query_ids(
        conn,
        "SELECT movie_id FROM movie_directors WHERE director_id = ?1 ORDER BY movie_id ASC;",
        director.id,
    )?;
    Ok(())
}

pub fn load_genre_relations(conn: &Connection, genre: &mut Genre) -> RepoResult<()> {
    genre.movie_ids = match genre.id {
        Some(genre_id) => movie_ids_for_genre(conn, genre_id)?,
        None => Vec::new(),
    };
    Ok(())
}

pub fn load_user_relations(conn: &Connection, user: &mut User) -> RepoResult<()> {
    user.reviews = match user.id {
        Some(user_id) => query_reviews(
            conn,
            &format!("{REVIEW_SELECT_SQL} WHERE r.user_id = ?1 ORDER BY r.id ASC;"),
            user_id,
        )?,
        None => Vec::new(),
    };
    Ok(())
}

/// Movie ids tagged by `genre_id`, ascending.
pub fn movie_ids_for_genre(conn: &Connection, genre_id: GenreId) -> RepoResult<Vec<MovieId>> {
    query_ids(
        conn,
        "SELECT movie_id FROM movie_genres WHERE genre_id = ?1 ORDER BY movie_id ASC;",
        genre_id,
    )
}

/// Colleagues of `actor_id` through `actor_actors`, ordered by id.
pub fn load_colleague_refs(conn: &Connection, actor_id: ActorId) -> RepoResult<Vec<PersonRef>> {
    query_person_refs(
        conn,
        "SELECT a.id, a.name
         FROM actor_actors aa
         INNER JOIN actors a ON a.id = aa.colleague_id
         WHERE aa.actor_id = ?1
         ORDER BY a.id ASC;",
        actor_id,
    )
}

/// Writes the genre links a movie carries, storing genres unknown by name.
pub fn link_movie_genres(conn: &Connection, movie: &Movie) -> RepoResult<()> {
    for genre in &movie.genres {
        let genre_id = resolve_genre_id(conn, genre)?;
        insert_movie_genre(conn, movie.id, genre_id)?;
    }
    Ok(())
}

/// Writes the cast and director links a movie carries.
pub fn link_movie_people(conn: &Connection, movie: &Movie) -> RepoResult<()> {
    for actor in &movie.actors {
        insert_movie_actor(conn, movie.id, actor.id)?;
    }
    for director in &movie.directors {
        insert_movie_director(conn, movie.id, director.id)?;
    }
    Ok(())
}

/// Writes filmography links and both directions of every colleague edge.
pub fn link_actor(conn: &Connection, actor: &Actor) -> RepoResult<()> {
    for movie_id in &actor.acted_movies {
        insert_movie_actor(conn, *movie_id, actor.id)?;
    }
    for colleague in &actor.colleagues {
        insert_colleague_pair(conn, actor.id, colleague.id)?;
        insert_colleague_pair(conn, colleague.id, actor.id)?;
    }
    Ok(())
}

pub fn link_director(conn: &Connection, director: &Director) -> RepoResult<()> {
    for movie_id in &director.directed_movies {
        insert_movie_director(conn, *movie_id, director.id)?;
    }
    Ok(())
}

pub fn link_genre(conn: &Connection, genre_id: GenreId, genre: &Genre) -> RepoResult<()> {
    for movie_id in &genre.movie_ids {
        insert_movie_genre(conn, *movie_id, genre_id)?;
    }
    Ok(())
}

pub fn insert_movie_genre(conn: &Connection, movie_id: MovieId, genre_id: GenreId) -> RepoResult<()> {
    conn.prepare_cached("INSERT OR IGNORE INTO movie_genres (movie_id, genre_id) VALUES (?1, ?2);")?
        .execute(params![movie_id, genre_id])?;
    Ok(())
}

pub fn insert_movie_actor(conn: &Connection, movie_id: MovieId, actor_id: ActorId) -> RepoResult<()> {
    conn.prepare_cached("INSERT OR IGNORE INTO movie_actors (movie_id, actor_id) VALUES (?1, ?2);")?
        .execute(params![movie_id, actor_id])?;
    Ok(())
}

pub fn insert_movie_director(
    conn: &Connection,
    movie_id: MovieId,
    director_id: DirectorId,
) -> RepoResult<()> {
    conn.prepare_cached(
        "INSERT OR IGNORE INTO movie_directors (movie_id, director_id) VALUES (?1, ?2);",
    )?
    .execute(params![movie_id, director_id])?;
    Ok(())
}

/// Writes one directed colleague edge. Self-pairs are skipped.
pub fn insert_colleague_pair(
    conn: &Connection,
    actor_id: ActorId,
    colleague_id: ActorId,
) -> RepoResult<()> {
    if actor_id == colleague_id {
        return Ok(());
    }
    conn.prepare_cached(
        "INSERT OR IGNORE INTO actor_actors (actor_id, colleague_id) VALUES (?1, ?2);",
    )?
    .execute(params![actor_id, colleague_id])?;
    Ok(())
}

pub fn find_genre_id(conn: &Connection, name: &str) -> RepoResult<Option<GenreId>> {
    let genre_id = conn
        .prepare_cached("SELECT id FROM genres WHERE name = ?1;")?
        .query_row([name], |row| row.get(0))
        .optional()?;
    Ok(genre_id)
}

fn resolve_genre_id(conn: &Connection, genre: &GenreRef) -> RepoResult<GenreId> {
    if let Some(genre_id) = genre.id {
        return Ok(genre_id);
    }
    if let Some(genre_id) = find_genre_id(conn, &genre.name)? {
        return Ok(genre_id);
    }
    insert_genre(conn, &Genre::new(genre.name.as_str()))
}

fn load_genre_refs(conn: &Connection, movie_id: MovieId) -> RepoResult<Vec<GenreRef>> {
    let mut stmt = conn.prepare_cached(
        "SELECT g.id, g.name
         FROM movie_genres mg
         INNER JOIN genres g ON g.id = mg.genre_id
         WHERE mg.movie_id = ?1
         ORDER BY g.id ASC;",
    )?;
    let mut rows = stmt.query([movie_id])?;
    let mut genres = Vec::new();
    while let Some(row) = rows.next()? {
        genres.push(GenreRef {
            id: Some(row.get(0)?),
            name: row.get(1)?,
        });
    }
    Ok(genres)
}

fn query_ids(conn: &Connection, sql: &str, key: i64) -> RepoResult<Vec<i64>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query([key])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn query_person_refs(conn: &Connection, sql: &str, key: i64) -> RepoResult<Vec<PersonRef>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query([key])?;
    let mut people = Vec::new();
    while let Some(row) = rows.next()? {
        people.push(person_ref_from_row(row)?);
    }
    Ok(people)
}

fn query_reviews(conn: &Connection, sql: &str, key: i64) -> RepoResult<Vec<Review>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query([key])?;
    let mut reviews = Vec::new();
    while let Some(row) = rows.next()? {
        reviews.push(review_from_row(row)?);
    }
    Ok(reviews)
}

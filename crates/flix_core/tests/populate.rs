mod common;

use common::{count_rows, fixture_dir, populated_db_with_summary};
use flix_core::password::verify_password;
use flix_core::populate::{load_sources, records};
use flix_core::{
    is_store_empty, open_db_in_memory, populate, PopulateError, PopulateSummary,
};
use rusqlite::Connection;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[test]
fn populate_writes_every_table() {
    let (conn, summary) = populated_db_with_summary();

    assert_eq!(
        summary,
        PopulateSummary {
            movies: 14,
            actors: 10,
            directors: 12,
            genres: 7,
            movie_genres: 34,
            movie_actors: 15,
            movie_directors: 14,
            colleague_pairs: 20,
            users: 4,
            reviews: 5,
        }
    );
    assert_eq!(count_rows(&conn, "movies"), 14);
    assert_eq!(count_rows(&conn, "genres"), 7);
    assert_eq!(count_rows(&conn, "movie_genres"), 34);
    assert_eq!(count_rows(&conn, "movie_actors"), 15);
    assert_eq!(count_rows(&conn, "movie_directors"), 14);
    assert_eq!(count_rows(&conn, "actor_actors"), 20);
    assert_eq!(count_rows(&conn, "users"), 4);
    assert_eq!(count_rows(&conn, "reviews"), 5);
    assert!(!is_store_empty(&conn).unwrap());
}

#[test]
fn genre_ids_follow_first_appearance() {
    let (conn, _) = populated_db_with_summary();

    let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY id;").unwrap();
    let genres = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(
        genres,
        [
            (1, "Crime".to_string()),
            (2, "Drama".to_string()),
            (3, "Movie with director".to_string()),
            (4, "Action".to_string()),
            (5, "Sci-Fi".to_string()),
            (6, "Movie with actors".to_string()),
            (7, "Adventure".to_string()),
        ]
    );
}

#[test]
fn colleague_pairs_are_symmetric_without_self_pairs() {
    let (conn, _) = populated_db_with_summary();

    let pairs = colleague_pairs(&conn);
    assert_eq!(pairs.len(), 20);
    for &(actor_id, colleague_id) in &pairs {
        assert_ne!(actor_id, colleague_id);
        assert!(
            pairs.contains(&(colleague_id, actor_id)),
            "missing reverse of ({actor_id}, {colleague_id})"
        );
    }
}

#[test]
fn users_are_loaded_with_hashed_passwords() {
    let (conn, _) = populated_db_with_summary();

    let (username, password): (String, String) = conn
        .query_row("SELECT username, password FROM users WHERE id = 2;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(username, "fmercury");
    assert!(password.starts_with("$argon2"));
    assert!(verify_password("8734gfe2058v", &password).unwrap());
    assert!(!verify_password("wrong", &password).unwrap());
}

#[test]
fn reviews_keep_their_authors_and_timestamps() {
    let (conn, _) = populated_db_with_summary();

    let (user_id, movie_id, rating, timestamp): (i64, i64, i64, String) = conn
        .query_row(
            "SELECT user_id, movie_id, rating, timestamp FROM reviews WHERE id = 5;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!((user_id, movie_id, rating), (4, 9, 10));
    assert_eq!(timestamp, "2020-03-02 18:45:03");
}

#[test]
fn populate_refuses_non_empty_store() {
    let (conn, _) = populated_db_with_summary();

    let err = populate(&conn, fixture_dir()).unwrap_err();
    assert!(matches!(err, PopulateError::StoreNotEmpty));
    assert_eq!(count_rows(&conn, "movies"), 14);
}

#[test]
fn load_sources_threads_one_accumulator() {
    let sources = load_sources(&fixture_dir()).unwrap();

    assert_eq!(sources.movies.len(), 14);
    assert_eq!(sources.cross_refs.genre_count(), 7);
    assert_eq!(
        sources.cross_refs.genre_names().collect::<Vec<_>>()[..3],
        ["Crime", "Drama", "Movie with director"]
    );

    let shawshank = &sources.movies[4];
    assert_eq!(shawshank.title, "The Shawshank Redemption");
    let rdj = &sources.actors[0];
    assert_eq!(rdj.acted_movies, [10, 11, 14]);
    assert_eq!(sources.reviews[2].0.review_text, "I hope it's not as bad here as Italy!");
}

#[test]
fn malformed_number_reports_file_and_line() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path());
    fs::write(
        dir.path().join(records::ACTORS_FILE),
        "id,name,description,hyperlink,image_hyperlink,movie1\n\
         1,Good Actor,,,,1\n\
         2,Bad Actor,,,,one\n",
    )
    .unwrap();

    let conn = open_db_in_memory().unwrap();
    let err = populate(&conn, dir.path()).unwrap_err();
    match err {
        PopulateError::InvalidRecord { file, line, message } => {
            assert_eq!(file, records::ACTORS_FILE);
            assert_eq!(line, 3);
            assert!(message.contains("one"), "unexpected message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(is_store_empty(&conn).unwrap());
}

#[test]
fn rejected_row_rolls_back_everything() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path());
    fs::write(
        dir.path().join(records::USERS_FILE),
        "id,username,password\n1,twin,secret\n2,TWIN,secret\n",
    )
    .unwrap();
    fs::write(
        dir.path().join(records::REVIEWS_FILE),
        "id,user_id,movie_id,rating,review_text,timestamp\n",
    )
    .unwrap();

    let conn = open_db_in_memory().unwrap();
    let err = populate(&conn, dir.path()).unwrap_err();
    match err {
        PopulateError::Repo(repo_err) => assert!(repo_err.is_constraint_violation()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(is_store_empty(&conn).unwrap());
}

#[test]
fn missing_source_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let conn = open_db_in_memory().unwrap();
    let err = populate(&conn, dir.path()).unwrap_err();
    assert!(matches!(err, PopulateError::Io { .. }), "unexpected error: {err}");
}

fn colleague_pairs(conn: &Connection) -> HashSet<(i64, i64)> {
    let mut stmt = conn
        .prepare("SELECT actor_id, colleague_id FROM actor_actors;")
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap();
    rows.collect::<Result<HashSet<_>, _>>().unwrap()
}

fn copy_fixtures(target: &Path) {
    for entry in fs::read_dir(fixture_dir()).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), target.join(entry.file_name())).unwrap();
    }
}

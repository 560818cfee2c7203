mod common;

use common::populated_db;
use flix_core::{
    CatalogRepository, CatalogService, CatalogServiceError, ReviewError, SqliteCatalogRepository,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> CatalogService<SqliteCatalogRepository<'_>> {
    CatalogService::new(SqliteCatalogRepository::try_new(conn).unwrap())
}

#[test]
fn browse_defaults_to_the_earliest_year() {
    let conn = populated_db();
    let service = service(&conn);

    let page = service.browse_by_year(None).unwrap();
    assert_eq!(page.year, Some(1972));
    assert_eq!(page.movies.len(), 1);
    assert_eq!(page.previous_year, None);
    assert_eq!(page.next_year, Some(1993));
    assert_eq!(page.first_year, Some(1972));
    assert_eq!(page.last_year, Some(2020));
}

#[test]
fn browse_links_neighbouring_years() {
    let conn = populated_db();
    let service = service(&conn);

    let page = service.browse_by_year(Some(1994)).unwrap();
    assert_eq!(page.movies.len(), 3);
    assert_eq!(page.previous_year, Some(1993));
    assert_eq!(page.next_year, Some(1999));

    let empty = service.browse_by_year(Some(1980)).unwrap();
    assert!(empty.movies.is_empty());
    assert_eq!(empty.previous_year, None);
    assert_eq!(empty.next_year, None);
}

#[test]
fn movies_for_genre_loads_full_movies() {
    let conn = populated_db();
    let service = service(&conn);

    let movies = service.movies_for_genre("Movie with actors").unwrap();
    assert_eq!(
        movies.iter().map(|movie| movie.title.as_str()).collect::<Vec<_>>(),
        ["Captain America: Civil War", "Avengers: Endgame", "Joker", "Dolittle"]
    );
    assert!(service.movies_for_genre("Western").unwrap().is_empty());
}

#[test]
fn actor_and_director_profiles() {
    let conn = populated_db();
    let service = service(&conn);

    let profile = service.actor_profile("Tom Holland").unwrap().unwrap();
    assert_eq!(
        profile.movies.iter().map(|movie| movie.id).collect::<Vec<_>>(),
        [10, 14]
    );
    assert_eq!(
        profile
            .colleagues
            .iter()
            .map(|colleague| colleague.id)
            .collect::<Vec<_>>(),
        [1, 2, 3, 9]
    );
    assert!(service.actor_profile("Nobody Here").unwrap().is_none());

    let director = service.director_profile("Anthony Russo").unwrap().unwrap();
    assert_eq!(director.movies.len(), 2);
}

#[test]
fn registered_user_can_authenticate() {
    let conn = populated_db();
    let service = service(&conn);

    service.register_user("Nina", "pa55word").unwrap();
    assert!(service.authenticate("nina", "pa55word").unwrap().is_some());
    assert!(service.authenticate("nina", "wrong").unwrap().is_none());
    assert!(service.authenticate("ghost", "pa55word").unwrap().is_none());

    match service.register_user("NINA", "other").unwrap_err() {
        CatalogServiceError::Repo(err) => assert!(err.is_constraint_violation()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn post_review_links_and_stores_the_review() {
    let conn = populated_db();
    let service = service(&conn);

    service
        .post_review(12, "MJackson", "Unsettling and brilliant", 9)
        .unwrap();

    let movie = service.repository().get_movie(12);
    let reviews = movie.unwrap().unwrap().reviews;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].username.as_deref(), Some("mjackson"));
    assert_eq!(reviews[0].rating, 9);
}

#[test]
fn post_review_reports_unknown_targets_and_bad_ratings() {
    let conn = populated_db();
    let service = service(&conn);

    assert!(matches!(
        service.post_review(99, "thorke", "?", 5).unwrap_err(),
        CatalogServiceError::UnknownMovie(99)
    ));
    assert!(matches!(
        service.post_review(1, "ghost", "?", 5).unwrap_err(),
        CatalogServiceError::UnknownUser(_)
    ));
    assert!(matches!(
        service.post_review(1, "thorke", "?", 11).unwrap_err(),
        CatalogServiceError::Review(ReviewError::RatingOutOfRange(11))
    ));
}

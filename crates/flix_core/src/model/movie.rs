//! Movie entity and its association helpers.

use super::genre::{Genre, GenreRef};
use super::person::{Actor, Director, PersonRef};
use super::review::Review;
use super::{ActorId, MovieId};
use serde::{Deserialize, Serialize};

/// A catalogue entry keyed by the id it was published with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub release_year: i32,
    pub description: String,
    pub hyperlink: String,
    pub image_hyperlink: String,
    /// Genres tagging this movie, ordered by genre id once loaded.
    pub genres: Vec<GenreRef>,
    /// Cast, ordered by actor id once loaded.
    pub actors: Vec<PersonRef>,
    pub directors: Vec<PersonRef>,
    /// Reviews in insertion order.
    pub reviews: Vec<Review>,
}

impl Movie {
    /// Creates a movie without associations. Text fields are trimmed.
    pub fn new(
        id: MovieId,
        title: impl Into<String>,
        release_year: i32,
        description: impl Into<String>,
        hyperlink: impl Into<String>,
        image_hyperlink: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: trimmed(title),
            release_year,
            description: trimmed(description),
            hyperlink: trimmed(hyperlink),
            image_hyperlink: trimmed(image_hyperlink),
            genres: Vec::new(),
            actors: Vec::new(),
            directors: Vec::new(),
            reviews: Vec::new(),
        }
    }

    /// Returns whether a genre with this name tags the movie.
    pub fn is_tagged_by(&self, genre_name: &str) -> bool {
        self.genres.iter().any(|genre| genre.name == genre_name)
    }

    pub fn has_actor(&self, actor_id: ActorId) -> bool {
        self.actors.iter().any(|actor| actor.id == actor_id)
    }

    pub fn has_review(&self, review: &Review) -> bool {
        self.reviews.contains(review)
    }
}

/// Tags `movie` with `genre`, updating both sides.
pub fn make_genre_association(movie: &mut Movie, genre: &mut Genre) {
    if !movie.is_tagged_by(&genre.name) {
        movie.genres.push(GenreRef {
            id: genre.id,
            name: genre.name.clone(),
        });
    }
    if !genre.is_applied_to(movie.id) {
        genre.movie_ids.push(movie.id);
    }
}

/// Adds `actor` to the cast of `movie`, updating both sides.
pub fn make_cast_association(movie: &mut Movie, actor: &mut Actor) {
    if !movie.has_actor(actor.id) {
        movie.actors.push(actor.summary());
    }
    if !actor.acted_movies.contains(&movie.id) {
        actor.acted_movies.push(movie.id);
    }
}

/// Credits `director` on `movie`, updating both sides.
pub fn make_director_association(movie: &mut Movie, director: &mut Director) {
    if !movie.directors.iter().any(|item| item.id == director.id) {
        movie.directors.push(director.summary());
    }
    if !director.directed_movies.contains(&movie.id) {
        director.directed_movies.push(movie.id);
    }
}

pub(crate) fn trimmed(value: impl Into<String>) -> String {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{make_cast_association, make_genre_association, Movie};
    use crate::model::genre::Genre;
    use crate::model::person::Actor;

    fn sample_movie() -> Movie {
        Movie::new(
            1,
            "  The Godfather ",
            1972,
            "An organized crime dynasty.",
            "https://www.imdb.com/title/tt0068646/",
            "https://example.com/godfather.png",
        )
    }

    #[test]
    fn new_trims_text_fields() {
        let movie = sample_movie();
        assert_eq!(movie.title, "The Godfather");
        assert!(movie.genres.is_empty());
    }

    #[test]
    fn genre_association_links_both_sides_once() {
        let mut movie = sample_movie();
        let mut genre = Genre::new("Crime");

        make_genre_association(&mut movie, &mut genre);
        make_genre_association(&mut movie, &mut genre);

        assert!(movie.is_tagged_by("Crime"));
        assert_eq!(movie.genres.len(), 1);
        assert_eq!(genre.movie_ids, vec![1]);
        assert_eq!(genre.number_of_tagged_movies(), 1);
    }

    #[test]
    fn cast_association_links_both_sides() {
        let mut movie = sample_movie();
        let mut actor = Actor::new(7, "Al Pacino", "", "", "");

        make_cast_association(&mut movie, &mut actor);

        assert!(movie.has_actor(7));
        assert_eq!(actor.acted_movies, vec![1]);
    }
}

//! Genre entity.
//!
//! # Invariants
//! - Genre names are unique across the catalogue (enforced by the store).

use super::movie::trimmed;
use super::{GenreId, MovieId};
use serde::{Deserialize, Serialize};

/// Reference to a genre held on a movie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenreRef {
    /// `None` until the genre has been stored.
    pub id: Option<GenreId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Assigned by the store on insert.
    pub id: Option<GenreId>,
    pub name: String,
    /// Tagged movies, ascending once loaded.
    pub movie_ids: Vec<MovieId>,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: trimmed(name),
            movie_ids: Vec::new(),
        }
    }

    pub fn number_of_tagged_movies(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_applied_to(&self, movie_id: MovieId) -> bool {
        self.movie_ids.contains(&movie_id)
    }
}

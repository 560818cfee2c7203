//! Actor and director entities.
//!
//! # Invariants
//! - An actor never lists itself as a colleague.
//! - Colleague lists hold each actor at most once.

use super::movie::trimmed;
use super::{ActorId, DirectorId, MovieId};
use serde::{Deserialize, Serialize};

/// Lightweight reference to an actor or director, stored on the other side
/// of an association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: i64,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub full_name: String,
    pub description: String,
    pub hyperlink: String,
    pub image_hyperlink: String,
    /// Movies this actor appeared in, ascending once loaded.
    pub acted_movies: Vec<MovieId>,
    /// Actors sharing at least one movie with this one.
    pub colleagues: Vec<PersonRef>,
}

impl Actor {
    pub fn new(
        id: ActorId,
        full_name: impl Into<String>,
        description: impl Into<String>,
        hyperlink: impl Into<String>,
        image_hyperlink: impl Into<String>,
    ) -> Self {
        Self {
            id,
            full_name: trimmed(full_name),
            description: trimmed(description),
            hyperlink: trimmed(hyperlink),
            image_hyperlink: trimmed(image_hyperlink),
            acted_movies: Vec::new(),
            colleagues: Vec::new(),
        }
    }

    pub fn summary(&self) -> PersonRef {
        PersonRef {
            id: self.id,
            full_name: self.full_name.clone(),
        }
    }

    /// Records `colleague` as having worked with this actor.
    ///
    /// Returns `false` when the colleague is this actor or already listed.
    pub fn add_colleague(&mut self, colleague: &Actor) -> bool {
        if colleague.id == self.id || self.worked_with(colleague.id) {
            return false;
        }
        self.colleagues.push(colleague.summary());
        true
    }

    pub fn worked_with(&self, actor_id: ActorId) -> bool {
        self.colleagues.iter().any(|item| item.id == actor_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    pub id: DirectorId,
    pub full_name: String,
    pub description: String,
    pub hyperlink: String,
    pub image_hyperlink: String,
    /// Movies credited to this director, ascending once loaded.
    pub directed_movies: Vec<MovieId>,
}

impl Director {
    pub fn new(
        id: DirectorId,
        full_name: impl Into<String>,
        description: impl Into<String>,
        hyperlink: impl Into<String>,
        image_hyperlink: impl Into<String>,
    ) -> Self {
        Self {
            id,
            full_name: trimmed(full_name),
            description: trimmed(description),
            hyperlink: trimmed(hyperlink),
            image_hyperlink: trimmed(image_hyperlink),
            directed_movies: Vec::new(),
        }
    }

    pub fn summary(&self) -> PersonRef {
        PersonRef {
            id: self.id,
            full_name: self.full_name.clone(),
        }
    }
}

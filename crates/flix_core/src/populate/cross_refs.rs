//! Cross-reference accumulator built while reading the CSV sources.
//!
//! # Invariants
//! - Keys keep first-seen order; values keep first-seen order per key.
//! - A value is recorded at most once per key.
//! - Colleague pairs never contain self-pairs or repeats, and both
//!   directions of every pair are present.

use crate::model::{ActorId, DirectorId, GenreId, MovieId};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

#[derive(Debug, Clone)]
struct OrderedIndex<K> {
    entries: Vec<(K, Vec<i64>)>,
    positions: HashMap<K, usize>,
}

impl<K> Default for OrderedIndex<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> OrderedIndex<K> {
    fn push(&mut self, key: K, value: i64) {
        let position = match self.positions.get(&key) {
            Some(position) => *position,
            None => {
                self.entries.push((key.clone(), Vec::new()));
                self.positions.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let values = &mut self.entries[position].1;
        if !values.contains(&value) {
            values.push(value);
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&K, &[i64])> {
        self.entries
            .iter()
            .map(|(key, values)| (key, values.as_slice()))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Genre, cast and director indexes gathered from the CSV sources.
#[derive(Debug, Clone, Default)]
pub struct CrossReferences {
    genre_movies: OrderedIndex<String>,
    actor_movies: OrderedIndex<ActorId>,
    movie_actors: OrderedIndex<MovieId>,
    director_movies: OrderedIndex<DirectorId>,
}

impl CrossReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `genre_name` tags `movie_id`.
    pub fn tag_movie(&mut self, genre_name: &str, movie_id: MovieId) {
        self.genre_movies.push(genre_name.to_string(), movie_id);
    }

    /// Records that `actor_id` appears in `movie_id`.
    pub fn cast(&mut self, actor_id: ActorId, movie_id: MovieId) {
        self.actor_movies.push(actor_id, movie_id);
        self.movie_actors.push(movie_id, actor_id);
    }

    /// Records that `director_id` directed `movie_id`.
    pub fn credit(&mut self, director_id: DirectorId, movie_id: MovieId) {
        self.director_movies.push(director_id, movie_id);
    }

    /// Genre names in order of first appearance.
    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genre_movies.iter().map(|(name, _)| name.as_str())
    }

    pub fn genre_count(&self) -> usize {
        self.genre_movies.len()
    }

    /// Movies tagged by each genre, keyed by the genre id the loader assigns
    /// (`1..=n` in order of first appearance).
    pub fn movie_genre_links(&self) -> Vec<(MovieId, GenreId)> {
        let mut links = Vec::new();
        for (genre_index, (_, movie_ids)) in self.genre_movies.iter().enumerate() {
            let genre_id = genre_id_for_index(genre_index);
            links.extend(movie_ids.iter().map(|movie_id| (*movie_id, genre_id)));
        }
        links
    }

    pub fn movie_actor_links(&self) -> Vec<(MovieId, ActorId)> {
        let mut links = Vec::new();
        for (actor_id, movie_ids) in self.actor_movies.iter() {
            links.extend(movie_ids.iter().map(|movie_id| (*movie_id, *actor_id)));
        }
        links
    }

    pub fn movie_director_links(&self) -> Vec<(MovieId, DirectorId)> {
        let mut links = Vec::new();
        for (director_id, movie_ids) in self.director_movies.iter() {
            links.extend(movie_ids.iter().map(|movie_id| (*movie_id, *director_id)));
        }
        links
    }

    /// Every ordered pair of distinct actors sharing a movie, deduplicated.
    pub fn colleague_pairs(&self) -> Vec<(ActorId, ActorId)> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for (_, cast) in self.movie_actors.iter() {
            for &actor_id in cast {
                for &colleague_id in cast {
                    if actor_id != colleague_id && seen.insert((actor_id, colleague_id)) {
                        pairs.push((actor_id, colleague_id));
                    }
                }
            }
        }
        pairs
    }
}

pub(crate) fn genre_id_for_index(index: usize) -> GenreId {
    GenreId::try_from(index).map_or(GenreId::MAX, |value| value + 1)
}

//! Review entity and the linkage rules checked before it is stored.
//!
//! # Invariants
//! - `rating` is within `MIN_RATING..=MAX_RATING`.
//! - A storable review is contained in both its movie's and its user's
//!   review collections, and points back at both.

use super::movie::{trimmed, Movie};
use super::user::User;
use super::{MovieId, ReviewId};
use chrono::{NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// Storage and CSV format of review timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewError {
    RatingOutOfRange(u8),
    NotAttachedToUser,
    NotAttachedToMovie,
}

impl Display for ReviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RatingOutOfRange(value) => write!(
                f,
                "rating {value} is outside {MIN_RATING}..={MAX_RATING}"
            ),
            Self::NotAttachedToUser => write!(f, "review not correctly attached to a user"),
            Self::NotAttachedToMovie => write!(f, "review not correctly attached to a movie"),
        }
    }
}

impl Error for ReviewError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Assigned by the store on insert.
    pub id: Option<ReviewId>,
    pub movie_id: Option<MovieId>,
    /// Username of the author; usernames are unique.
    pub username: Option<String>,
    pub rating: u8,
    pub review_text: String,
    pub timestamp: NaiveDateTime,
}

impl Review {
    pub fn new(
        movie_id: Option<MovieId>,
        username: Option<String>,
        review_text: impl Into<String>,
        rating: u8,
        timestamp: NaiveDateTime,
    ) -> Result<Self, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ReviewError::RatingOutOfRange(rating));
        }
        Ok(Self {
            id: None,
            movie_id,
            username,
            rating,
            review_text: trimmed(review_text),
            timestamp,
        })
    }

    /// Checks the bidirectional links with `movie` and `user`.
    ///
    /// The user side is checked first.
    pub fn ensure_linked(&self, movie: &Movie, user: &User) -> Result<(), ReviewError> {
        if self.username.as_deref() != Some(user.username.as_str()) || !user.has_review(self) {
            return Err(ReviewError::NotAttachedToUser);
        }
        if self.movie_id != Some(movie.id) || !movie.has_review(self) {
            return Err(ReviewError::NotAttachedToMovie);
        }
        Ok(())
    }
}

/// Creates a review timestamped now and attaches it to `movie` and `user`.
pub fn make_review(
    review_text: impl Into<String>,
    rating: u8,
    movie: &mut Movie,
    user: &mut User,
) -> Result<Review, ReviewError> {
    let review = Review::new(
        Some(movie.id),
        Some(user.username.clone()),
        review_text,
        rating,
        now_to_the_second(),
    )?;
    movie.reviews.push(review.clone());
    user.reviews.push(review.clone());
    Ok(review)
}

fn now_to_the_second() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

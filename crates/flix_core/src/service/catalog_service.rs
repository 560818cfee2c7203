//! Catalogue use-case service.
//!
//! # Responsibility
//! - Turn repository calls into the browse, profile and review flows the
//!   presentation layer needs.
//! - Register and authenticate users without exposing password hashes.
//!
//! # Invariants
//! - Every read and write goes through `CatalogRepository`.
//! - Reviews are linked to their movie and user before they are stored.

use crate::model::movie::Movie;
use crate::model::person::{Actor, Director};
use crate::model::review::{make_review, ReviewError};
use crate::model::user::User;
use crate::model::{MovieId, ReviewId, UserId};
use crate::password::{hash_password, verify_password, PasswordError};
use crate::repo::catalog_repo::{CatalogRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CatalogServiceResult<T> = Result<T, CatalogServiceError>;

#[derive(Debug)]
pub enum CatalogServiceError {
    UnknownMovie(MovieId),
    UnknownUser(String),
    Review(ReviewError),
    Password(PasswordError),
    Repo(RepoError),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMovie(id) => write!(f, "movie {id} does not exist"),
            Self::UnknownUser(username) => write!(f, "user `{username}` does not exist"),
            Self::Review(err) => write!(f, "{err}"),
            Self::Password(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Review(err) => Some(err),
            Self::Password(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::UnknownMovie(_) | Self::UnknownUser(_) => None,
        }
    }
}

impl From<ReviewError> for CatalogServiceError {
    fn from(value: ReviewError) -> Self {
        Self::Review(value)
    }
}

impl From<PasswordError> for CatalogServiceError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// One page of the browse-by-year view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPage {
    /// `None` when the catalogue is empty.
    pub year: Option<i32>,
    pub movies: Vec<Movie>,
    pub previous_year: Option<i32>,
    pub next_year: Option<i32>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorProfile {
    pub actor: Actor,
    pub colleagues: Vec<Actor>,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorProfile {
    pub director: Director,
    pub movies: Vec<Movie>,
}

/// Use-case service over any catalogue repository.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Movies released in `year`, defaulting to the earliest year on record,
    /// with the neighbouring years for navigation.
    pub fn browse_by_year(&self, year: Option<i32>) -> CatalogServiceResult<YearPage> {
        let first_year = self.repo.get_first_movie()?.map(|movie| movie.release_year);
        let last_year = self.repo.get_last_movie()?.map(|movie| movie.release_year);
        let year = year.or(first_year);

        let movies = match year {
            Some(year) => self.repo.get_movies_by_date(Some(year))?,
            None => Vec::new(),
        };
        let (previous_year, next_year) = match movies.first() {
            Some(anchor) => (
                self.repo.get_date_of_previous_movie(anchor)?,
                self.repo.get_date_of_next_movie(anchor)?,
            ),
            None => (None, None),
        };

        Ok(YearPage {
            year,
            movies,
            previous_year,
            next_year,
            first_year,
            last_year,
        })
    }

    /// Movies tagged by `genre_name`, ordered by id; empty when the genre is
    /// unknown.
    pub fn movies_for_genre(&self, genre_name: &str) -> CatalogServiceResult<Vec<Movie>> {
        let ids = self.repo.get_movie_ids_for_genre(genre_name)?;
        Ok(self.repo.get_movies_by_id(&ids)?)
    }

    pub fn actor_profile(&self, full_name: &str) -> CatalogServiceResult<Option<ActorProfile>> {
        let Some(actor) = self.repo.get_actor(full_name)? else {
            return Ok(None);
        };
        let colleagues = self.repo.get_actor_colleagues(&actor)?;
        let movies = self.repo.get_movies_by_id(&actor.acted_movies)?;
        Ok(Some(ActorProfile {
            actor,
            colleagues,
            movies,
        }))
    }

    pub fn director_profile(
        &self,
        full_name: &str,
    ) -> CatalogServiceResult<Option<DirectorProfile>> {
        let Some(director) = self.repo.get_director(full_name)? else {
            return Ok(None);
        };
        let movies = self.repo.get_movies_by_id(&director.directed_movies)?;
        Ok(Some(DirectorProfile { director, movies }))
    }

    /// Registers a user, hashing `password` before it reaches the store.
    ///
    /// A taken username surfaces as a constraint violation from the store.
    pub fn register_user(&self, username: &str, password: &str) -> CatalogServiceResult<UserId> {
        let user = User::new(username, hash_password(password)?);
        let user_id = self.repo.add_user(&user)?;
        info!("event=user_register module=service status=ok user_id={user_id}");
        Ok(user_id)
    }

    /// Returns the stored user when `password` matches, `None` otherwise.
    pub fn authenticate(&self, username: &str, password: &str) -> CatalogServiceResult<Option<User>> {
        let Some(user) = self.repo.get_user(username)? else {
            return Ok(None);
        };
        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            warn!("event=user_authenticate module=service status=rejected");
            Ok(None)
        }
    }

    /// Creates a review by `username` for `movie_id` and stores it.
    pub fn post_review(
        &self,
        movie_id: MovieId,
        username: &str,
        review_text: &str,
        rating: u8,
    ) -> CatalogServiceResult<ReviewId> {
        let mut movie = self
            .repo
            .get_movie(movie_id)?
            .ok_or(CatalogServiceError::UnknownMovie(movie_id))?;
        let mut user = self
            .repo
            .get_user(username)?
            .ok_or_else(|| CatalogServiceError::UnknownUser(username.to_string()))?;

        let review = make_review(review_text, rating, &mut movie, &mut user)?;
        let review_id = self.repo.add_review(&review, &movie, &user)?;
        info!("event=review_post module=service status=ok movie_id={movie_id} review_id={review_id}");
        Ok(review_id)
    }
}

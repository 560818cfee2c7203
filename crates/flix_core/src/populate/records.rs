//! CSV source readers.
//!
//! Each reader trims cells, ignores empty trailing cells and feeds the
//! trailing association columns into the shared `CrossReferences`.

use super::cross_refs::CrossReferences;
use super::{PopulateError, PopulateResult};
use crate::model::movie::Movie;
use crate::model::person::{Actor, Director};
use crate::model::review::Review;
use crate::model::user::User;
use crate::model::UserId;
use crate::orm::tables::parse_timestamp;
use crate::password::hash_password;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

pub const MOVIES_FILE: &str = "movies.csv";
pub const ACTORS_FILE: &str = "actors.csv";
pub const DIRECTORS_FILE: &str = "directors.csv";
pub const USERS_FILE: &str = "users.csv";
pub const REVIEWS_FILE: &str = "comments.csv";

const MOVIE_FIXED_COLUMNS: usize = 6;
const PERSON_FIXED_COLUMNS: usize = 5;

/// Everything read from the CSV sources, ready to be inserted.
#[derive(Debug, Clone, Default)]
pub struct CatalogSources {
    pub movies: Vec<Movie>,
    pub actors: Vec<Actor>,
    pub directors: Vec<Director>,
    /// Users with their passwords already hashed.
    pub users: Vec<User>,
    /// Reviews paired with the id of their author.
    pub reviews: Vec<(Review, UserId)>,
    pub cross_refs: CrossReferences,
}

/// Reads every source under `data_dir`, threading one accumulator through
/// the readers and returning it with the rows.
pub fn load_sources(data_dir: &Path) -> PopulateResult<CatalogSources> {
    let mut cross_refs = CrossReferences::new();
    let movies = read_movies(data_dir, &mut cross_refs)?;
    let actors = read_actors(data_dir, &mut cross_refs)?;
    let directors = read_directors(data_dir, &mut cross_refs)?;
    let users = read_users(data_dir)?;
    let reviews = read_reviews(data_dir)?;

    Ok(CatalogSources {
        movies,
        actors,
        directors,
        users,
        reviews,
        cross_refs,
    })
}

pub fn read_movies(data_dir: &Path, cross_refs: &mut CrossReferences) -> PopulateResult<Vec<Movie>> {
    let mut movies = Vec::new();
    for_each_record(data_dir, MOVIES_FILE, |record| {
        let id = parse_cell(&record, 0, "id")?;
        let movie = Movie::new(
            id,
            text_cell(&record, 1),
            parse_cell(&record, 2, "year")?,
            text_cell(&record, 3),
            text_cell(&record, 4),
            text_cell(&record, 5),
        );
        for genre_name in trailing_cells(&record, MOVIE_FIXED_COLUMNS) {
            cross_refs.tag_movie(genre_name, id);
        }
        movies.push(movie);
        Ok(())
    })?;
    Ok(movies)
}

pub fn read_actors(data_dir: &Path, cross_refs: &mut CrossReferences) -> PopulateResult<Vec<Actor>> {
    let mut actors = Vec::new();
    for_each_record(data_dir, ACTORS_FILE, |record| {
        let id = parse_cell(&record, 0, "id")?;
        let mut actor = Actor::new(
            id,
            text_cell(&record, 1),
            text_cell(&record, 2),
            text_cell(&record, 3),
            text_cell(&record, 4),
        );
        for movie_id in trailing_ids(&record, PERSON_FIXED_COLUMNS)? {
            cross_refs.cast(id, movie_id);
            actor.acted_movies.push(movie_id);
        }
        actors.push(actor);
        Ok(())
    })?;
    Ok(actors)
}

pub fn read_directors(
    data_dir: &Path,
    cross_refs: &mut CrossReferences,
) -> PopulateResult<Vec<Director>> {
    let mut directors = Vec::new();
    for_each_record(data_dir, DIRECTORS_FILE, |record| {
        let id = parse_cell(&record, 0, "id")?;
        let mut director = Director::new(
            id,
            text_cell(&record, 1),
            text_cell(&record, 2),
            text_cell(&record, 3),
            text_cell(&record, 4),
        );
        for movie_id in trailing_ids(&record, PERSON_FIXED_COLUMNS)? {
            cross_refs.credit(id, movie_id);
            director.directed_movies.push(movie_id);
        }
        directors.push(director);
        Ok(())
    })?;
    Ok(directors)
}

/// Reads `users.csv` (id, username, plaintext password) and hashes every
/// password.
pub fn read_users(data_dir: &Path) -> PopulateResult<Vec<User>> {
    let mut users = Vec::new();
    for_each_record(data_dir, USERS_FILE, |record| {
        let mut user = User::new(text_cell(&record, 1), hash_password(text_cell(&record, 2))?);
        user.id = Some(parse_cell(&record, 0, "id")?);
        users.push(user);
        Ok(())
    })?;
    Ok(users)
}

/// Reads `comments.csv` (id, user id, movie id, rating, text, timestamp).
pub fn read_reviews(data_dir: &Path) -> PopulateResult<Vec<(Review, UserId)>> {
    let mut reviews = Vec::new();
    for_each_record(data_dir, REVIEWS_FILE, |record| {
        let user_id: UserId = parse_cell(&record, 1, "user id")?;
        let rating: u8 = parse_cell(&record, 3, "rating")?;
        let timestamp = parse_timestamp(text_cell(&record, 5)).ok_or_else(|| {
            invalid_record(
                &record,
                format!("invalid timestamp `{}`", text_cell(&record, 5)),
            )
        })?;
        let mut review = Review::new(
            Some(parse_cell(&record, 2, "movie id")?),
            None,
            text_cell(&record, 4),
            rating,
            timestamp,
        )
        .map_err(|err| invalid_record(&record, err.to_string()))?;
        review.id = Some(parse_cell(&record, 0, "id")?);
        reviews.push((review, user_id));
        Ok(())
    })?;
    Ok(reviews)
}

fn for_each_record(
    data_dir: &Path,
    file: &'static str,
    mut handle: impl FnMut(StringRecord) -> Result<(), RecordError>,
) -> PopulateResult<()> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(open_source(data_dir, file)?);

    for result in reader.records() {
        let record = result.map_err(|source| PopulateError::Csv { file, source })?;
        handle(record).map_err(|err| err.into_populate_error(file))?;
    }
    Ok(())
}

fn open_source(data_dir: &Path, file: &'static str) -> PopulateResult<File> {
    let path = data_dir.join(file);
    File::open(&path).map_err(|source| PopulateError::Io { path, source })
}

/// Failure raised while handling one record, before the file is known.
enum RecordError {
    Invalid { line: u64, message: String },
    Password(crate::password::PasswordError),
}

impl RecordError {
    fn into_populate_error(self, file: &'static str) -> PopulateError {
        match self {
            Self::Invalid { line, message } => PopulateError::InvalidRecord {
                file,
                line,
                message,
            },
            Self::Password(err) => PopulateError::Password(err),
        }
    }
}

impl From<crate::password::PasswordError> for RecordError {
    fn from(value: crate::password::PasswordError) -> Self {
        Self::Password(value)
    }
}

fn invalid_record(record: &StringRecord, message: String) -> RecordError {
    RecordError::Invalid {
        line: record.position().map_or(0, |position| position.line()),
        message,
    }
}

fn text_cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn parse_cell<T: FromStr>(
    record: &StringRecord,
    index: usize,
    column: &str,
) -> Result<T, RecordError> {
    let value = text_cell(record, index);
    value
        .parse()
        .map_err(|_| invalid_record(record, format!("invalid {column} `{value}`")))
}

fn trailing_cells(record: &StringRecord, fixed_columns: usize) -> impl Iterator<Item = &str> {
    record
        .iter()
        .skip(fixed_columns)
        .filter(|value| !value.is_empty())
}

fn trailing_ids(record: &StringRecord, fixed_columns: usize) -> Result<Vec<i64>, RecordError> {
    trailing_cells(record, fixed_columns)
        .map(|value| {
            value
                .parse()
                .map_err(|_| invalid_record(record, format!("invalid movie id `{value}`")))
        })
        .collect()
}

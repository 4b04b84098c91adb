//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use rh_core::MovieId;
use uuid::Uuid;

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

/// Column list matching [`Movie::from_row`].
pub(crate) const MOVIE_COLUMNS: &str = "id, title, description, file_path, thumbnail_path, \
     duration, genre, release_year, rating, file_size, video_codec, resolution, \
     created_at, updated_at";

/// A catalog entry pointing at one video file on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub description: Option<String>,
    /// Absolute path to the video file.
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    /// Runtime in seconds.
    pub duration: Option<i64>,
    pub genre: Option<String>,
    pub release_year: Option<i64>,
    pub rating: Option<f64>,
    /// Size in bytes as recorded when the movie was catalogued.
    pub file_size: Option<i64>,
    pub video_codec: Option<String>,
    /// e.g. `1920x1080`.
    pub resolution: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Movie {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            file_path: row.get(3)?,
            thumbnail_path: row.get(4)?,
            duration: row.get(5)?,
            genre: row.get(6)?,
            release_year: row.get(7)?,
            rating: row.get(8)?,
            file_size: row.get(9)?,
            video_codec: row.get(10)?,
            resolution: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }
}

/// Fields accepted when inserting a movie.
#[derive(Debug, Clone, Default)]
pub struct NewMovie {
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    pub duration: Option<i64>,
    pub genre: Option<String>,
    pub release_year: Option<i64>,
    pub rating: Option<f64>,
    pub file_size: Option<i64>,
    pub video_codec: Option<String>,
    pub resolution: Option<String>,
}

/// Partial update: `None` leaves the stored column untouched.
#[derive(Debug, Clone, Default)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub duration: Option<i64>,
    pub genre: Option<String>,
    pub release_year: Option<i64>,
    pub rating: Option<f64>,
    pub file_size: Option<i64>,
    pub video_codec: Option<String>,
    pub resolution: Option<String>,
}

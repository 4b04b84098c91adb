//! Movie CRUD operations and catalog helpers.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rh_core::{Error, MovieId, Result};

use crate::models::{Movie, MovieUpdate, NewMovie, MOVIE_COLUMNS};

/// Insert a new movie.
pub fn create_movie(conn: &Connection, new: &NewMovie) -> Result<Movie> {
    let id = MovieId::new();
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO movies (id, title, description, file_path, thumbnail_path, duration,
                             genre, release_year, rating, file_size, video_codec, resolution,
                             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
        params![
            id.to_string(),
            new.title,
            new.description,
            new.file_path,
            new.thumbnail_path,
            new.duration,
            new.genre,
            new.release_year,
            new.rating,
            new.file_size,
            new.video_codec,
            new.resolution,
            now,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Movie {
        id,
        title: new.title.clone(),
        description: new.description.clone(),
        file_path: new.file_path.clone(),
        thumbnail_path: new.thumbnail_path.clone(),
        duration: new.duration,
        genre: new.genre.clone(),
        release_year: new.release_year,
        rating: new.rating,
        file_size: new.file_size,
        video_codec: new.video_codec.clone(),
        resolution: new.resolution.clone(),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Get a movie by ID.
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Option<Movie>> {
    conn.query_row(
        &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?1"),
        [id.to_string()],
        Movie::from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List all movies, newest first.
pub fn list_movies(conn: &Connection) -> Result<Vec<Movie>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at DESC, rowid DESC"
        ))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Movie::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Apply a partial update. Returns the updated movie, or `None` if no row
/// has this ID.
pub fn update_movie(conn: &Connection, id: MovieId, update: &MovieUpdate) -> Result<Option<Movie>> {
    let now = Utc::now().to_rfc3339();
    let n = conn
        .execute(
            "UPDATE movies SET
                title          = COALESCE(?1, title),
                description    = COALESCE(?2, description),
                file_path      = COALESCE(?3, file_path),
                thumbnail_path = COALESCE(?4, thumbnail_path),
                duration       = COALESCE(?5, duration),
                genre          = COALESCE(?6, genre),
                release_year   = COALESCE(?7, release_year),
                rating         = COALESCE(?8, rating),
                file_size      = COALESCE(?9, file_size),
                video_codec    = COALESCE(?10, video_codec),
                resolution     = COALESCE(?11, resolution),
                updated_at     = ?12
             WHERE id = ?13",
            params![
                update.title,
                update.description,
                update.file_path,
                update.thumbnail_path,
                update.duration,
                update.genre,
                update.release_year,
                update.rating,
                update.file_size,
                update.video_codec,
                update.resolution,
                now,
                id.to_string(),
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if n == 0 {
        return Ok(None);
    }
    get_movie(conn, id)
}

/// Delete a movie. Returns `false` if no row had this ID.
pub fn delete_movie(conn: &Connection, id: MovieId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM movies WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Distinct non-null genres, sorted alphabetically.
pub fn list_genres(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT genre FROM movies WHERE genre IS NOT NULL ORDER BY genre")
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Distinct non-null release years, ascending.
pub fn list_years(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT release_year FROM movies
             WHERE release_year IS NOT NULL ORDER BY release_year",
        )
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<i64>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

//! Movie catalog CRUD route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use rh_db::models::{Movie, MovieUpdate, NewMovie};

use crate::context::AppContext;
use crate::error::AppError;

const MAX_TITLE_CHARS: usize = 255;
const MIN_RELEASE_YEAR: i64 = 1900;

/// Request body for creating a movie.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CreateMovieRequest {
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

/// Request body for a partial movie update. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct UpdateMovieRequest {
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

/// Movie response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieResponse {
    pub id: String,
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
    pub created_at: String,
    pub updated_at: String,
    pub formatted_file_size: Option<String>,
    pub formatted_duration: Option<String>,
    pub stream_url: String,
}

impl MovieResponse {
    fn from_model(m: &Movie) -> Self {
        Self {
            id: m.id.to_string(),
            title: m.title.clone(),
            description: m.description.clone(),
            file_path: m.file_path.clone(),
            thumbnail_path: m.thumbnail_path.clone(),
            duration: m.duration,
            genre: m.genre.clone(),
            release_year: m.release_year,
            rating: m.rating,
            file_size: m.file_size,
            video_codec: m.video_codec.clone(),
            resolution: m.resolution.clone(),
            created_at: m.created_at.clone(),
            updated_at: m.updated_at.clone(),
            formatted_file_size: m.file_size.and_then(format_file_size),
            formatted_duration: m.duration.and_then(format_duration),
            stream_url: format!("/api/stream/{}", m.id),
        }
    }
}

/// Response for a successful delete.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

/// Human-readable size, e.g. `1.5 GB`. `None` for zero or negative sizes.
pub fn format_file_size(bytes: i64) -> Option<String> {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes <= 0 {
        return None;
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    Some(format!("{rounded} {}", UNITS[unit]))
}

/// `HH:MM:SS` from one hour up, `MM:SS` below. `None` for zero or negative.
pub fn format_duration(secs: i64) -> Option<String> {
    if secs <= 0 {
        return None;
    }

    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        Some(format!("{hours:02}:{minutes:02}:{seconds:02}"))
    } else {
        Some(format!("{minutes:02}:{seconds:02}"))
    }
}

/// Field checks shared by create and update. Only present fields are checked.
fn check_fields(
    errors: &mut Vec<String>,
    title: Option<&str>,
    file_path: Option<&str>,
    duration: Option<i64>,
    release_year: Option<i64>,
    rating: Option<f64>,
    file_size: Option<i64>,
) {
    if let Some(title) = title {
        if title.trim().is_empty() {
            errors.push("title must not be empty".into());
        } else if title.chars().count() > MAX_TITLE_CHARS {
            errors.push(format!("title must be at most {MAX_TITLE_CHARS} characters"));
        }
    }
    if let Some(path) = file_path {
        if path.trim().is_empty() {
            errors.push("file_path must not be empty".into());
        }
    }
    if duration.is_some_and(|d| d < 0) {
        errors.push("duration must not be negative".into());
    }
    if let Some(year) = release_year {
        let max_year = i64::from(chrono::Utc::now().year()) + 1;
        if !(MIN_RELEASE_YEAR..=max_year).contains(&year) {
            errors.push(format!(
                "release_year must be between {MIN_RELEASE_YEAR} and {max_year}"
            ));
        }
    }
    if rating.is_some_and(|r| !(0.0..=10.0).contains(&r)) {
        errors.push("rating must be between 0 and 10".into());
    }
    if file_size.is_some_and(|s| s < 0) {
        errors.push("file_size must not be negative".into());
    }
}

fn into_result(errors: Vec<String>) -> rh_core::Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(rh_core::Error::Validation(errors.join("; ")))
    }
}

impl CreateMovieRequest {
    fn validate(self) -> rh_core::Result<NewMovie> {
        let mut errors = Vec::new();
        if self.title.is_none() {
            errors.push("title is required".into());
        }
        if self.file_path.is_none() {
            errors.push("file_path is required".into());
        }
        check_fields(
            &mut errors,
            self.title.as_deref(),
            self.file_path.as_deref(),
            self.duration,
            self.release_year,
            self.rating,
            self.file_size,
        );
        into_result(errors)?;

        Ok(NewMovie {
            title: self.title.unwrap_or_default(),
            description: self.description,
            file_path: self.file_path.unwrap_or_default(),
            thumbnail_path: self.thumbnail_path,
            duration: self.duration,
            genre: self.genre,
            release_year: self.release_year,
            rating: self.rating,
            file_size: self.file_size,
            video_codec: self.video_codec,
            resolution: self.resolution,
        })
    }
}

impl UpdateMovieRequest {
    fn validate(self) -> rh_core::Result<MovieUpdate> {
        let mut errors = Vec::new();
        check_fields(
            &mut errors,
            self.title.as_deref(),
            self.file_path.as_deref(),
            self.duration,
            self.release_year,
            self.rating,
            self.file_size,
        );
        into_result(errors)?;

        Ok(MovieUpdate {
            title: self.title,
            description: self.description,
            file_path: self.file_path,
            thumbnail_path: self.thumbnail_path,
            duration: self.duration,
            genre: self.genre,
            release_year: self.release_year,
            rating: self.rating,
            file_size: self.file_size,
            video_codec: self.video_codec,
            resolution: self.resolution,
        })
    }
}

/// GET /api/movies
#[utoipa::path(
    get,
    path = "/api/movies",
    responses(
        (status = 200, description = "All movies, newest first", body = Vec<MovieResponse>)
    )
)]
pub async fn list_movies(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<MovieResponse>>, AppError> {
    let conn = rh_db::pool::get_conn(&ctx.db)?;
    let movies = rh_db::queries::movies::list_movies(&conn)?;
    Ok(Json(movies.iter().map(MovieResponse::from_model).collect()))
}

/// GET /api/movies/:id
#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie details", body = MovieResponse),
        (status = 404, description = "Movie not found")
    )
)]
pub async fn get_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<MovieResponse>, AppError> {
    let movie_id = super::parse_movie_id(&id)?;

    let conn = rh_db::pool::get_conn(&ctx.db)?;
    let movie = rh_db::queries::movies::get_movie(&conn, movie_id)?
        .ok_or_else(|| rh_core::Error::not_found("movie", movie_id))?;

    Ok(Json(MovieResponse::from_model(&movie)))
}

/// POST /api/movies
#[utoipa::path(
    post,
    path = "/api/movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created", body = MovieResponse),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_movie(
    State(ctx): State<AppContext>,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = payload.validate()?;

    let conn = rh_db::pool::get_conn(&ctx.db)?;
    let movie = rh_db::queries::movies::create_movie(&conn, &new)?;
    tracing::info!(movie_id = %movie.id, title = %movie.title, "Movie created");

    Ok((StatusCode::CREATED, Json(MovieResponse::from_model(&movie))))
}

/// PUT /api/movies/:id
#[utoipa::path(
    put,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie ID")),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Movie updated", body = MovieResponse),
        (status = 404, description = "Movie not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMovieRequest>,
) -> Result<Json<MovieResponse>, AppError> {
    let movie_id = super::parse_movie_id(&id)?;
    let update = payload.validate()?;

    let conn = rh_db::pool::get_conn(&ctx.db)?;
    let movie = rh_db::queries::movies::update_movie(&conn, movie_id, &update)?
        .ok_or_else(|| rh_core::Error::not_found("movie", movie_id))?;

    Ok(Json(MovieResponse::from_model(&movie)))
}

/// DELETE /api/movies/:id
#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    params(("id" = String, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Movie deleted", body = DeleteResponse),
        (status = 404, description = "Movie not found")
    )
)]
pub async fn delete_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let movie_id = super::parse_movie_id(&id)?;

    let conn = rh_db::pool::get_conn(&ctx.db)?;
    if !rh_db::queries::movies::delete_movie(&conn, movie_id)? {
        return Err(rh_core::Error::not_found("movie", movie_id).into());
    }
    tracing::info!(movie_id = %movie_id, "Movie deleted");

    Ok(Json(DeleteResponse {
        message: "Movie deleted successfully".into(),
    }))
}

/// GET /api/genres
#[utoipa::path(
    get,
    path = "/api/genres",
    responses((status = 200, description = "Distinct genres", body = Vec<String>))
)]
pub async fn list_genres(State(ctx): State<AppContext>) -> Result<Json<Vec<String>>, AppError> {
    let conn = rh_db::pool::get_conn(&ctx.db)?;
    Ok(Json(rh_db::queries::movies::list_genres(&conn)?))
}

/// GET /api/years
#[utoipa::path(
    get,
    path = "/api/years",
    responses((status = 200, description = "Distinct release years", body = Vec<i64>))
)]
pub async fn list_years(State(ctx): State<AppContext>) -> Result<Json<Vec<i64>>, AppError> {
    let conn = rh_db::pool::get_conn(&ctx.db)?;
    Ok(Json(rh_db::queries::movies::list_years(&conn)?))
}

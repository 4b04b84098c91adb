//! Video streaming route.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;

use crate::context::AppContext;
use crate::error::AppError;
use crate::streaming;

/// GET /api/stream/:id
///
/// Resolve the movie through the catalog and stream its file, honouring a
/// single-span `Range` header.
#[utoipa::path(
    get,
    path = "/api/stream/{id}",
    params(
        ("id" = String, Path, description = "Movie ID"),
        ("Range" = Option<String>, Header, description = "bytes=<start>-[<end>]")
    ),
    responses(
        (status = 200, description = "Whole file"),
        (status = 206, description = "Requested byte range"),
        (status = 404, description = "Unknown movie, or its file is missing on the server"),
        (status = 416, description = "Range outside the file")
    )
)]
pub async fn stream_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let movie_id = super::parse_movie_id(&id)?;
    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    let location = ctx.catalog.resolve(movie_id).await?;
    Ok(streaming::serve_resource(&location, range_header).await?)
}

//! Route handlers for the HTTP API.

pub mod health;
pub mod movies;
pub mod stream;

use rh_core::MovieId;

/// Parse a movie ID from a path segment.
///
/// IDs are opaque to clients, so one that cannot be parsed names no movie
/// and is reported the same way as an unknown one.
pub(crate) fn parse_movie_id(raw: &str) -> rh_core::Result<MovieId> {
    raw.parse()
        .map_err(|_| rh_core::Error::not_found("movie", raw))
}

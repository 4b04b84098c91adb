//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, the OpenAPI document and optional static file serving for the
//! browser client.

use axum::http::{header, HeaderValue};
use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use rh_core::config::CorsConfig;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::movies::list_movies,
        routes::movies::get_movie,
        routes::movies::create_movie,
        routes::movies::update_movie,
        routes::movies::delete_movie,
        routes::movies::list_genres,
        routes::movies::list_years,
        routes::stream::stream_movie,
    ),
    components(schemas(
        routes::movies::MovieResponse,
        routes::movies::CreateMovieRequest,
        routes::movies::UpdateMovieRequest,
        routes::movies::DeleteResponse,
    ))
)]
pub struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) if !o.trim().is_empty() => Some(v),
            _ => {
                tracing::warn!("Ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            header::CONTENT_RANGE,
            header::CONTENT_LENGTH,
            header::ACCEPT_RANGES,
        ])
}

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = cors_layer(&ctx.config.cors);
    let static_dir = ctx.config.server.static_dir.clone();

    let api = Router::new()
        // Movies
        .route(
            "/movies",
            get(routes::movies::list_movies).post(routes::movies::create_movie),
        )
        .route(
            "/movies/{id}",
            get(routes::movies::get_movie)
                .put(routes::movies::update_movie)
                .delete(routes::movies::delete_movie),
        )
        .route("/genres", get(routes::movies::list_genres))
        .route("/years", get(routes::movies::list_years))
        // Streaming
        .route("/stream/{id}", get(routes::stream::stream_movie));

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api", api)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Static file serving for the browser client build.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(tower_http::services::ServeFile::new(index_path)),
            );
        }
    }

    app
}

//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config
//! and full [`AppContext`]. The [`TestHarness::with_server`] constructor
//! starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use rh_core::config::Config;
use rh_core::MovieId;
use rh_db::models::NewMovie;
use rh_db::pool::{init_memory_pool, DbPool};
use rh_server::context::AppContext;
use rh_server::router::build_router;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), Config::default());
        Self { ctx, db }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let addr = serve(harness.ctx.clone()).await;
        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> rh_db::pool::PooledConnection {
        rh_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Catalogue `path` under `title` and return the new movie's ID.
    pub fn add_movie(&self, title: &str, path: &Path) -> MovieId {
        let movie = rh_db::queries::movies::create_movie(
            &self.conn(),
            &NewMovie {
                title: title.into(),
                file_path: path.to_string_lossy().into_owned(),
                ..Default::default()
            },
        )
        .expect("failed to create movie");
        movie.id
    }
}

/// Serve `ctx` on a random local port.
pub async fn serve(ctx: AppContext) -> SocketAddr {
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind random port");
    let addr = listener.local_addr().expect("failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}

/// Deterministic, position-dependent file contents.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Write a video fixture of `len` bytes into `dir`.
pub fn write_video(dir: &Path, name: &str, len: usize) -> (std::path::PathBuf, Vec<u8>) {
    let path = dir.join(name);
    let data = pattern(len);
    std::fs::write(&path, &data).expect("failed to write fixture");
    (path, data)
}

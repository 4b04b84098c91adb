//! Catalog Store seam: resolves a movie ID to the file behind it.

use std::path::PathBuf;

use async_trait::async_trait;
use rh_core::{Error, MovieId, Result};
use rh_db::pool::DbPool;

/// Where a movie's bytes live, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocation {
    pub path: PathBuf,
    /// Length of the file at resolution time.
    pub size_bytes: u64,
}

/// Read-only lookup from movie ID to file location.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Resolve `id`.
    ///
    /// Returns [`Error::NotFound`] if the catalog has no such movie and
    /// [`Error::FileUnavailable`] if it does but the file cannot be read.
    async fn resolve(&self, id: MovieId) -> Result<ResourceLocation>;
}

/// [`CatalogStore`] backed by the SQLite `movies` table.
///
/// The size comes from the file system, not the stored `file_size`, so it
/// reflects the file as it is right now.
pub struct DbCatalog {
    db: DbPool,
}

impl DbCatalog {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for DbCatalog {
    async fn resolve(&self, id: MovieId) -> Result<ResourceLocation> {
        let db = self.db.clone();
        let movie = tokio::task::spawn_blocking(move || {
            let conn = rh_db::pool::get_conn(&db)?;
            rh_db::queries::movies::get_movie(&conn, id)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))??
        .ok_or_else(|| Error::not_found("movie", id))?;

        let path = PathBuf::from(&movie.file_path);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(ResourceLocation {
                path,
                size_bytes: meta.len(),
            }),
            Ok(_) => Err(Error::file_unavailable(path)),
            Err(e) => {
                tracing::debug!(movie_id = %id, path = %path.display(), error = %e, "Stat failed");
                Err(Error::file_unavailable(path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rh_db::models::NewMovie;
    use rh_db::pool::init_memory_pool;

    fn catalog_with(file_path: &str) -> (DbCatalog, MovieId) {
        let db = init_memory_pool().unwrap();
        let conn = db.get().unwrap();
        let movie = rh_db::queries::movies::create_movie(
            &conn,
            &NewMovie {
                title: "Catalogued".into(),
                file_path: file_path.into(),
                file_size: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        (DbCatalog::new(db.clone()), movie.id)
    }

    #[tokio::test]
    async fn resolves_live_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie.mp4");
        std::fs::write(&path, vec![0u8; 1234]).unwrap();
        let (catalog, id) = catalog_with(path.to_str().unwrap());

        let location = catalog.resolve(id).await.unwrap();

        assert_eq!(location.path, path);
        assert_eq!(location.size_bytes, 1234);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (catalog, _) = catalog_with("/media/whatever.mp4");

        let err = catalog.resolve(MovieId::new()).await.unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn deleted_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.mp4");
        let (catalog, id) = catalog_with(path.to_str().unwrap());

        let err = catalog.resolve(id).await.unwrap_err();

        assert!(matches!(err, Error::FileUnavailable { .. }));
    }

    #[tokio::test]
    async fn directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, id) = catalog_with(dir.path().to_str().unwrap());

        let err = catalog.resolve(id).await.unwrap_err();

        assert!(matches!(err, Error::FileUnavailable { .. }));
    }
}

//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temp-dir-backed database and
//! upload directory plus a full [`AppContext`]. The [`with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kerb_core::config::Config;
use kerb_db::pool::{init_pool, DbPool, PooledConnection};
use kerb_server::context::AppContext;
use kerb_server::router::build_router;
use kerb_server::storage::BannerStorage;
use tempfile::TempDir;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// temporary data directory (database file + upload directory).
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    data_dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration. The database path
    /// and upload directory are always redirected into a fresh temp dir.
    pub fn with_config(mut config: Config) -> Self {
        let data_dir = tempfile::tempdir().expect("failed to create temp dir");

        let upload_dir = data_dir.path().join("uploads");
        config.uploads.dir = Some(upload_dir.clone());
        config.server.db_path = data_dir.path().join("kerbside.db");

        let db_str = config.server.db_path.to_string_lossy().to_string();
        let db = init_pool(&db_str).expect("failed to create db pool");

        let storage = BannerStorage::new(upload_dir);
        storage.ensure_dir().expect("failed to create upload dir");

        let ctx = AppContext {
            db: db.clone(),
            config: Arc::new(config),
            storage: Arc::new(storage),
        };

        Self { ctx, db, data_dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        kerb_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Path a stored file name resolves to inside the upload directory.
    pub fn upload_path(&self, file_name: &str) -> PathBuf {
        self.ctx.storage.path_for(file_name)
    }

    /// Number of files currently in the upload directory.
    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.ctx.storage.dir())
            .expect("failed to read upload dir")
            .count()
    }

    /// Root of the temporary data directory (parent of the upload dir).
    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }
}

//! Shared application context.
//!
//! [`AppContext`] is the central struct shared across all route handlers via
//! Axum state. It wraps immutable infrastructure (DB pool, config, storage)
//! in `Arc`s so it is cheap to clone per request.

use std::sync::Arc;

use kerb_core::config::Config;
use kerb_db::pool::DbPool;

use crate::storage::BannerStorage;

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s and a pool handle.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Upload directory storage backend.
    pub storage: Arc<BannerStorage>,
}

//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, and static serving of the upload directory.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::banners::upload_banners,
        routes::banners::list_banners,
        routes::banners::delete_banner,
    ),
    components(schemas(
        routes::banners::BannerCollectionResponse,
        routes::banners::DeleteResponse,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // A full batch of maximal files plus multipart framing overhead.
    let uploads = &ctx.config.uploads;
    let body_limit = uploads.max_file_bytes as usize * uploads.max_files_per_upload.max(1)
        + 1024 * 1024;

    Router::new()
        .route("/", get(routes::health::api_root))
        .route("/health", get(routes::health::health_check))
        .route(
            "/carsbanner/",
            post(routes::banners::upload_banners).get(routes::banners::list_banners),
        )
        .route(
            "/carsbanner/{file_name}",
            delete(routes::banners::delete_banner),
        )
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(ctx.storage.dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

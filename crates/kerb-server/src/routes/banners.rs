//! Banner gallery route handlers.
//!
//! The gallery is a single shared collection of image URLs backed by one
//! database record and the upload directory. Uploads are validated as a
//! batch before any byte hits the disk: an invalid file rejects the whole
//! request and leaves both the record and the directory untouched.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::Serialize;

use kerb_core::config::Config;
use kerb_db::models::BannerCollection;
use kerb_db::queries::banners;

use crate::context::AppContext;
use crate::error::AppError;
use crate::storage::safe_file_name;

/// Multipart form field carrying the uploaded images.
const UPLOAD_FIELD: &str = "images";

/// File extensions accepted for banner uploads (matched case-insensitively).
const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Public path prefix under which stored files are served.
const UPLOADS_PREFIX: &str = "/uploads";

/// Banner collection response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BannerCollectionResponse {
    pub id: String,
    pub images: Vec<String>,
}

impl BannerCollectionResponse {
    fn from_model(collection: &BannerCollection) -> Self {
        Self {
            id: collection.id.to_string(),
            images: collection.images.clone(),
        }
    }
}

/// Deletion confirmation response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

/// An uploaded file that passed validation and is awaiting storage.
struct PendingUpload {
    extension: String,
    data: axum::body::Bytes,
}

/// Return the lowercased extension of `file_name` when it is in the allowed
/// image set.
fn image_extension(file_name: &str) -> Option<String> {
    let ext = std::path::Path::new(file_name)
        .extension()?
        .to_str()?
        .to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// The externally visible base address used to build image URLs.
///
/// Prefers the configured `public_base_url`; otherwise falls back to the
/// request's `Host` header, the same address the caller reached us at.
fn public_base(config: &Config, headers: &HeaderMap) -> String {
    if let Some(ref base) = config.uploads.public_base_url {
        if !base.is_empty() {
            return base.trim_end_matches('/').to_string();
        }
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn image_url(base: &str, file_name: &str) -> String {
    format!("{base}{UPLOADS_PREFIX}/{file_name}")
}

/// POST /carsbanner/
///
/// Accepts a multipart batch of 1-5 image files in the `images` field,
/// stores them, and appends their URLs to the shared collection.
#[utoipa::path(
    post,
    path = "/carsbanner/",
    request_body(content = Vec<u8>, content_type = "multipart/form-data",
        description = "1-5 image files in the `images` field"),
    responses(
        (status = 200, description = "Updated banner collection", body = BannerCollectionResponse),
        (status = 400, description = "No files, too many files, or a file failed validation")
    )
)]
pub async fn upload_banners(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<BannerCollectionResponse>, AppError> {
    let limits = &ctx.config.uploads;

    // Drain the multipart stream first; validation covers the whole batch.
    let mut pending = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| kerb_core::Error::Validation(format!("malformed multipart request: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| kerb_core::Error::Validation("uploaded file has no name".into()))?;

        let data = field.bytes().await.map_err(|e| {
            kerb_core::Error::Validation(format!("failed to read uploaded file: {e}"))
        })?;

        let extension = image_extension(&file_name).ok_or_else(|| {
            kerb_core::Error::Validation(format!(
                "'{file_name}' is not an allowed image type (jpg, jpeg, png, gif)"
            ))
        })?;

        if data.len() as u64 > limits.max_file_bytes {
            return Err(kerb_core::Error::Validation(format!(
                "'{file_name}' exceeds the maximum file size of {} bytes",
                limits.max_file_bytes
            ))
            .into());
        }

        pending.push(PendingUpload { extension, data });
    }

    if pending.is_empty() {
        return Err(kerb_core::Error::Validation("no files uploaded".into()).into());
    }
    if pending.len() > limits.max_files_per_upload {
        return Err(kerb_core::Error::Validation(format!(
            "at most {} files may be uploaded per request",
            limits.max_files_per_upload
        ))
        .into());
    }

    // The batch is valid; write the blobs to the upload directory.
    let mut stored = Vec::with_capacity(pending.len());
    for upload in &pending {
        match ctx.storage.save(&upload.extension, &upload.data).await {
            Ok(file_name) => stored.push(file_name),
            Err(e) => {
                rollback_files(&ctx, &stored).await;
                return Err(e.into());
            }
        }
    }

    let base = public_base(&ctx.config, &headers);
    let urls: Vec<String> = stored.iter().map(|name| image_url(&base, name)).collect();

    // Record the URLs; on failure, remove the just-written files so the
    // directory does not accumulate orphans.
    let mut conn = match kerb_db::pool::get_conn(&ctx.db) {
        Ok(conn) => conn,
        Err(e) => {
            rollback_files(&ctx, &stored).await;
            return Err(e.into());
        }
    };
    let collection = match banners::append_images(&mut conn, &urls) {
        Ok(collection) => collection,
        Err(e) => {
            rollback_files(&ctx, &stored).await;
            return Err(e.into());
        }
    };

    Ok(Json(BannerCollectionResponse::from_model(&collection)))
}

/// Best-effort removal of files written earlier in a failed request.
async fn rollback_files(ctx: &AppContext, file_names: &[String]) {
    for name in file_names {
        if let Err(e) = ctx.storage.delete(name).await {
            tracing::warn!("Failed to roll back uploaded file {name}: {e}");
        }
    }
}

/// GET /carsbanner/
///
/// Returns the stored image URLs in insertion order; an empty array when
/// the collection has not been created yet.
#[utoipa::path(
    get,
    path = "/carsbanner/",
    responses(
        (status = 200, description = "Image URLs in insertion order", body = Vec<String>)
    )
)]
pub async fn list_banners(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<String>>, AppError> {
    let conn = kerb_db::pool::get_conn(&ctx.db)?;
    let images = banners::get_collection(&conn)?
        .map(|collection| collection.images)
        .unwrap_or_default();

    Ok(Json(images))
}

/// DELETE /carsbanner/{file_name}
///
/// Removes the matching URL from the collection, then unlinks the backing
/// file. The database mutation is authoritative; a failed unlink is logged
/// and the request still succeeds.
#[utoipa::path(
    delete,
    path = "/carsbanner/{file_name}",
    params(("file_name" = String, Path, description = "Trailing file-name segment of a listed URL")),
    responses(
        (status = 200, description = "Entry removed", body = DeleteResponse),
        (status = 400, description = "Identifier contains path segments"),
        (status = 404, description = "No banner collection exists")
    )
)]
pub async fn delete_banner(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(file_name): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let Some(name) = safe_file_name(&file_name) else {
        return Err(
            kerb_core::Error::Validation(format!("invalid file name: {file_name}")).into(),
        );
    };

    let base = public_base(&ctx.config, &headers);
    let url = image_url(&base, name);

    let mut conn = kerb_db::pool::get_conn(&ctx.db)?;
    if banners::remove_image(&mut conn, &url)?.is_none() {
        return Err(
            kerb_core::Error::not_found("banner collection", banners::SINGLETON_KEY).into(),
        );
    }

    // Best-effort: the record no longer references the file, so a failed
    // unlink (e.g. already missing) only leaves a stray blob behind.
    if let Err(e) = ctx.storage.delete(name).await {
        tracing::warn!("Failed to delete banner file {name}: {e}");
    }

    Ok(Json(DeleteResponse {
        message: "Image deleted successfully".into(),
    }))
}

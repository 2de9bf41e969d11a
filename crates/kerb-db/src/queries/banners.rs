//! Banner collection queries.
//!
//! The banner collection is a singleton: one row keyed by [`SINGLETON_KEY`]
//! holds the full ordered list of image URLs as JSON text. All mutations go
//! through a transaction so concurrent read-modify-write cycles serialize
//! instead of losing updates.
//!
//! The database is authoritative for `images` membership; the files on disk
//! are a best-effort mirror maintained by the caller.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use kerb_core::{BannerCollectionId, Error, Result};
use uuid::Uuid;

use crate::models::BannerCollection;

/// Well-known key of the single banner collection row.
pub const SINGLETON_KEY: &str = "default";

/// Parse a banner collection from a database row.
///
/// Expects columns in order: id, images, created_at, updated_at.
fn parse_banner_row(row: &rusqlite::Row) -> rusqlite::Result<BannerCollection> {
    let id: String = row.get(0)?;
    let images_json: String = row.get(1)?;

    Ok(BannerCollection {
        id: BannerCollectionId::from(Uuid::parse_str(&id).unwrap_or_default()),
        images: serde_json::from_str(&images_json).unwrap_or_default(),
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn select_collection(conn: &Connection) -> Result<Option<BannerCollection>> {
    conn.query_row(
        "SELECT id, images, created_at, updated_at
         FROM banner_collections WHERE key = :key",
        rusqlite::named_params! { ":key": SINGLETON_KEY },
        parse_banner_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Get the singleton banner collection, if it has been created.
pub fn get_collection(conn: &Connection) -> Result<Option<BannerCollection>> {
    select_collection(conn)
}

/// Append URLs to the singleton collection, creating it on first use.
///
/// The read-modify-write happens inside one immediate transaction, so two
/// concurrent appends cannot overwrite each other's additions. Order of the
/// appended URLs is preserved and duplicates are not removed.
pub fn append_images(conn: &mut Connection, urls: &[String]) -> Result<BannerCollection> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| Error::database(e.to_string()))?;

    let now = Utc::now().to_rfc3339();
    let updated = match select_collection(&tx)? {
        Some(mut collection) => {
            collection.images.extend(urls.iter().cloned());
            collection.updated_at = now;

            let images_json = serde_json::to_string(&collection.images)
                .map_err(|e| Error::database(e.to_string()))?;
            tx.execute(
                "UPDATE banner_collections
                 SET images = :images, updated_at = :updated_at
                 WHERE key = :key",
                rusqlite::named_params! {
                    ":images": images_json,
                    ":updated_at": &collection.updated_at,
                    ":key": SINGLETON_KEY,
                },
            )
            .map_err(|e| Error::database(e.to_string()))?;

            collection
        }
        None => {
            let collection = BannerCollection {
                id: BannerCollectionId::new(),
                images: urls.to_vec(),
                created_at: now.clone(),
                updated_at: now,
            };

            let images_json = serde_json::to_string(&collection.images)
                .map_err(|e| Error::database(e.to_string()))?;
            tx.execute(
                "INSERT INTO banner_collections (key, id, images, created_at, updated_at)
                 VALUES (:key, :id, :images, :created_at, :updated_at)",
                rusqlite::named_params! {
                    ":key": SINGLETON_KEY,
                    ":id": collection.id.to_string(),
                    ":images": images_json,
                    ":created_at": &collection.created_at,
                    ":updated_at": &collection.updated_at,
                },
            )
            .map_err(|e| Error::database(e.to_string()))?;

            collection
        }
    };

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(updated)
}

/// Remove every entry equal to `url` from the singleton collection.
///
/// Returns `Ok(None)` when no collection exists. A URL that matches no
/// entry leaves the collection unchanged and is not an error.
pub fn remove_image(conn: &mut Connection, url: &str) -> Result<Option<BannerCollection>> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| Error::database(e.to_string()))?;

    let Some(mut collection) = select_collection(&tx)? else {
        return Ok(None);
    };

    collection.images.retain(|img| img != url);
    collection.updated_at = Utc::now().to_rfc3339();

    let images_json = serde_json::to_string(&collection.images)
        .map_err(|e| Error::database(e.to_string()))?;
    tx.execute(
        "UPDATE banner_collections
         SET images = :images, updated_at = :updated_at
         WHERE key = :key",
        rusqlite::named_params! {
            ":images": images_json,
            ":updated_at": &collection.updated_at,
            ":key": SINGLETON_KEY,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(Some(collection))
}

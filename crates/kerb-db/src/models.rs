//! Typed models mirroring the database schema.

use kerb_core::BannerCollectionId;

/// The singleton record holding the ordered list of banner image URLs.
///
/// The database row is keyed by the well-known singleton key; the `id` is
/// the opaque identifier assigned when the record was first created.
#[derive(Debug, Clone, PartialEq)]
pub struct BannerCollection {
    pub id: BannerCollectionId,
    /// Fully-qualified image URLs in insertion order; duplicates are kept.
    pub images: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

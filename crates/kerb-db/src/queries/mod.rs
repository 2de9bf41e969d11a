//! Query modules for database entities.

pub mod banners;

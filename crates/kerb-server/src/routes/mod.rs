//! Route handlers for the HTTP API.

pub mod banners;
pub mod health;

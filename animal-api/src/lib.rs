//! Animal image metadata API.
//!
//! Serves name/id/translation/url records for images in a static
//! catalog, with versioned routing and a TTL response cache.

pub mod config;
pub mod logging;
pub mod module;
pub mod service;

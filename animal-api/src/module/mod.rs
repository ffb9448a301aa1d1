//! Core lookup domain.
//!
//! ## Main Components
//! - `catalog`: immutable animal -> image id table loaded at startup
//! - `i18n`: localized species names with fallback semantics
//! - `lookup`: query resolution (validation, random pick, URL building)
//! - `cache`: TTL memoization of full HTTP responses

pub mod cache;
pub mod catalog;
pub mod i18n;
pub mod lookup;

//! Foundation types for cidgraph.
//!
//! This crate provides the content-reference and link-pointer vocabulary used
//! throughout the cidgraph system. Every other cidgraph crate depends on it.
//!
//! # Key Types
//!
//! - [`ContentRef`] — Validated textual content identifier (CID)
//! - [`link_target`] / [`link_reference`] — Link-pointer detection over JSON values
//! - [`RefError`] — Reference validation errors

pub mod error;
pub mod link;
pub mod reference;

pub use error::RefError;
pub use link::{cycle_marker, link_reference, link_target, path_link, LINK_KEY, PATH_KEY};
pub use reference::ContentRef;

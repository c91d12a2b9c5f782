//! Content-address resolution for cidgraph.
//!
//! Turns a [`ContentRef`](cidgraph_types::ContentRef) into decoded JSON by
//! fetching from a remote gateway, with transparent retry and an in-memory
//! cache. The transport sits behind the [`ContentFetcher`] trait so callers
//! can substitute an in-memory store for tests and embedding.
//!
//! # Key Types
//!
//! - [`Resolver`] — Caching, retrying front-end over any fetcher
//! - [`ContentFetcher`] — Transport seam (`HttpGateway`, `MemoryFetcher`)
//! - [`RetryPolicy`] — Explicit backoff configuration

pub mod error;
pub mod fetcher;
pub mod memory;
pub mod resolver;
pub mod retry;

pub use error::{ResolveError, ResolveResult};
pub use fetcher::{ContentFetcher, FetchError, HttpGateway};
pub use memory::MemoryFetcher;
pub use resolver::{Resolver, ResolverConfig};
pub use retry::{Backoff, RetryPolicy};

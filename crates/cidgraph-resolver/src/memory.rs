use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use cidgraph_types::ContentRef;

use crate::fetcher::{ContentFetcher, FetchError};

/// In-memory, HashMap-based content fetcher.
///
/// Intended for tests and embedding. Objects are held behind an `RwLock`;
/// a counter records every fetch so tests can assert on "network" traffic.
/// Missing references yield `FetchError::Status(404)`, matching a gateway
/// that does not hold the block.
#[derive(Default)]
pub struct MemoryFetcher {
    objects: RwLock<HashMap<ContentRef, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    /// Create a new empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under their computed content reference.
    pub fn insert_bytes(&self, data: Vec<u8>) -> ContentRef {
        let reference = ContentRef::for_bytes(&data);
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(reference.clone(), data);
        reference
    }

    /// Store a JSON value under its computed content reference.
    pub fn insert_json(&self, value: &Value) -> ContentRef {
        let data = serde_json::to_vec(value).expect("JSON value is always serializable");
        self.insert_bytes(data)
    }

    /// Store bytes under an explicit reference (for wiring up cyclic graphs,
    /// where a node must know its own address before it can be encoded).
    pub fn insert_at(&self, reference: ContentRef, data: Vec<u8>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(reference, data);
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the fetcher holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }
}

#[async_trait]
impl ContentFetcher for MemoryFetcher {
    async fn fetch(&self, reference: &ContentRef) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let map = self.objects.read().expect("lock poisoned");
        map.get(reference)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

impl std::fmt::Debug for MemoryFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFetcher")
            .field("object_count", &self.len())
            .field("fetches", &self.fetch_count())
            .finish()
    }
}

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use cidgraph_types::ContentRef;

use crate::error::{ResolveError, ResolveResult};
use crate::fetcher::{ContentFetcher, FetchError};
use crate::retry::RetryPolicy;

/// Retry configuration for the two retryable failure classes.
///
/// Rate limiting (HTTP 429) backs off exponentially from a generous base;
/// transient network failures retry sooner with linear growth. Any other
/// non-success status fails immediately.
#[derive(Clone, Copy, Debug)]
pub struct ResolverConfig {
    pub rate_limit: RetryPolicy,
    pub network: RetryPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rate_limit: RetryPolicy::exponential(3, Duration::from_millis(5000)),
            network: RetryPolicy::linear(3, Duration::from_millis(1000)),
        }
    }
}

/// Caching, retrying resolver over a [`ContentFetcher`].
///
/// Fetched objects are cached by reference for the lifetime of the resolver
/// (content addressing makes entries immutable), so repeated resolution of a
/// shared subgraph costs one network call per distinct reference.
///
/// The cache is behind an `RwLock` and never held across an await, but
/// population is not single-flight: two tasks resolving the same uncached
/// reference concurrently will both hit the network. Callers that need
/// stronger guarantees must serialize resolution of a given reference.
pub struct Resolver {
    fetcher: Box<dyn ContentFetcher>,
    cache: RwLock<HashMap<ContentRef, Value>>,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(fetcher: impl ContentFetcher + 'static) -> Self {
        Self::with_config(fetcher, ResolverConfig::default())
    }

    pub fn with_config(fetcher: impl ContentFetcher + 'static, config: ResolverConfig) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            cache: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Returns `true` if `s` is a valid content reference. Never panics.
    pub fn validate(s: &str) -> bool {
        ContentRef::is_valid(s)
    }

    /// Fetch and decode the object behind `reference`.
    ///
    /// Cache hits return without touching the network. Misses fetch with
    /// retry: 429 under the exponential rate-limit policy, network-level
    /// failures under the linear policy, any other status immediately fatal.
    /// Exhausting retries surfaces the last error.
    pub async fn fetch(&self, reference: &ContentRef) -> ResolveResult<Value> {
        if let Some(cached) = self
            .cache
            .read()
            .expect("lock poisoned")
            .get(reference)
        {
            debug!(reference = reference.short(), "cache hit");
            return Ok(cached.clone());
        }

        let bytes = self.fetch_with_retry(reference).await?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| ResolveError::Decode {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;

        self.cache
            .write()
            .expect("lock poisoned")
            .insert(reference.clone(), value.clone());
        Ok(value)
    }

    async fn fetch_with_retry(&self, reference: &ContentRef) -> ResolveResult<Vec<u8>> {
        let mut attempt = 0u32;
        loop {
            match self.fetcher.fetch(reference).await {
                Ok(bytes) => return Ok(bytes),
                Err(FetchError::RateLimited) => {
                    if attempt >= self.config.rate_limit.max_retries {
                        return Err(ResolveError::RateLimited {
                            reference: reference.to_string(),
                            attempts: attempt + 1,
                        });
                    }
                    let delay = self.config.rate_limit.delay(attempt);
                    warn!(
                        reference = reference.short(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(FetchError::Network(message)) => {
                    if attempt >= self.config.network.max_retries {
                        return Err(ResolveError::Network {
                            reference: reference.to_string(),
                            message,
                        });
                    }
                    let delay = self.config.network.delay(attempt);
                    warn!(
                        reference = reference.short(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %message,
                        "network failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(FetchError::Status(status)) => {
                    return Err(ResolveError::Status {
                        reference: reference.to_string(),
                        status,
                    });
                }
            }
            attempt += 1;
        }
    }

    /// Drop all cached entries. Used between independent batches to bound
    /// memory.
    pub fn clear_cache(&self) {
        self.cache.write().expect("lock poisoned").clear();
    }

    /// Number of cached objects.
    pub fn cache_len(&self) -> usize {
        self.cache.read().expect("lock poisoned").len()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("cached", &self.cache_len())
            .field("config", &self.config)
            .finish()
    }
}

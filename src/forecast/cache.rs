use super::types::CachedResponse;
use async_trait::async_trait;
use moka::{future::Cache, Expiry};
use std::time::{Duration, Instant};

/// Response store keyed by upstream URL. Implementations synchronize
/// internally; the handler never locks.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<CachedResponse>;

    async fn put(&self, key: String, value: CachedResponse, ttl: Duration) -> anyhow::Result<()>;
}

#[derive(Clone)]
struct Entry {
    response: CachedResponse,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    // Overwrites restart the clock with the new entry's TTL.
    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process bounded cache with per-entry TTL.
pub struct MokaResponseCache {
    store: Cache<String, Entry>,
}

impl MokaResponseCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            store: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

#[async_trait]
impl ResponseCache for MokaResponseCache {
    async fn get(&self, key: &str) -> Option<CachedResponse> {
        self.store.get(key).await.map(|entry| entry.response)
    }

    async fn put(&self, key: String, value: CachedResponse, ttl: Duration) -> anyhow::Result<()> {
        self.store.insert(key, Entry { response: value, ttl }).await;
        Ok(())
    }
}

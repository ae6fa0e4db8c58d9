pub mod cache;
pub mod types;
pub mod weatherapi;

use cache::MokaResponseCache;

pub fn init_cache(max_capacity: u64) -> MokaResponseCache {
    MokaResponseCache::new(max_capacity)
}

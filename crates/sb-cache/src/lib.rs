//! sb-cache
//!
//! [`CacheGateway`](sb_reconcile::CacheGateway) implementations.
//!
//! - [`RedisCache`]: production store. Connection failures at startup are
//!   fatal; failures afterwards surface as per-call errors the engine degrades.
//! - [`MemoryCache`]: in-process store with an injectable [`Clock`], used for
//!   dry runs and for exercising TTL expiry deterministically.

mod clock;
mod memory;
mod redis_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::MemoryCache;
pub use redis_store::RedisCache;

use std::time::Duration;

use anyhow::{Context, Result};
use redis::Commands;
use sb_reconcile::{CacheGateway, CacheReadError, CacheWriteError};
use tracing::debug;

/// Redis-backed cache. Values are stored with `SET key value EX ttl`.
pub struct RedisCache {
    conn: redis::Connection,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL may carry a password; never print it.
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Open a connection and prove it with `PING`.
    ///
    /// `timeout` bounds the connect and every later command.
    ///
    /// Any failure here is a startup failure: the caller should abort the pass.
    pub fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url).context("CACHE_UNAVAILABLE: invalid redis url")?;
        let mut conn = client
            .get_connection_with_timeout(timeout)
            .context("CACHE_UNAVAILABLE: can't connect to redis")?;
        conn.set_read_timeout(Some(timeout))
            .context("CACHE_UNAVAILABLE: can't set redis read timeout")?;
        conn.set_write_timeout(Some(timeout))
            .context("CACHE_UNAVAILABLE: can't set redis write timeout")?;
        let pong: String = redis::cmd("PING")
            .query(&mut conn)
            .context("CACHE_UNAVAILABLE: redis PING failed")?;
        debug!(reply = %pong, "redis connection established");
        Ok(Self { conn })
    }
}

impl CacheGateway for RedisCache {
    fn get(&mut self, key: &str) -> Result<Option<String>, CacheReadError> {
        self.conn
            .get::<_, Option<String>>(key)
            .map_err(|e| CacheReadError(e.to_string()))
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheWriteError> {
        // EX 0 is rejected by redis; sub-second TTLs round up.
        let secs = ttl.as_secs().max(1);
        self.conn
            .set_ex::<_, _, ()>(key, value, secs)
            .map_err(|e| CacheWriteError(e.to_string()))
    }
}

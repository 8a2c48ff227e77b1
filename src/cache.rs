use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct Entry<T> {
    value: Arc<T>,
    expires_at: Instant,
}

/// Holds one value for `ttl`, then rebuilds it on the next access.
///
/// The slot lock is held while the value is being built, so callers that
/// arrive during a miss wait for that build instead of starting their own.
/// A failed build leaves the slot empty and the next caller tries again.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            if Instant::now() < entry.expires_at {
                debug!("cache hit");
                return Ok(Arc::clone(&entry.value));
            }
            debug!("cache entry expired");
        }

        *slot = None;
        let value = Arc::new(init().await?);
        *slot = Some(Entry {
            value: Arc::clone(&value),
            expires_at: Instant::now() + self.ttl,
        });
        Ok(value)
    }
}

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinSet;

use crate::error::Result;

/// Runs futures concurrently and hands their results back in spawn order.
///
/// `wait` stops at the first failure; dropping the manager then aborts every
/// task still running.
pub struct TaskManager<R: Send + 'static> {
    tasks: JoinSet<(usize, Result<R>)>,
    spawned: usize,
}

impl<R: Send + 'static> TaskManager<R> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            spawned: 0,
        }
    }

    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = Result<R>> + Send + 'static,
    {
        let index = self.spawned;
        self.spawned += 1;
        self.tasks.spawn(async move { (index, future.await) });
    }

    pub async fn wait(mut self) -> Result<Vec<R>> {
        let mut results: Vec<Option<R>> = (0..self.spawned).map(|_| None).collect();
        while let Some(joined) = self.tasks.join_next().await {
            let (index, result) = joined?;
            results[index] = Some(result?);
        }
        Ok(results.into_iter().flatten().collect())
    }
}

impl<R: Send + 'static> Default for TaskManager<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// One async lock per chapter, so concurrent runs in this process do not
/// download the same chapter twice.
#[derive(Default)]
pub struct ChapterLocks {
    locks: Mutex<HashMap<u32, Arc<AsyncMutex<()>>>>,
}

impl ChapterLocks {
    pub async fn lock(&self, chapter: u32) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(chapter)
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}

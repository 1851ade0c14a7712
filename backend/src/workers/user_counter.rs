//! Periodic user counter
//!
//! Counts stored users on a fixed period, logs the figure and publishes it as
//! the `users_total` gauge. Runs on its own task; the only link to the rest of
//! the service is the shared store handle.

use crate::repositories::{StoreError, UserStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Handle to a running counter task
pub struct UserCounterHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl UserCounterHandle {
    /// Signal the task to stop and wait for it to finish
    pub async fn shutdown(self) {
        // Err only means the task already exited
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "User counter task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Count users once and publish the result
pub async fn count_users_once(store: &dyn UserStore) -> Result<u64, StoreError> {
    let count = store.count().await?;
    metrics::gauge!("users_total").set(count as f64);
    info!(count, "Current number of users");
    Ok(count)
}

/// Spawn the counter; the first count happens one `period` after start
pub fn spawn_user_counter(store: Arc<dyn UserStore>, period: Duration) -> UserCounterHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_secs = period.as_secs_f64(), "User counter started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = count_users_once(store.as_ref()).await {
                        warn!(error = %e, "Failed to count users");
                    }
                }
                changed = shutdown_rx.changed() => {
                    // A dropped sender also ends the loop
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("User counter stopped");
    });

    UserCounterHandle { shutdown, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemoryUserStore, NewUser, UserChanges, UserRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Store that only counts how often `count` was called
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl UserStore for CountingStore {
        async fn find_by_email(&self, _: &str) -> Result<Option<UserRecord>, StoreError> {
            Ok(None)
        }
        async fn find_by_id(&self, _: Uuid) -> Result<Option<UserRecord>, StoreError> {
            Ok(None)
        }
        async fn insert(&self, _: NewUser) -> Result<UserRecord, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("read-only")))
        }
        async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
            Ok(Vec::new())
        }
        async fn update(
            &self,
            _: Uuid,
            _: UserChanges,
        ) -> Result<Option<UserRecord>, StoreError> {
            Ok(None)
        }
        async fn delete(&self, _: Uuid) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn count(&self) -> Result<u64, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Timeout(Duration::from_secs(5)));
            }
            Ok(3)
        }
    }

    #[tokio::test]
    async fn test_count_users_once() {
        let store = InMemoryUserStore::new();
        assert_eq!(count_users_once(&store).await.unwrap(), 0);

        store
            .insert(NewUser {
                name: "Alice".to_string(),
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(count_users_once(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_counter_ticks_and_stops() {
        let store = Arc::new(CountingStore::default());
        let handle = spawn_user_counter(store.clone(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(110)).await;
        handle.shutdown().await;

        let calls = store.calls.load(Ordering::SeqCst);
        assert!(calls >= 2, "expected several counts, got {calls}");

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn test_first_count_waits_one_period() {
        let store = Arc::new(CountingStore::default());
        let handle = spawn_user_counter(store.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_counter_survives_store_failures() {
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let handle = spawn_user_counter(store.clone(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(110)).await;
        assert!(!handle.is_finished());
        handle.shutdown().await;

        assert!(store.calls.load(Ordering::SeqCst) >= 2);
    }
}

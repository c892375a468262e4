//! The library repository: local cache of tracked series plus remote push.
//!
//! The snapshot is owned here and mutated only through this repository; the
//! UI and the workflow controller observe it through subscriptions.

use crate::api::LibraryApi;
use crate::events::{Publisher, Subscription};
use crate::models::SeriesModel;
use crate::store::SeriesStore;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// The user's tracked-series library
pub struct Library {
    store: Mutex<SeriesStore>,
    api: Arc<dyn LibraryApi>,
    publisher: Publisher<Vec<SeriesModel>>,
}

impl Library {
    pub fn new(store: SeriesStore, api: Arc<dyn LibraryApi>) -> Self {
        Self {
            store: Mutex::new(store),
            api,
            publisher: Publisher::new(),
        }
    }

    /// Observe the library: the callback receives the current snapshot
    /// immediately, then the full snapshot again after every local mutation.
    pub fn observe_library(
        &self,
        callback: impl Fn(&Vec<SeriesModel>) + Send + 'static,
    ) -> Result<Subscription> {
        let snapshot = self.snapshot()?;
        callback(&snapshot);
        Ok(self.publisher.subscribe(callback))
    }

    /// Push a new series to the remote service.
    ///
    /// No local mutation happens here; callers merge the confirmed model via
    /// [`Library::insert_into_local_library`] on success.
    pub async fn send_new_to_api(&self, series: &SeriesModel) -> Result<SeriesModel> {
        debug!(id = series.id, title = %series.title, "Pushing series to remote service");
        self.api.send_new_to_api(series).await
    }

    /// Merge a series into the local cache and notify observers
    pub fn insert_into_local_library(&self, series: &SeriesModel) -> Result<()> {
        {
            let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
            store.upsert(series)?;
        }

        let snapshot = self.snapshot()?;
        info!(
            id = series.id,
            library_size = snapshot.len(),
            "Series inserted into local library"
        );
        self.publisher.publish(&snapshot);
        Ok(())
    }

    /// Current ordered snapshot of the library
    pub fn snapshot(&self) -> Result<Vec<SeriesModel>> {
        self.store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .all()
    }

    /// Whether a series id is currently tracked
    pub fn contains(&self, id: i64) -> Result<bool> {
        self.store
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::SeriesType;
    use anyhow::anyhow;
    use futures::future::BoxFuture;

    /// Fake remote service: succeeds (echoing an amended title) or fails.
    struct FakeLibraryApi {
        fail: bool,
    }

    impl LibraryApi for FakeLibraryApi {
        fn send_new_to_api(&self, series: &SeriesModel) -> BoxFuture<'static, Result<SeriesModel>> {
            let fail = self.fail;
            let mut confirmed = series.clone();
            confirmed.title = format!("{} (confirmed)", confirmed.title);
            Box::pin(async move {
                if fail {
                    Err(anyhow!("service unavailable"))
                } else {
                    Ok(confirmed)
                }
            })
        }
    }

    fn library(fail: bool) -> Library {
        let store = SeriesStore::new(Database::open_in_memory().unwrap());
        Library::new(store, Arc::new(FakeLibraryApi { fail }))
    }

    #[test]
    fn test_observe_delivers_snapshot_immediately() -> Result<()> {
        let library = library(false);
        library.insert_into_local_library(&SeriesModel::new(1, SeriesType::Anime, "FLCL"))?;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscription = {
            let seen = Arc::clone(&seen);
            library.observe_library(move |snapshot| {
                seen.lock().unwrap().push(snapshot.len());
            })?
        };

        library.insert_into_local_library(&SeriesModel::new(2, SeriesType::Manga, "Berserk"))?;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        drop(subscription);
        Ok(())
    }

    #[test]
    fn test_insert_is_upsert_by_id() -> Result<()> {
        let library = library(false);

        library.insert_into_local_library(&SeriesModel::new(5, SeriesType::Anime, "Gintama"))?;
        library.insert_into_local_library(&SeriesModel::new(5, SeriesType::Anime, "Gintama'"))?;

        let snapshot = library.snapshot()?;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "Gintama'");
        Ok(())
    }

    #[tokio::test]
    async fn test_send_new_returns_confirmed_model_without_local_mutation() -> Result<()> {
        let library = library(false);
        let series = SeriesModel::new(9, SeriesType::Anime, "Noir");

        let confirmed = library.send_new_to_api(&series).await?;
        assert_eq!(confirmed.title, "Noir (confirmed)");

        // Remote push alone must not touch the cache
        assert!(library.snapshot()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_send_new_failure_leaves_library_unchanged() -> Result<()> {
        let library = library(true);
        let series = SeriesModel::new(9, SeriesType::Anime, "Noir");

        assert!(library.send_new_to_api(&series).await.is_err());
        assert!(library.snapshot()?.is_empty());
        Ok(())
    }
}

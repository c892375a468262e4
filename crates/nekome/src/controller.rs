//! Search workflow controller.
//!
//! Orchestrates the search-and-add flow: validates input, dispatches a single
//! asynchronous attempt per action, flips the in-progress flag around exactly
//! one in-flight search, and classifies every outcome into success-with-items,
//! success-empty or failure. At most one search and one add are tracked at a
//! time; starting a new one cancels its predecessor, and dropping the
//! controller cancels both.

use crate::executor::{CancelToken, Dispatcher, TaskGuard};
use crate::strings::{self, MessageId};
use shared::api::SearchApi;
use shared::events::Subscription;
use shared::library::Library;
use shared::models::{SearchParams, SeriesModel, SeriesType};
use shared::Publisher;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

/// Controller for the search-and-add workflow
pub struct SearchController {
    search_api: Arc<dyn SearchApi>,
    library: Arc<Library>,
    background: Handle,
    dispatcher: Dispatcher,
    params: Arc<SearchParams>,
    search_results: Publisher<Vec<SeriesModel>>,
    search_task: Option<TaskGuard>,
    add_task: Option<TaskGuard>,
}

impl SearchController {
    pub fn new(
        search_api: Arc<dyn SearchApi>,
        library: Arc<Library>,
        background: Handle,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            search_api,
            library,
            background,
            dispatcher,
            params: Arc::new(SearchParams::new()),
            search_results: Publisher::new(),
            search_task: None,
            add_task: None,
        }
    }

    /// Search input shared with the UI
    pub fn params(&self) -> Arc<SearchParams> {
        Arc::clone(&self.params)
    }

    /// The library backing membership checks and add operations
    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    /// Observe published search results
    pub fn observe_results(
        &self,
        callback: impl Fn(&Vec<SeriesModel>) + Send + 'static,
    ) -> Subscription {
        self.search_results.subscribe(callback)
    }

    /// Dispatch a search for the current text.
    ///
    /// No-op for blank text or the `Unknown` sentinel. Otherwise a single
    /// attempt runs in the background; its completion, marshaled onto the
    /// dispatcher, resets the in-progress flag and either publishes the
    /// results or reports a message id through `on_error`. An empty result
    /// list is published *and* reported as "no items".
    pub fn search_for_series(
        &mut self,
        series_type: SeriesType,
        on_error: impl Fn(MessageId) + Send + 'static,
    ) {
        let text = self.params.text();
        if text.trim().is_empty() || series_type == SeriesType::Unknown {
            warn!("No text entered or series type was unknown");
            return;
        }

        // A new search supersedes any outstanding one
        if let Some(previous) = self.search_task.take() {
            previous.cancel();
        }

        self.params.set_searching(true);

        let token = CancelToken::new();
        let request = self.search_api.search_for_series_with(&text, series_type);
        let dispatcher = self.dispatcher.clone();
        let params = Arc::clone(&self.params);
        let results = self.search_results.clone();
        let completion_token = token.clone();

        let handle = self.background.spawn(async move {
            let outcome = request.await;
            dispatcher.post(move || {
                if completion_token.is_cancelled() {
                    return;
                }
                params.set_searching(false);
                match outcome {
                    Ok(items) => {
                        info!(count = items.len(), "Search completed");
                        let empty = items.is_empty();
                        results.publish(&items);
                        if empty {
                            on_error(strings::MSG_SEARCH_FAILED_NO_ITEMS);
                        }
                    }
                    Err(err) => {
                        error!(error = %err, "Error performing the search");
                        on_error(strings::MSG_SEARCH_FAILED_GENERAL);
                    }
                }
            });
        });

        self.search_task = Some(TaskGuard::new(handle, token));
    }

    /// Push a series to the remote service and, on success, merge the
    /// server-confirmed model into the local library before reporting `true`.
    /// Any failure reports `false` and leaves the local cache untouched.
    pub fn add_new_series(
        &mut self,
        series: SeriesModel,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        if let Some(previous) = self.add_task.take() {
            previous.cancel();
        }

        let token = CancelToken::new();
        let library = Arc::clone(&self.library);
        let dispatcher = self.dispatcher.clone();
        let completion_token = token.clone();

        let handle = self.background.spawn(async move {
            let outcome = library.send_new_to_api(&series).await;
            let library = Arc::clone(&library);
            dispatcher.post(move || {
                if completion_token.is_cancelled() {
                    return;
                }
                match outcome {
                    Ok(confirmed) => {
                        if let Err(err) = library.insert_into_local_library(&confirmed) {
                            error!(error = %err, id = confirmed.id, "Failed to store series locally");
                            callback(false);
                        } else {
                            callback(true);
                        }
                    }
                    Err(err) => {
                        error!(error = %err, id = series.id, "Error adding series");
                        callback(false);
                    }
                }
            });
        });

        self.add_task = Some(TaskGuard::new(handle, token));
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(task) = self.search_task.take() {
            task.cancel();
        }
        if let Some(task) = self.add_task.take() {
            task.cancel();
        }
        // An aborted search can no longer complete
        self.params.set_searching(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MainLoop;
    use anyhow::{anyhow, Result};
    use futures::future::BoxFuture;
    use shared::api::LibraryApi;
    use shared::db::Database;
    use shared::store::SeriesStore;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted search service: pops one queued outcome per call.
    struct FakeSearchApi {
        outcomes: Mutex<VecDeque<Result<Vec<SeriesModel>>>>,
        calls: Mutex<Vec<(String, SeriesType)>>,
    }

    impl FakeSearchApi {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn queue(&self, outcome: Result<Vec<SeriesModel>>) {
            self.outcomes.lock().unwrap().push_back(outcome);
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl SearchApi for FakeSearchApi {
        fn search_for_series_with(
            &self,
            text: &str,
            series_type: SeriesType,
        ) -> BoxFuture<'static, Result<Vec<SeriesModel>>> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), series_type));
            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted outcome")));
            Box::pin(async move { outcome })
        }
    }

    /// Remote library push that succeeds with an amended title, or fails.
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
                    Err(anyhow!("push rejected"))
                } else {
                    Ok(confirmed)
                }
            })
        }
    }

    struct Harness {
        controller: SearchController,
        main_loop: MainLoop,
        api: Arc<FakeSearchApi>,
        errors: Arc<Mutex<Vec<MessageId>>>,
        results: Arc<Mutex<Vec<Vec<SeriesModel>>>>,
        _results_sub: Subscription,
    }

    fn harness(library_fails: bool) -> Harness {
        let main_loop = MainLoop::new();
        let api = FakeSearchApi::new();
        let library = Arc::new(Library::new(
            SeriesStore::new(Database::open_in_memory().unwrap()),
            Arc::new(FakeLibraryApi {
                fail: library_fails,
            }),
        ));
        let controller = SearchController::new(
            api.clone(),
            library,
            Handle::current(),
            main_loop.dispatcher(),
        );

        let results = Arc::new(Mutex::new(Vec::new()));
        let results_sub = {
            let results = Arc::clone(&results);
            controller.observe_results(move |items| results.lock().unwrap().push(items.clone()))
        };

        Harness {
            controller,
            main_loop,
            api,
            errors: Arc::new(Mutex::new(Vec::new())),
            results,
            _results_sub: results_sub,
        }
    }

    fn error_sink(errors: &Arc<Mutex<Vec<MessageId>>>) -> impl Fn(MessageId) + Send + 'static {
        let errors = Arc::clone(errors);
        move |id| errors.lock().unwrap().push(id)
    }

    fn series(id: i64, title: &str) -> SeriesModel {
        SeriesModel::new(id, SeriesType::Anime, title)
    }

    #[tokio::test]
    async fn test_blank_text_issues_no_request() {
        let mut h = harness(false);
        h.controller.params().set_text("   ");

        let errors = error_sink(&h.errors);
        h.controller.search_for_series(SeriesType::Anime, errors);

        assert_eq!(h.api.call_count(), 0);
        assert!(!h.controller.params().is_searching());
        assert_eq!(h.main_loop.drain(), 0);
    }

    #[tokio::test]
    async fn test_unknown_type_issues_no_request() {
        let mut h = harness(false);
        h.controller.params().set_text("bebop");

        h.controller
            .search_for_series(SeriesType::Unknown, error_sink(&h.errors));

        assert_eq!(h.api.call_count(), 0);
        assert!(!h.controller.params().is_searching());
    }

    #[tokio::test]
    async fn test_successful_search_publishes_items() {
        let mut h = harness(false);
        let found = vec![series(1, "Cowboy Bebop"), series(2, "Space Dandy")];
        h.api.queue(Ok(found.clone()));
        h.controller.params().set_text("space");

        h.controller
            .search_for_series(SeriesType::Anime, error_sink(&h.errors));
        assert!(h.controller.params().is_searching());

        assert!(h.main_loop.run_one().await);

        assert!(!h.controller.params().is_searching());
        assert_eq!(*h.results.lock().unwrap(), vec![found]);
        assert!(h.errors.lock().unwrap().is_empty());
        assert_eq!(h.api.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_search_reports_no_items() {
        let mut h = harness(false);
        h.api.queue(Ok(Vec::new()));
        h.controller.params().set_text("zzzzz");

        h.controller
            .search_for_series(SeriesType::Anime, error_sink(&h.errors));
        h.main_loop.run_one().await;

        assert!(!h.controller.params().is_searching());
        // The empty list is still published, and the no-items id is reported
        assert_eq!(*h.results.lock().unwrap(), vec![Vec::new()]);
        assert_eq!(
            *h.errors.lock().unwrap(),
            vec![strings::MSG_SEARCH_FAILED_NO_ITEMS]
        );
    }

    #[tokio::test]
    async fn test_failed_search_reports_general_error() {
        let mut h = harness(false);
        h.api.queue(Err(anyhow!("boom")));
        h.controller.params().set_text("bebop");

        h.controller
            .search_for_series(SeriesType::Anime, error_sink(&h.errors));
        h.main_loop.run_one().await;

        assert!(!h.controller.params().is_searching());
        assert!(h.results.lock().unwrap().is_empty());
        assert_eq!(
            *h.errors.lock().unwrap(),
            vec![strings::MSG_SEARCH_FAILED_GENERAL]
        );
    }

    #[tokio::test]
    async fn test_new_search_supersedes_in_flight_one() {
        let mut h = harness(false);
        h.api.queue(Ok(vec![series(1, "First")]));
        h.api.queue(Ok(vec![series(2, "Second")]));
        h.controller.params().set_text("first");
        h.controller
            .search_for_series(SeriesType::Anime, error_sink(&h.errors));

        h.controller.params().set_text("second");
        h.controller
            .search_for_series(SeriesType::Anime, error_sink(&h.errors));

        h.main_loop.run_one().await;
        h.main_loop.drain();

        // Only the superseding search's items ever surface
        let published = h.results.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0][0].id, 2);
        assert!(!h.controller.params().is_searching());
    }

    #[tokio::test]
    async fn test_add_success_merges_confirmed_series() {
        let mut h = harness(false);
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);

        h.controller.add_new_series(series(10, "Texhnolyze"), move |ok| {
            sink.lock().unwrap().push(ok);
        });
        h.main_loop.run_one().await;

        assert_eq!(*reported.lock().unwrap(), vec![true]);
        let snapshot = h.controller.library().snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        // The server-amended model is what lands locally
        assert_eq!(snapshot[0].title, "Texhnolyze (confirmed)");
    }

    #[tokio::test]
    async fn test_add_failure_leaves_library_unchanged() {
        let mut h = harness(true);
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);

        h.controller.add_new_series(series(10, "Texhnolyze"), move |ok| {
            sink.lock().unwrap().push(ok);
        });
        h.main_loop.run_one().await;

        assert_eq!(*reported.lock().unwrap(), vec![false]);
        assert!(h.controller.library().snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_callback_after_disposal() {
        let mut h = harness(false);
        h.api.queue(Ok(vec![series(1, "Orphan")]));
        h.controller.params().set_text("orphan");
        h.controller
            .search_for_series(SeriesType::Anime, error_sink(&h.errors));

        drop(h.controller);
        tokio::task::yield_now().await;
        h.main_loop.drain();

        assert!(h.results.lock().unwrap().is_empty());
        assert!(h.errors.lock().unwrap().is_empty());
    }
}

//! Service trait seams for the remote tracking service.
//!
//! The workflow controller and the library repository depend on these traits
//! rather than on a concrete HTTP client, which keeps them testable with
//! in-memory fakes.

use crate::models::{SeriesModel, SeriesType};
use anyhow::Result;
use futures::future::BoxFuture;

/// Free-text search against the remote catalogue.
pub trait SearchApi: Send + Sync + 'static {
    /// Search the catalogue for series matching `text` of the given type.
    ///
    /// A single attempt: implementations must not retry internally.
    fn search_for_series_with(
        &self,
        text: &str,
        series_type: SeriesType,
    ) -> BoxFuture<'static, Result<Vec<SeriesModel>>>;
}

/// Remote side of the user's library.
pub trait LibraryApi: Send + Sync + 'static {
    /// Push a newly tracked series to the service, returning the
    /// server-confirmed (possibly amended) model.
    fn send_new_to_api(&self, series: &SeriesModel) -> BoxFuture<'static, Result<SeriesModel>>;
}

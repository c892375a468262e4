//! Search-and-add workflow for the nekome series tracker.
//!
//! The controller orchestrates catalogue searches and add-to-library pushes:
//! background work runs on a tokio handle, completion callbacks are marshaled
//! onto a main-loop dispatcher, and every in-flight request is individually
//! cancellable.

pub mod controller;
pub mod executor;
pub mod results;
pub mod strings;

pub use controller::SearchController;
pub use executor::{CancelToken, Dispatcher, MainLoop, TaskGuard};
pub use results::{ResultRow, ResultsListener, ResultsView};

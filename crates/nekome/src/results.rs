//! Search results presentation.
//!
//! Renders the result list against the full known library, marking rows whose
//! identifier is already tracked, and forwards row interactions to a
//! listener. Content updates re-render every row; an id+content diff of the
//! underlying list is computed for observability.

use shared::models::SeriesModel;
use tracing::debug;

/// Receiver for row interactions
pub trait ResultsListener {
    fn on_series_selected(&self, series: &SeriesModel);
}

/// One rendered row
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub series: SeriesModel,
    /// Whether the series id is already present in the library reference
    pub already_added: bool,
}

/// A single change between two list generations, keyed by series id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    Inserted { index: usize },
    Removed { index: usize },
    Moved { from: usize, to: usize },
    Updated { index: usize },
}

/// Diff two lists by identifier, with content equality for updates.
///
/// Indices refer to the old list for removals and to the new list otherwise.
pub fn list_diff(old: &[SeriesModel], new: &[SeriesModel]) -> Vec<ListChange> {
    let mut changes = Vec::new();

    for (index, item) in old.iter().enumerate() {
        if !new.iter().any(|n| n.id == item.id) {
            changes.push(ListChange::Removed { index });
        }
    }

    for (index, item) in new.iter().enumerate() {
        match old.iter().position(|o| o.id == item.id) {
            None => changes.push(ListChange::Inserted { index }),
            Some(old_index) => {
                if old_index != index {
                    changes.push(ListChange::Moved {
                        from: old_index,
                        to: index,
                    });
                }
                if !old[old_index].same_content(item) {
                    changes.push(ListChange::Updated { index });
                }
            }
        }
    }

    changes
}

/// The results list plus its library-membership overlay
pub struct ResultsView<L: ResultsListener> {
    listener: L,
    items: Vec<SeriesModel>,
    /// Full known library, scanned linearly for membership
    all_series: Vec<SeriesModel>,
}

impl<L: ResultsListener> ResultsView<L> {
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            items: Vec::new(),
            all_series: Vec::new(),
        }
    }

    /// Replace the library reference; every row is re-rendered
    pub fn set_all_series(&mut self, all_series: Vec<SeriesModel>) -> Vec<ResultRow> {
        self.all_series = all_series;
        self.render_rows()
    }

    /// Install a new result list and re-render every row
    pub fn set_items(&mut self, items: Vec<SeriesModel>) -> Vec<ResultRow> {
        let changes = list_diff(&self.items, &items);
        debug!(
            items = items.len(),
            changes = changes.len(),
            "Results list updated"
        );
        self.items = items;
        self.render_rows()
    }

    /// Render all rows against the current library reference
    pub fn render_rows(&self) -> Vec<ResultRow> {
        self.items
            .iter()
            .map(|item| ResultRow {
                already_added: self.is_tracked(item.id),
                series: item.clone(),
            })
            .collect()
    }

    /// Forward a row interaction to the listener; false when out of range
    pub fn select(&self, index: usize) -> bool {
        match self.items.get(index) {
            Some(series) => {
                self.listener.on_series_selected(series);
                true
            }
            None => false,
        }
    }

    pub fn items(&self) -> &[SeriesModel] {
        &self.items
    }

    fn is_tracked(&self, id: i64) -> bool {
        self.all_series.iter().any(|series| series.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::SeriesType;
    use std::cell::RefCell;

    struct RecordingListener {
        selected: RefCell<Vec<i64>>,
    }

    impl RecordingListener {
        fn new() -> Self {
            Self {
                selected: RefCell::new(Vec::new()),
            }
        }
    }

    impl ResultsListener for RecordingListener {
        fn on_series_selected(&self, series: &SeriesModel) {
            self.selected.borrow_mut().push(series.id);
        }
    }

    fn series(id: i64, title: &str) -> SeriesModel {
        let mut series = SeriesModel::new(id, SeriesType::Anime, title);
        // Pin timestamps so content comparisons only see real field changes
        series.added_at = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
        series.updated_at = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
        series
    }

    #[test]
    fn test_membership_overlay_matches_library_ids() {
        let mut view = ResultsView::new(RecordingListener::new());
        view.set_all_series(vec![series(1, "Tracked"), series(3, "Also tracked")]);

        let rows = view.set_items(vec![
            series(1, "Tracked"),
            series(2, "Untracked"),
            series(3, "Also tracked"),
        ]);

        let marks: Vec<bool> = rows.iter().map(|row| row.already_added).collect();
        assert_eq!(marks, vec![true, false, true]);
    }

    #[test]
    fn test_empty_library_marks_nothing() {
        let mut view = ResultsView::new(RecordingListener::new());
        let rows = view.set_items(vec![series(1, "A"), series(2, "B")]);
        assert!(rows.iter().all(|row| !row.already_added));
    }

    #[test]
    fn test_library_update_rerenders_rows() {
        let mut view = ResultsView::new(RecordingListener::new());
        view.set_items(vec![series(5, "Later tracked")]);

        assert!(!view.render_rows()[0].already_added);
        let rows = view.set_all_series(vec![series(5, "Later tracked")]);
        assert!(rows[0].already_added);
    }

    #[test]
    fn test_select_forwards_to_listener() {
        let mut view = ResultsView::new(RecordingListener::new());
        view.set_items(vec![series(7, "Kaiba"), series(8, "Mononoke")]);

        assert!(view.select(1));
        assert!(!view.select(5));
        assert_eq!(*view.listener.selected.borrow(), vec![8]);
    }

    #[test]
    fn test_list_diff_insert_remove() {
        let old = vec![series(1, "A"), series(2, "B")];
        let new = vec![series(1, "A"), series(3, "C")];

        let changes = list_diff(&old, &new);
        assert!(changes.contains(&ListChange::Removed { index: 1 }));
        assert!(changes.contains(&ListChange::Inserted { index: 1 }));
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_list_diff_move_and_update() {
        let old = vec![series(1, "A"), series(2, "B")];
        let new = vec![series(2, "B"), series(1, "A retitled")];

        let changes = list_diff(&old, &new);
        assert!(changes.contains(&ListChange::Moved { from: 1, to: 0 }));
        assert!(changes.contains(&ListChange::Moved { from: 0, to: 1 }));
        assert!(changes.contains(&ListChange::Updated { index: 1 }));
    }

    #[test]
    fn test_list_diff_identical_lists_are_quiet() {
        let items = vec![series(1, "A"), series(2, "B")];
        assert!(list_diff(&items, &items).is_empty());
    }
}

use std::sync::Arc;
use tracing::trace;

use crate::data::datatable::{DataValue, TableRow};
use crate::data::datavalue_compare::compare_for_sort;
use crate::table::pagination::PageWindow;
use crate::table::query_state::{ColumnSearch, SortDirection};

/// A view over a shared row collection that can filter, sort and page
/// without modifying the underlying data
#[derive(Debug)]
pub struct DataView<R> {
    /// The underlying immutable rows
    source: Arc<Vec<R>>,

    /// Row indices that are visible (after filtering and sorting)
    visible_rows: Vec<usize>,
}

impl<R> Clone for DataView<R> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            visible_rows: self.visible_rows.clone(),
        }
    }
}

impl<R: TableRow> DataView<R> {
    /// Create a new view showing all rows in source order
    pub fn new(source: Arc<Vec<R>>) -> Self {
        let visible_rows = (0..source.len()).collect();
        Self {
            source,
            visible_rows,
        }
    }

    /// Keep rows that pass every column filter
    pub fn filter_columns(mut self, search: &ColumnSearch) -> Self {
        let compiled = search.compile();
        if compiled.is_empty() {
            return self;
        }
        let source = &self.source;
        self.visible_rows
            .retain(|&idx| compiled.matches(&source[idx]));
        trace!(target: "table", "column filters kept {} rows", self.visible_rows.len());
        self
    }

    /// Keep rows where any of `columns` contains `query` (case-insensitive).
    /// An empty query or empty column list filters nothing.
    pub fn filter_any(mut self, columns: &[&str], query: &str) -> Self {
        if query.is_empty() || columns.is_empty() {
            return self;
        }
        let needle = query.to_lowercase();
        let source = &self.source;
        self.visible_rows.retain(|&idx| {
            columns.iter().any(|column| {
                source[idx]
                    .value(column)
                    .map(|v| v.contains_ignore_case(&needle))
                    .unwrap_or(false)
            })
        });
        self
    }

    /// Stable sort by one column; ties keep their current order
    pub fn sort_by(mut self, column: &str, direction: SortDirection) -> Self {
        let source = &self.source;
        let mut keyed: Vec<(usize, Option<DataValue>)> = self
            .visible_rows
            .iter()
            .map(|&idx| (idx, source[idx].value(column)))
            .collect();
        keyed.sort_by(|(_, a), (_, b)| compare_for_sort(a.as_ref(), b.as_ref(), direction));
        self.visible_rows = keyed.into_iter().map(|(idx, _)| idx).collect();
        self
    }

    /// Get the number of visible rows
    pub fn row_count(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_rows.is_empty()
    }

    /// Rows for one page window; a short final page stays short
    pub fn page(&self, window: PageWindow) -> Vec<&R> {
        window
            .slice(&self.visible_rows)
            .iter()
            .filter_map(|&idx| self.source.get(idx))
            .collect()
    }

    /// Every visible row in view order
    pub fn rows(&self) -> Vec<&R> {
        self.visible_rows
            .iter()
            .filter_map(|&idx| self.source.get(idx))
            .collect()
    }

    pub fn source(&self) -> &Arc<Vec<R>> {
        &self.source
    }

    /// Get visible row indices into the source
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }
}

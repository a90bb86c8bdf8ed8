//! Table data controller.
//!
//! Owns the query state of one table view and derives the rows to render.
//! The mode is fixed at construction: below the threshold every filter,
//! sort and page is computed in memory; at or above it the controller
//! only records the requested state and forwards it to a `ServerDelegate`,
//! trusting the caller to hand back the matching page.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::data::data_view::DataView;
use crate::data::datatable::{ColumnDescriptor, TableRow};
use crate::debouncer::DEFAULT_DEBOUNCE_MS;
use crate::table::column_search::PendingColumnSearch;
use crate::table::delegate::{FetchRequest, ServerDelegate};
use crate::table::pagination::{self, PageWindow};
use crate::table::query_state::{ColumnSearch, QueryState, SortDirection};

/// Default record count at which filtering moves to the server
pub const DEFAULT_SERVER_MODE_THRESHOLD: usize = 200;

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// Filter, sort and paginate the full collection in memory
    Client,
    /// Forward the query state to the backend
    Server,
}

/// Construction parameters for a `TableController`
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub page_size: usize,
    pub server_mode_threshold: usize,
    pub search_debounce: Duration,
    /// Declared columns. Empty means every key is accepted.
    pub columns: Vec<ColumnDescriptor>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            server_mode_threshold: DEFAULT_SERVER_MODE_THRESHOLD,
            search_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            columns: Vec::new(),
        }
    }
}

impl TableOptions {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.server_mode_threshold = threshold;
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    /// Mode for a data set of `total_records` rows
    pub fn mode_for(&self, total_records: usize) -> TableMode {
        if total_records < self.server_mode_threshold {
            TableMode::Client
        } else {
            TableMode::Server
        }
    }
}

/// Everything a table view renders for the current page
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot<'a, R> {
    pub rows: Vec<&'a R>,
    pub current_page: usize,
    pub total_pages: usize,
    pub sort_column: Option<&'a str>,
    pub sort_direction: SortDirection,
    pub total_filtered_records: usize,
    pub mode: TableMode,
}

pub struct TableController<R, D = ()> {
    options: TableOptions,
    mode: TableMode,
    state: QueryState,
    search: PendingColumnSearch,
    /// Client mode: the full collection. Server mode: the current page.
    view: DataView<R>,
    total_filtered_records: usize,
    delegate: D,
}

impl<R: TableRow> TableController<R, ()> {
    /// Controller over a fully delivered collection; the row count picks
    /// the mode and server-mode changes go nowhere
    pub fn with_rows(rows: Vec<R>, options: TableOptions) -> Self {
        let total = rows.len();
        Self::new(rows, total, options, ())
    }
}

impl<R: TableRow, D: ServerDelegate> TableController<R, D> {
    /// `rows` is the full collection in client mode and the first page in
    /// server mode; `total_records` decides which mode applies.
    pub fn new(rows: Vec<R>, total_records: usize, mut options: TableOptions, delegate: D) -> Self {
        options.page_size = options.page_size.max(1);
        let mode = options.mode_for(total_records);
        debug!(
            target: "table",
            "new table: {} records, threshold {}, {:?} mode",
            total_records,
            options.server_mode_threshold,
            mode
        );

        let search = PendingColumnSearch::new(options.search_debounce);
        let mut controller = Self {
            options,
            mode,
            state: QueryState::default(),
            search,
            view: DataView::new(Arc::new(rows)),
            total_filtered_records: total_records,
            delegate,
        };
        controller.refresh();
        controller
    }

    pub fn mode(&self) -> TableMode {
        self.mode
    }

    pub fn is_server_mode(&self) -> bool {
        self.mode == TableMode::Server
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn page_size(&self) -> usize {
        self.options.page_size
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn sort_column(&self) -> Option<&str> {
        self.state.sort_column.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.state.sort_direction
    }

    pub fn total_filtered_records(&self) -> usize {
        self.total_filtered_records
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.total_filtered_records, self.options.page_size)
    }

    /// Committed column filters
    pub fn column_search(&self) -> &ColumnSearch {
        &self.state.column_search_text
    }

    /// Column filters as typed, possibly not yet committed
    pub fn pending_column_search(&self) -> &ColumnSearch {
        self.search.pending()
    }

    pub fn search_query(&self) -> Option<&str> {
        self.state.search_query.as_deref()
    }

    pub fn query_state(&self) -> &QueryState {
        &self.state
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// Rows to render on the current page
    pub fn rows(&self) -> Vec<&R> {
        match self.mode {
            TableMode::Client => self
                .view
                .page(PageWindow::new(self.state.current_page, self.options.page_size)),
            TableMode::Server => self.view.rows(),
        }
    }

    pub fn snapshot(&self) -> TableSnapshot<'_, R> {
        TableSnapshot {
            rows: self.rows(),
            current_page: self.state.current_page,
            total_pages: self.total_pages(),
            sort_column: self.sort_column(),
            sort_direction: self.state.sort_direction,
            total_filtered_records: self.total_filtered_records,
            mode: self.mode,
        }
    }

    /// The request a backend needs to serve the current state
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            page: self.state.current_page,
            page_size: self.options.page_size,
            sort_column: self.state.sort_column.clone(),
            sort_direction: self.state.sort_direction,
            column_search: self.state.column_search_text.clone(),
            search_query: self.state.search_query.clone(),
        }
    }

    /// Move to `page`, clamped into `[1, total_pages]`
    pub fn set_page(&mut self, page: i64) {
        let clamped = pagination::clamp_page(page, self.total_pages());
        if clamped as i64 != page {
            debug!(target: "table", "page {} clamped to {}", page, clamped);
        }
        self.state.current_page = clamped;

        if self.mode == TableMode::Server {
            let request = self.fetch_request();
            self.delegate.on_page_change(&request);
        }
    }

    pub fn next_page(&mut self) {
        self.set_page(self.state.current_page as i64 + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.state.current_page as i64 - 1);
    }

    /// Same column flips direction; another column starts ascending.
    /// The current page is kept.
    pub fn set_sort(&mut self, column: &str) {
        if !self.accepts_sort(column) {
            debug!(target: "table", "ignoring sort on undeclared column '{}'", column);
            return;
        }
        self.state.apply_sort(column);
        debug!(
            target: "table",
            "sort {} {}",
            column,
            self.state.sort_direction
        );

        match self.mode {
            TableMode::Client => self.refresh(),
            TableMode::Server => {
                let request = self.fetch_request();
                self.delegate.on_sort_change(&request);
            }
        }
    }

    pub fn set_column_search(&mut self, column: &str, text: &str) {
        self.set_column_search_at(column, text, Instant::now());
    }

    /// Record a keystroke for `column`; the filter is committed once the
    /// debounce delay passes without another change
    pub fn set_column_search_at(&mut self, column: &str, text: &str, now: Instant) {
        if !self.accepts_search(column) {
            debug!(target: "table", "ignoring search on non-searchable column '{}'", column);
            return;
        }
        self.search.update_at(column, text, now);
    }

    pub fn poll_debounce(&mut self) -> bool {
        self.poll_debounce_at(Instant::now())
    }

    /// Commit the pending column search if its quiet period has elapsed
    pub fn poll_debounce_at(&mut self, now: Instant) -> bool {
        match self.search.take_ready_at(now) {
            Some(snapshot) => {
                self.commit_column_search(snapshot);
                true
            }
            None => false,
        }
    }

    /// Commit the pending column search now, skipping the delay
    pub fn flush_column_search(&mut self) -> bool {
        match self.search.flush() {
            Some(snapshot) => {
                self.commit_column_search(snapshot);
                true
            }
            None => false,
        }
    }

    /// Drop any scheduled commit. Call on view teardown.
    pub fn cancel_pending_search(&mut self) {
        self.search.cancel();
    }

    pub fn debounce_remaining(&self) -> Option<Duration> {
        self.search.time_remaining_at(Instant::now())
    }

    /// External free-text query; always returns to page 1
    pub fn set_search_query(&mut self, query: Option<String>) {
        let query = query.filter(|q| !q.is_empty());
        self.state.search_query = query;
        self.state.current_page = 1;

        match self.mode {
            TableMode::Client => self.refresh(),
            TableMode::Server => {
                let request = self.fetch_request();
                self.delegate.on_search(&request);
            }
        }
    }

    /// Install a page fetched for the current request. The reported total
    /// is taken as-is. In client mode the rows replace the collection.
    pub fn apply_page(&mut self, rows: Vec<R>, total_records: usize) {
        match self.mode {
            TableMode::Server => {
                self.view = DataView::new(Arc::new(rows));
                self.total_filtered_records = total_records;
                self.clamp_current_page();
                debug!(
                    target: "table",
                    "applied server page {} ({} total)",
                    self.state.current_page,
                    total_records
                );
            }
            TableMode::Client => self.set_rows(rows),
        }
    }

    /// Replace the full collection (client mode) and re-derive
    pub fn set_rows(&mut self, rows: Vec<R>) {
        match self.mode {
            TableMode::Client => {
                self.view = DataView::new(Arc::new(rows));
                self.refresh();
            }
            TableMode::Server => {
                let total = self.total_filtered_records;
                self.apply_page(rows, total);
            }
        }
    }

    fn commit_column_search(&mut self, search: ColumnSearch) {
        debug!(target: "table", "column search committed: {:?}", search);
        self.state.column_search_text = search;
        self.state.current_page = 1;

        match self.mode {
            TableMode::Client => self.refresh(),
            TableMode::Server => {
                let request = self.fetch_request();
                self.delegate.on_search(&request);
            }
        }
    }

    /// Client mode: filter, then sort, then clamp the page
    fn refresh(&mut self) {
        if self.mode == TableMode::Server {
            return;
        }

        let searchable: Vec<&str> = self
            .options
            .columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| c.key.as_str())
            .collect();

        let mut view = DataView::new(Arc::clone(self.view.source()))
            .filter_columns(&self.state.column_search_text)
            .filter_any(&searchable, self.state.search_query.as_deref().unwrap_or(""));
        if let Some(column) = &self.state.sort_column {
            view = view.sort_by(column, self.state.sort_direction);
        }

        self.total_filtered_records = view.row_count();
        self.view = view;
        self.clamp_current_page();
    }

    fn clamp_current_page(&mut self) {
        self.state.current_page =
            pagination::clamp_page(self.state.current_page as i64, self.total_pages());
    }

    fn accepts_sort(&self, column: &str) -> bool {
        self.options.columns.is_empty() || self.options.columns.iter().any(|c| c.key == column)
    }

    fn accepts_search(&self, column: &str) -> bool {
        self.options.columns.is_empty()
            || self
                .options
                .columns
                .iter()
                .any(|c| c.key == column && c.searchable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn scores(n: i64) -> Vec<Value> {
        (1..=n).map(|i| json!({"id": i, "tripScore": (i * 7) % 10})).collect()
    }

    #[test]
    fn test_mode_follows_threshold() {
        let options = TableOptions::default();
        assert_eq!(options.mode_for(199), TableMode::Client);
        assert_eq!(options.mode_for(200), TableMode::Server);

        let table = TableController::with_rows(scores(5), options.with_threshold(5));
        assert!(table.is_server_mode());
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let table = TableController::with_rows(scores(3), TableOptions::default().with_page_size(0));
        assert_eq!(table.page_size(), 1);
        assert_eq!(table.total_pages(), 3);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn test_sort_keeps_page() {
        let mut table = TableController::with_rows(scores(30), TableOptions::default());
        table.set_page(2);
        table.set_sort("tripScore");
        assert_eq!(table.current_page(), 2);
        assert_eq!(table.sort_column(), Some("tripScore"));
    }

    #[test]
    fn test_undeclared_columns_are_ignored() {
        let options = TableOptions::default().with_columns(vec![
            ColumnDescriptor::new("id", "ID"),
            ColumnDescriptor::new("tripScore", "Score").searchable(),
        ]);
        let mut table = TableController::with_rows(scores(5), options);

        table.set_sort("driver");
        assert_eq!(table.sort_column(), None);

        table.set_column_search("id", "1");
        assert!(table.pending_column_search().is_empty());

        table.set_column_search("tripScore", "7");
        assert_eq!(table.pending_column_search().get("tripScore"), Some("7"));
    }

    #[test]
    fn test_flush_skips_the_delay() {
        let mut table = TableController::with_rows(scores(20), TableOptions::default());
        table.set_page(2);
        table.set_column_search("tripScore", "0");
        assert!(table.debounce_remaining().is_some());

        assert!(table.flush_column_search());
        assert_eq!(table.current_page(), 1);
        assert_eq!(table.total_filtered_records(), 2);
        assert_eq!(table.debounce_remaining(), None);
        assert!(!table.poll_debounce());
    }
}

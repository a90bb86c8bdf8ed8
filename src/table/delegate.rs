use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::data::data_view::DataView;
use crate::data::datatable::TableRow;
use crate::table::pagination::PageWindow;
use crate::table::query_state::{ColumnSearch, SortDirection};

/// Everything a backend needs to serve one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub page: usize,
    pub page_size: usize,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    pub column_search: ColumnSearch,
    pub search_query: Option<String>,
}

/// One page of rows plus the total matching the request's filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedPage<R> {
    pub rows: Vec<R>,
    pub total_records: usize,
}

/// Callbacks a server-delegated controller invokes after each state change.
///
/// Implementations are expected to fetch the requested page and hand it
/// back through `TableController::apply_page`.
pub trait ServerDelegate {
    fn on_page_change(&mut self, request: &FetchRequest);

    fn on_sort_change(&mut self, _request: &FetchRequest) {}

    fn on_search(&mut self, _request: &FetchRequest) {}
}

/// No-op delegate for controllers that never leave client mode
impl ServerDelegate for () {
    fn on_page_change(&mut self, _request: &FetchRequest) {}
}

/// Delegate that keeps only the most recent request for the owner to
/// service on its next turn of the event loop
#[derive(Debug, Default, Clone)]
pub struct LatestRequest {
    pending: Option<FetchRequest>,
    issued: usize,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Option<FetchRequest> {
        self.pending.take()
    }

    pub fn peek(&self) -> Option<&FetchRequest> {
        self.pending.as_ref()
    }

    /// Requests received over the delegate's lifetime
    pub fn issued(&self) -> usize {
        self.issued
    }

    fn record(&mut self, request: &FetchRequest) {
        self.issued += 1;
        self.pending = Some(request.clone());
    }
}

impl ServerDelegate for LatestRequest {
    fn on_page_change(&mut self, request: &FetchRequest) {
        self.record(request);
    }

    fn on_sort_change(&mut self, request: &FetchRequest) {
        self.record(request);
    }

    fn on_search(&mut self, request: &FetchRequest) {
        self.record(request);
    }
}

/// Fetch capability backing a server-delegated table
pub trait PageSource<R> {
    fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage<R>>;
}

/// Serves pages out of a held collection with the same filter, sort and
/// paginate rules the client-side controller applies
#[derive(Debug)]
pub struct InMemoryPageSource<R> {
    rows: Arc<Vec<R>>,
    searchable_columns: Vec<String>,
}

impl<R: TableRow> InMemoryPageSource<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self::from_shared(Arc::new(rows))
    }

    pub fn from_shared(rows: Arc<Vec<R>>) -> Self {
        Self {
            rows,
            searchable_columns: Vec::new(),
        }
    }

    /// Columns the free-text `search_query` is matched against
    pub fn with_searchable_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R: TableRow + Clone> PageSource<R> for InMemoryPageSource<R> {
    fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage<R>> {
        let columns: Vec<&str> = self.searchable_columns.iter().map(String::as_str).collect();
        let mut view = DataView::new(Arc::clone(&self.rows))
            .filter_columns(&request.column_search)
            .filter_any(&columns, request.search_query.as_deref().unwrap_or(""));
        if let Some(column) = &request.sort_column {
            view = view.sort_by(column, request.sort_direction);
        }

        let rows: Vec<R> = view
            .page(PageWindow::new(request.page, request.page_size))
            .into_iter()
            .cloned()
            .collect();
        debug!(
            target: "fetch",
            "in-memory page {} -> {} of {} rows",
            request.page,
            rows.len(),
            view.row_count()
        );

        Ok(FetchedPage {
            rows,
            total_records: view.row_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn request(page: usize) -> FetchRequest {
        FetchRequest {
            page,
            page_size: 2,
            sort_column: None,
            sort_direction: SortDirection::Ascending,
            column_search: ColumnSearch::new(),
            search_query: None,
        }
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let value = serde_json::to_value(request(3)).unwrap();
        assert_eq!(value["page"], json!(3));
        assert_eq!(value["pageSize"], json!(2));
        assert_eq!(value["sortDirection"], json!("asc"));
        assert_eq!(value["columnSearch"], json!({}));
    }

    #[test]
    fn test_in_memory_source_pages_sorted_rows() {
        let source = InMemoryPageSource::new(vec![
            json!({"id": 3}),
            json!({"id": 1}),
            json!({"id": 2}),
        ]);
        let mut req = request(2);
        req.sort_column = Some("id".to_string());

        let page: FetchedPage<Value> = source.fetch(&req).unwrap();
        assert_eq!(page.total_records, 3);
        assert_eq!(page.rows, vec![json!({"id": 3})]);
    }

    #[test]
    fn test_latest_request_keeps_last() {
        let mut delegate = LatestRequest::new();
        delegate.on_page_change(&request(2));
        delegate.on_sort_change(&request(5));
        assert_eq!(delegate.issued(), 2);
        assert_eq!(delegate.peek().map(|r| r.page), Some(5));
        assert_eq!(delegate.take().map(|r| r.page), Some(5));
        assert!(delegate.take().is_none());
    }

    #[test]
    fn test_default_callbacks_ignore_sort_and_search() {
        #[derive(Default)]
        struct PagesOnly(Vec<usize>);

        impl ServerDelegate for PagesOnly {
            fn on_page_change(&mut self, request: &FetchRequest) {
                self.0.push(request.page);
            }
        }

        let mut delegate = PagesOnly::default();
        delegate.on_sort_change(&request(2));
        delegate.on_search(&request(1));
        delegate.on_page_change(&request(4));
        assert_eq!(delegate.0, vec![4]);
    }
}

//! Paginated, sortable, filterable table state
//!
//! Leaves first: `query_state` and `pagination` are plain data and
//! arithmetic, `column_search` debounces keystrokes, `delegate` is the
//! boundary to a backend, and `controller` composes them.

pub mod column_search;
pub mod controller;
pub mod delegate;
pub mod pagination;
pub mod query_state;

pub use controller::{TableController, TableMode, TableOptions, TableSnapshot};
pub use delegate::{FetchRequest, FetchedPage, InMemoryPageSource, LatestRequest, PageSource, ServerDelegate};
pub use query_state::{ColumnSearch, QueryState, SortDirection};

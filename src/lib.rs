pub mod api_client;
pub mod config;
pub mod data;
pub mod debouncer;
pub mod logging;
pub mod table;

pub use data::datatable::{ColumnDescriptor, DataRow, DataValue, TableRow};
pub use table::{
    ColumnSearch, FetchRequest, FetchedPage, PageSource, ServerDelegate, SortDirection,
    TableController, TableMode, TableOptions, TableSnapshot,
};

//! Data layer: row values, comparison, loading and the filtered/sorted view
//!
//! Rows are never mutated once loaded; views hold indices into a shared
//! collection.

pub mod data_view;
pub mod datatable;
pub mod datatable_loaders;
pub mod datavalue_compare;

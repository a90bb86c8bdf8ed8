use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::data::datatable::TableRow;

/// Sort direction for the active sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-column free-text filters keyed by column key.
///
/// An empty string never survives in the mapping: setting a column to ""
/// removes its filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSearch {
    filters: BTreeMap<String, String>,
}

impl ColumnSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the filter for one column
    pub fn set(&mut self, column: impl Into<String>, text: impl Into<String>) {
        let column = column.into();
        let text = text.into();
        if text.is_empty() {
            self.filters.remove(&column);
        } else {
            self.filters.insert(column, text);
        }
    }

    pub fn remove(&mut self, column: &str) {
        self.filters.remove(column);
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.filters.get(column).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Copy with every empty entry dropped. Mappings built through `set`
    /// are already normalised; deserialised ones may not be.
    pub fn normalized(&self) -> Self {
        Self {
            filters: self
                .filters
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Pre-lowercased needles for repeated matching
    pub fn compile(&self) -> CompiledColumnSearch {
        CompiledColumnSearch {
            needles: self
                .filters
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v.to_lowercase()))
                .collect(),
        }
    }

    /// True when the row passes every active filter
    pub fn matches<R: TableRow + ?Sized>(&self, row: &R) -> bool {
        self.compile().matches(row)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnSearch {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut search = ColumnSearch::new();
        for (k, v) in iter {
            search.set(k, v);
        }
        search
    }
}

/// Column filters with lowercased needles
#[derive(Debug, Clone, Default)]
pub struct CompiledColumnSearch {
    needles: Vec<(String, String)>,
}

impl CompiledColumnSearch {
    pub fn is_empty(&self) -> bool {
        self.needles.is_empty()
    }

    /// Logical AND of case-insensitive substring tests
    pub fn matches<R: TableRow + ?Sized>(&self, row: &R) -> bool {
        self.needles.iter().all(|(column, needle)| {
            row.value(column)
                .map(|v| v.contains_ignore_case(needle))
                .unwrap_or(false)
        })
    }
}

/// Query state owned by one table view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub current_page: usize,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    pub column_search_text: ColumnSearch,
    pub search_query: Option<String>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            current_page: 1,
            sort_column: None,
            sort_direction: SortDirection::Ascending,
            column_search_text: ColumnSearch::new(),
            search_query: None,
        }
    }
}

impl QueryState {
    /// Same column flips the direction; a new column starts ascending
    pub fn apply_sort(&mut self, column: &str) {
        if self.sort_column.as_deref() == Some(column) {
            self.sort_direction = self.sort_direction.toggle();
        } else {
            self.sort_column = Some(column.to_string());
            self.sort_direction = SortDirection::Ascending;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_text_removes_filter() {
        let mut search = ColumnSearch::new();
        search.set("driverName", "ann");
        search.set("vehicle", "volvo");
        assert_eq!(search.len(), 2);

        search.set("driverName", "");
        assert_eq!(search.len(), 1);
        assert_eq!(search.get("driverName"), None);
        assert_eq!(search.get("vehicle"), Some("volvo"));
    }

    #[test]
    fn test_normalized_drops_deserialised_empties() {
        let search: ColumnSearch =
            serde_json::from_value(json!({"a": "", "b": "x"})).unwrap();
        let normalized = search.normalized();
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("b"), Some("x"));
    }

    #[test]
    fn test_matches_is_and_across_columns() {
        let search: ColumnSearch = [("driverName", "ANN"), ("status", "act")]
            .into_iter()
            .collect();
        assert!(search.matches(&json!({"driverName": "Hannah", "status": "Active"})));
        assert!(!search.matches(&json!({"driverName": "Hannah", "status": "Idle"})));
        assert!(!search.matches(&json!({"driverName": "Hannah"})));
    }

    #[test]
    fn test_apply_sort_toggles_same_column() {
        let mut state = QueryState::default();
        state.apply_sort("tripScore");
        assert_eq!(state.sort_column.as_deref(), Some("tripScore"));
        assert_eq!(state.sort_direction, SortDirection::Ascending);

        state.apply_sort("tripScore");
        assert_eq!(state.sort_direction, SortDirection::Descending);

        state.apply_sort("distance");
        assert_eq!(state.sort_column.as_deref(), Some("distance"));
        assert_eq!(state.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_sort_direction_serde() {
        assert_eq!(
            serde_json::to_value(SortDirection::Descending).unwrap(),
            json!("desc")
        );
    }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Represents the data type of a cell value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Json,
    Null,
}

impl DataType {
    /// Infer type from a string value
    pub fn infer_from_string(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("null") {
            return DataType::Null;
        }

        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            return DataType::Boolean;
        }

        if value.parse::<i64>().is_ok() {
            return DataType::Integer;
        }

        if value.parse::<f64>().is_ok() {
            return DataType::Float;
        }

        if parse_timestamp(value).is_some() {
            return DataType::DateTime;
        }

        DataType::String
    }
}

/// A single cell value in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // ISO 8601 text, parsed on comparison
    Json(JsonValue),  // nested objects and arrays
    Null,
}

impl DataValue {
    /// Build a value from a raw text field, inferring its type
    pub fn from_string(s: &str) -> Self {
        match DataType::infer_from_string(s) {
            DataType::Null => DataValue::Null,
            DataType::Boolean => DataValue::Boolean(s.eq_ignore_ascii_case("true")),
            DataType::Integer => s
                .parse::<i64>()
                .map(DataValue::Integer)
                .unwrap_or_else(|_| DataValue::String(s.to_string())),
            DataType::Float => s
                .parse::<f64>()
                .map(DataValue::Float)
                .unwrap_or_else(|_| DataValue::String(s.to_string())),
            DataType::DateTime => DataValue::DateTime(s.to_string()),
            DataType::String | DataType::Json => DataValue::String(s.to_string()),
        }
    }

    /// Convert a JSON value without guessing at string contents
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else {
                    n.as_f64().map(DataValue::Float).unwrap_or(DataValue::Null)
                }
            }
            JsonValue::String(s) => DataValue::String(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => DataValue::Json(value.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Timestamp for DateTime values, if the text parses
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            DataValue::DateTime(s) => parse_timestamp(s),
            _ => None,
        }
    }

    /// Case-insensitive substring test against the displayed text
    pub fn contains_ignore_case(&self, needle_lower: &str) -> bool {
        if self.is_null() {
            return false;
        }
        self.to_string().to_lowercase().contains(needle_lower)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::Json(v) => write!(f, "{}", v),
            DataValue::Null => write!(f, ""),
        }
    }
}

/// Parse the timestamp shapes the backend emits: RFC 3339, naive
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`, or a bare date.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Keyed lookup over a row of any shape.
///
/// The table core never reflects over a row; it only asks for the value
/// stored under a column key the caller declared.
pub trait TableRow {
    /// The value stored under `key`, or `None` when the row has no such key
    fn value(&self, key: &str) -> Option<DataValue>;
}

/// A row keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRow {
    pub values: BTreeMap<String, DataValue>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: DataValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: DataValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a row from a JSON object; non-objects produce an empty row
    pub fn from_json_object(value: &JsonValue) -> Self {
        let values = value
            .as_object()
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.clone(), DataValue::from_json(v)))
                    .collect()
            })
            .unwrap_or_default();
        Self { values }
    }
}

impl FromIterator<(String, DataValue)> for DataRow {
    fn from_iter<T: IntoIterator<Item = (String, DataValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl TableRow for DataRow {
    fn value(&self, key: &str) -> Option<DataValue> {
        self.values.get(key).cloned()
    }
}

impl TableRow for BTreeMap<String, DataValue> {
    fn value(&self, key: &str) -> Option<DataValue> {
        self.get(key).cloned()
    }
}

impl TableRow for HashMap<String, DataValue> {
    fn value(&self, key: &str) -> Option<DataValue> {
        self.get(key).cloned()
    }
}

impl TableRow for Map<String, JsonValue> {
    fn value(&self, key: &str) -> Option<DataValue> {
        self.get(key).map(DataValue::from_json)
    }
}

impl TableRow for JsonValue {
    fn value(&self, key: &str) -> Option<DataValue> {
        self.as_object()?.get(key).map(DataValue::from_json)
    }
}

impl<R: TableRow + ?Sized> TableRow for &R {
    fn value(&self, key: &str) -> Option<DataValue> {
        (**self).value(key)
    }
}

/// Column declared by the caller; the controller only ever sees its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub searchable: bool,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            searchable: false,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_from_string() {
        assert_eq!(DataType::infer_from_string(""), DataType::Null);
        assert_eq!(DataType::infer_from_string("TRUE"), DataType::Boolean);
        assert_eq!(DataType::infer_from_string("42"), DataType::Integer);
        assert_eq!(DataType::infer_from_string("4.5"), DataType::Float);
        assert_eq!(DataType::infer_from_string("2024-03-01"), DataType::DateTime);
        assert_eq!(
            DataType::infer_from_string("2024-03-01T08:15:00Z"),
            DataType::DateTime
        );
        assert_eq!(DataType::infer_from_string("Hannah"), DataType::String);
    }

    #[test]
    fn test_from_json_keeps_numbers_and_nesting() {
        assert_eq!(DataValue::from_json(&json!(7)), DataValue::Integer(7));
        assert_eq!(DataValue::from_json(&json!(7.5)), DataValue::Float(7.5));
        assert_eq!(
            DataValue::from_json(&json!("2024-01-01")),
            DataValue::String("2024-01-01".to_string())
        );
        let nested = json!({"make": "Volvo"});
        assert_eq!(DataValue::from_json(&nested), DataValue::Json(nested));
    }

    #[test]
    fn test_contains_ignore_case() {
        let v = DataValue::String("Hannah".to_string());
        assert!(v.contains_ignore_case("ann"));
        assert!(!v.contains_ignore_case("bob"));
        assert!(DataValue::Integer(1234).contains_ignore_case("23"));
        assert!(!DataValue::Null.contains_ignore_case("null"));
    }

    #[test]
    fn test_json_row_lookup() {
        let row = json!({"driverName": "Anna", "tripScore": 88});
        assert_eq!(
            row.value("driverName"),
            Some(DataValue::String("Anna".to_string()))
        );
        assert_eq!(row.value("tripScore"), Some(DataValue::Integer(88)));
        assert_eq!(row.value("missing"), None);

        let data_row = DataRow::from_json_object(&row);
        assert_eq!(data_row.len(), 2);
        assert_eq!(data_row.value("tripScore"), Some(DataValue::Integer(88)));
    }
}

use crate::data::datatable::DataValue;
use crate::table::query_state::SortDirection;
use std::cmp::Ordering;

/// Rank used when two values have different runtime types.
/// Order: Boolean < numbers < String < DateTime < Json
fn type_rank(value: &DataValue) -> u8 {
    match value {
        DataValue::Boolean(_) => 0,
        DataValue::Integer(_) | DataValue::Float(_) => 1,
        DataValue::String(_) => 2,
        DataValue::DateTime(_) => 3,
        DataValue::Json(_) => 4,
        DataValue::Null => 5,
    }
}

/// Float ordering with every NaN above all numbers and equal to each other
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact integer/float ordering; `i as f64` would round above 2^53
fn compare_int_float(i: i64, f: f64) -> Ordering {
    // 2^63 is exactly representable; i64 covers [-2^63, 2^63)
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

/// Natural ordering of two values: numeric for numbers, lexicographic for
/// strings, chronological for timestamps. Total over every input, NaN
/// included, so it is safe to hand to `sort_by`.
pub fn compare_datavalues(a: &DataValue, b: &DataValue) -> Ordering {
    match (a, b) {
        (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),
        (DataValue::Float(a), DataValue::Float(b)) => compare_floats(*a, *b),
        // Compare actual numeric values, not types
        (DataValue::Integer(i), DataValue::Float(f)) => compare_int_float(*i, *f),
        (DataValue::Float(f), DataValue::Integer(i)) => compare_int_float(*i, *f).reverse(),

        (DataValue::String(a), DataValue::String(b)) => a.cmp(b),
        (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),

        // Parsed timestamps first, in time order; unparseable text after
        (DataValue::DateTime(_), DataValue::DateTime(_)) => {
            match (a.as_timestamp(), b.as_timestamp()) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.to_string().cmp(&b.to_string()),
            }
        }

        (DataValue::Json(a), DataValue::Json(b)) => a.to_string().cmp(&b.to_string()),

        (DataValue::Null, DataValue::Null) => Ordering::Equal,

        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Null and NaN carry no sortable value; both are treated as missing
fn present(value: Option<&DataValue>) -> Option<&DataValue> {
    value.filter(|v| !v.is_null() && !matches!(v, DataValue::Float(f) if f.is_nan()))
}

/// Sort comparator for one column.
///
/// Present values follow `compare_datavalues`, reversed for descending.
/// Missing values (absent key, null or NaN) sort after every present value in
/// both directions. Returns `Equal` for ties so a stable sort keeps the
/// input order.
pub fn compare_for_sort(
    a: Option<&DataValue>,
    b: Option<&DataValue>,
    direction: SortDirection,
) -> Ordering {
    match (present(a), present(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let cmp = compare_datavalues(a, b);
            match direction {
                SortDirection::Ascending => cmp,
                SortDirection::Descending => cmp.reverse(),
            }
        }
    }
}

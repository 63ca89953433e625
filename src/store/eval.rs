//! Filter matching over JSON documents
//!
//! Implements the dotted-path document query subset the history service
//! relies on: top-level conjunction, `$or` disjunction, `$ne`, `$in`,
//! array descent, numeric index segments, and array-contains equality.

use std::cmp::Ordering;

use serde_json::Value;

use super::StoreError;

/// Does `doc` satisfy `filter`?
///
/// `filter` must be an object. Every entry must hold: `$or` takes an array
/// of sub-filters of which at least one must match, and any other key is a
/// dotted path paired with either a plain equality value or an operator
/// object (`$ne`, `$in`).
pub fn matches(filter: &Value, doc: &Value) -> Result<bool, StoreError> {
    let entries = filter
        .as_object()
        .ok_or_else(|| StoreError::UnsupportedFilter(format!("filter must be an object: {filter}")))?;

    for (key, condition) in entries {
        let holds = if key == "$or" {
            any_branch_matches(condition, doc)?
        } else {
            path_condition_matches(doc, key, condition)?
        };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_branch_matches(branches: &Value, doc: &Value) -> Result<bool, StoreError> {
    let branches = branches
        .as_array()
        .ok_or_else(|| StoreError::UnsupportedFilter("$or expects an array".to_string()))?;

    for branch in branches {
        if matches(branch, doc)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn path_condition_matches(doc: &Value, path: &str, condition: &Value) -> Result<bool, StoreError> {
    let candidates = resolve_path(doc, path);

    if let Some(operators) = operator_object(condition) {
        for (operator, operand) in operators {
            let holds = match operator.as_str() {
                "$ne" => !equals_any(&candidates, operand),
                "$in" => {
                    let allowed = operand.as_array().ok_or_else(|| {
                        StoreError::UnsupportedFilter("$in expects an array".to_string())
                    })?;
                    allowed.iter().any(|value| equals_any(&candidates, value))
                }
                other => return Err(StoreError::UnsupportedOperator(other.to_string())),
            };
            if !holds {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    Ok(equals_any(&candidates, condition))
}

/// Treats `condition` as an operator object only when every key starts
/// with `$`, so plain embedded-document equality still works.
fn operator_object(condition: &Value) -> Option<&serde_json::Map<String, Value>> {
    let map = condition.as_object()?;
    if !map.is_empty() && map.keys().all(|key| key.starts_with('$')) {
        Some(map)
    } else {
        None
    }
}

/// Resolves a dotted path against `doc`, descending into arrays.
///
/// A numeric segment indexes into an array; any other segment applied to an
/// array descends into each element, so a path can address a field of any
/// element (`act.authorization.actor` reaches every authorization entry).
pub fn resolve_path<'doc>(doc: &'doc Value, path: &str) -> Vec<&'doc Value> {
    let mut current = vec![doc];

    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        next.push(child);
                    }
                }
                Value::Array(items) => {
                    if let Ok(index) = segment.parse::<usize>() {
                        if let Some(child) = items.get(index) {
                            next.push(child);
                        }
                    } else {
                        for item in items {
                            if let Some(child) = item.as_object().and_then(|map| map.get(segment)) {
                                next.push(child);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
        if current.is_empty() {
            break;
        }
    }
    current
}

/// First value the path resolves to, used for sort keys.
pub fn path_value<'doc>(doc: &'doc Value, path: &str) -> Option<&'doc Value> {
    resolve_path(doc, path).into_iter().next()
}

/// Equality across all path candidates. A candidate that is an array also
/// matches when any of its elements equals `target` (array-contains).
fn equals_any(candidates: &[&Value], target: &Value) -> bool {
    candidates.iter().any(|candidate| {
        values_equal(candidate, target)
            || candidate
                .as_array()
                .is_some_and(|items| items.iter().any(|item| values_equal(item, target)))
    })
}

/// Scalar equality with numeric cross-type comparison, so `5` and `5.0`
/// compare equal.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => left == right,
    }
}

/// Total order over JSON values for sorting: null, then numbers, then
/// strings, then objects, then arrays, then booleans. Values of the same
/// type compare naturally; numbers compare as floats.
pub fn compare(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    let rank = type_rank(left).cmp(&type_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ordering = compare_values(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        _ => Ordering::Equal,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

//! Pagination parameter coercion and validation
//!
//! Query and body parameters arrive as optional raw strings or loose JSON
//! values. Coercion never fails: unparseable input falls back to the
//! route's default. Validation happens after coercion, in a fixed order,
//! and produces the historical plain-text messages.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{HistoryError, Result};
use crate::store::SortOrder;

/// Hard cap on page size across every paged route.
pub const MAX_ELEMENTS: u64 = 1000;

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 10;
/// The voters listing defaults to a larger page.
pub const DEFAULT_VOTERS_LIMIT: i64 = 100;
const DEFAULT_SORT: i64 = -1;

/// Raw paging query parameters, deserialized before coercion.
#[derive(Debug, Default, Deserialize)]
pub struct RawPageParams {
    pub skip: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
    pub sort: SortOrder,
}

fn coerce(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Coerces a loose JSON body value to an integer: numbers directly,
/// numeric strings by parsing. Anything else is treated as absent.
pub fn numeric(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(raw)) => raw.trim().parse().ok(),
        _ => None,
    }
}

/// Validates `skip`/`limit`/`sort` query parameters for paged action and
/// voter listings.
pub fn validate_page(raw: &RawPageParams, default_limit: i64) -> Result<Page> {
    let skip = coerce(raw.skip.as_deref(), DEFAULT_SKIP);
    let limit = coerce(raw.limit.as_deref(), default_limit);
    let sort = coerce(raw.sort.as_deref(), DEFAULT_SORT);
    bounded_page(skip, limit, sort)
}

/// Validates the cursor-offset addressing used by the POST actions route.
///
/// `pos`/`offset` address a window relative to the newest (`pos < 0`) or
/// oldest end of the match set: the sign of `pos` picks the direction, the
/// magnitude of `offset` is the page size, and `|offset * (-pos - 1)|`
/// pages are skipped. When either value is absent the route defaults
/// apply.
pub fn validate_position_page(pos: Option<i64>, offset: Option<i64>) -> Result<Page> {
    let (skip, limit, sort) = match (pos, offset) {
        (Some(pos), Some(offset)) => {
            let sort = if pos < 0 { -1 } else { 1 };
            let limit = offset.saturating_abs();
            let skip = offset
                .saturating_mul(pos.saturating_neg().saturating_sub(1))
                .saturating_abs();
            (skip, limit, sort)
        }
        _ => (DEFAULT_SKIP, DEFAULT_LIMIT, DEFAULT_SORT),
    };
    bounded_page(skip, limit, sort)
}

/// Validates `skip`/`limit` for the accounts listing, which has no sort
/// parameter and its own oversize message.
pub fn validate_accounts_page(skip: Option<&str>, limit: Option<&str>) -> Result<(u64, u64)> {
    let skip = coerce(skip, DEFAULT_SKIP);
    let limit = coerce(limit, DEFAULT_LIMIT);

    if limit > MAX_ELEMENTS as i64 {
        return Err(HistoryError::AccountPageTooLarge(MAX_ELEMENTS));
    }
    if skip < 0 || limit < 0 {
        return Err(HistoryError::NegativePage { skip, limit });
    }
    Ok((skip as u64, limit as u64))
}

fn bounded_page(skip: i64, limit: i64, sort: i64) -> Result<Page> {
    if limit > MAX_ELEMENTS as i64 {
        return Err(HistoryError::PageTooLarge(MAX_ELEMENTS));
    }
    if skip < 0 || limit < 0 {
        return Err(HistoryError::NegativePage { skip, limit });
    }
    let sort = SortOrder::from_direction(sort).ok_or(HistoryError::InvalidSort)?;
    Ok(Page {
        skip: skip as u64,
        limit: limit as u64,
        sort,
    })
}

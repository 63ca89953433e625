//! Document store abstraction
//!
//! The history API reads named collections of JSON documents. [`Store`] is
//! the seam a document database adapter implements; the bundled
//! [`MemoryStore`] backs tests and snapshot-serving deployments.

pub mod eval;
pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Collection holding one document per action receipt.
pub const ACTION_TRACES: &str = "action_traces";
/// Collection holding packed transactions keyed by `id`.
pub const TRANSACTIONS: &str = "transactions";
/// Collection holding full execution traces keyed by `id`.
pub const TRANSACTION_TRACES: &str = "transaction_traces";
/// Collection holding one document per block, keyed by `block_num`.
pub const BLOCKS: &str = "blocks";
/// Collection holding one document per account, keyed by `name`.
pub const ACCOUNTS: &str = "accounts";
/// Index collection mapping controlling accounts to controlled accounts.
pub const ACCOUNT_CONTROLS: &str = "account_controls";
/// Index collection mapping public keys to account names.
pub const PUB_KEYS: &str = "pub_keys";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    #[error("Unsupported filter shape: {0}")]
    UnsupportedFilter(String),

    #[error("Unsupported aggregation pipeline: {0}")]
    UnsupportedPipeline(String),

    #[error("Malformed aggregation result: {0}")]
    MalformedAggregation(String),

    #[error("Inconsistent store state: {0}")]
    Inconsistent(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Direction for a single-field sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Maps the wire-level direction values `1` and `-1`.
    pub fn from_direction(direction: i64) -> Option<Self> {
        match direction {
            1 => Some(SortOrder::Ascending),
            -1 => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

/// Cursor controls for a `find`: optional single-field sort, then skip,
/// then an optional cap on returned documents.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Option<(String, SortOrder)>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    /// A sorted page: sort by `field`, then apply `skip` and `limit`.
    pub fn page(field: &str, sort: SortOrder, skip: u64, limit: u64) -> Self {
        FindOptions {
            sort: Some((field.to_string(), sort)),
            skip,
            limit: Some(limit),
        }
    }

    /// Newest or oldest single document by `field`.
    pub fn first_by(field: &str, sort: SortOrder) -> Self {
        FindOptions {
            sort: Some((field.to_string(), sort)),
            skip: 0,
            limit: Some(1),
        }
    }
}

/// Read-only document store contract.
///
/// Filters use the dotted-path and operator subset described in
/// [`eval`]; implementations may reject shapes outside that subset with
/// [`StoreError::UnsupportedOperator`] or
/// [`StoreError::UnsupportedPipeline`].
#[async_trait]
pub trait Store: Send + Sync {
    /// All documents matching `filter`, ordered and windowed per `options`.
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        options: FindOptions,
    ) -> Result<Vec<Value>, StoreError>;

    /// First matching document in natural (insertion) order.
    async fn find_one(&self, collection: &str, filter: &Value)
        -> Result<Option<Value>, StoreError>;

    /// Number of documents matching `filter`.
    async fn count_documents(&self, collection: &str, filter: &Value) -> Result<u64, StoreError>;

    /// Distinct values of `field` among documents matching `filter`.
    /// Array-valued fields contribute each element.
    async fn distinct(
        &self,
        collection: &str,
        field: &str,
        filter: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Runs an aggregation pipeline and returns the result rows.
    async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> Result<Vec<Value>, StoreError>;
}

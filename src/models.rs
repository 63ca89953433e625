//! JSON response shapes
//!
//! Documents flow through untyped as `serde_json::Value`; these structs
//! only pin the envelope keys and their casing, which are part of the
//! public wire contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paged action traces together with the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionsPage {
    pub actions_total: u64,
    pub actions: Vec<Value>,
}

/// Paged vote traces together with the total vote count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotersPage {
    pub votes_counter: u64,
    pub voters: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksPage {
    pub blocks: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsPage {
    pub transactions: Vec<Value>,
}

/// Paged accounts. The global total is only computed and serialized when
/// the caller asks for it with `counter=on`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_eos_accounts: Option<u64>,
    pub accounts: Vec<Value>,
}

/// Facts derived from an account's trace history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account: String,
    /// Creator account name, or null when no creation trace is recorded.
    pub created_by: Value,
    pub is_contract: bool,
    pub is_producer: bool,
}

/// Contract code deployment summary. The first/last stamps are omitted
/// entirely when the account never deployed code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_set_code: Option<SetCodeStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_set_code: Option<SetCodeStamp>,
    pub set_code_times: u64,
}

/// When a deployment happened. The key intentionally stays snake_case to
/// match the stored trace field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCodeStamp {
    pub block_time: Value,
}

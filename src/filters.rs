//! Document filter builders for history queries

use serde_json::{json, Map, Value};

/// The chain system account that owns housekeeping actions.
pub const SYSTEM_ACCOUNT: &str = "eosio";
/// Action name recorded when a producer registers.
pub const REGISTER_PRODUCER: &str = "regproducer";
/// Action name recorded when a producer unregisters.
pub const UNREGISTER_PRODUCER: &str = "unregprod";
/// Action name that disables action-name filtering when requested.
pub const ACTION_WILDCARD: &str = "all";

/// Paths an account name can appear under in an action trace. A trace
/// matches an account query when the name is found under any of them.
const ACCOUNT_MATCH_PATHS: [&str; 7] = [
    "act.account",
    "act.data.receiver",
    "act.data.from",
    "act.data.to",
    "act.data.name",
    "act.data.voter",
    "act.authorization.actor",
];

/// Traces involving `account` in any role, optionally restricted to one
/// action name. Without an account the disjunction is empty and matches
/// nothing. The wildcard action name disables the action restriction.
pub fn account_actions(account: Option<&str>, action: Option<&str>) -> Value {
    let branches: Vec<Value> = account
        .map(|name| {
            ACCOUNT_MATCH_PATHS
                .iter()
                .map(|path| json!({ *path: name }))
                .collect()
        })
        .unwrap_or_default();

    let mut filter = Map::new();
    filter.insert("$or".to_string(), Value::Array(branches));
    insert_action_name(&mut filter, action);
    Value::Object(filter)
}

/// Traces whose contract account is `name`, optionally restricted to one
/// action name.
pub fn contract_actions(name: Option<&str>, action: Option<&str>) -> Value {
    let mut filter = Map::new();
    if let Some(name) = name {
        filter.insert("act.account".to_string(), json!(name));
    }
    insert_action_name(&mut filter, action);
    Value::Object(filter)
}

fn insert_action_name(filter: &mut Map<String, Value>, action: Option<&str>) {
    if let Some(action) = action.filter(|action| *action != ACTION_WILDCARD) {
        filter.insert("act.name".to_string(), json!(action));
    }
}

/// Vote actions whose producer list contains `producer`.
pub fn voters_of(producer: &str) -> Value {
    json!({
        "act.name": "voteproducer",
        "act.data.producers": { "$in": [producer] }
    })
}

/// Accounts by exact name, or every account when no name is given.
pub fn accounts_named(name: Option<&str>) -> Value {
    match name {
        Some(name) => json!({ "name": name }),
        None => json!({}),
    }
}

/// Transactions that did not originate from system housekeeping: the first
/// action is neither a system-account action nor an `onblock` tick.
pub fn user_transactions() -> Value {
    json!({
        "actions.0.account": { "$ne": SYSTEM_ACCOUNT },
        "actions.0.name": { "$ne": "onblock" }
    })
}

pub fn transaction_with_id(id: &str) -> Value {
    json!({ "id": id })
}

pub fn controlled_by(controlling_account: &str) -> Value {
    json!({ "controlling_account": controlling_account })
}

pub fn keyed_by(public_key: &str) -> Value {
    json!({ "public_key": public_key })
}

/// The system `newaccount` trace that created `name`.
pub fn account_creation(name: &str) -> Value {
    json!({
        "act.account": SYSTEM_ACCOUNT,
        "act.name": "newaccount",
        "act.data.name": name
    })
}

/// System `setcode` traces that deployed contract code to `name`.
pub fn code_deployments(name: &str) -> Value {
    json!({
        "act.account": SYSTEM_ACCOUNT,
        "act.name": "setcode",
        "act.data.account": name
    })
}

/// Producer registration and unregistration traces for `name`. The most
/// recent one decides current producer status.
pub fn producer_registrations(name: &str) -> Value {
    json!({
        "act.account": SYSTEM_ACCOUNT,
        "act.name": { "$in": [REGISTER_PRODUCER, UNREGISTER_PRODUCER] },
        "act.data.producer": name
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_actions_covers_every_role_path() {
        let filter = account_actions(Some("alice"), None);
        let branches = filter["$or"].as_array().unwrap();
        assert_eq!(branches.len(), ACCOUNT_MATCH_PATHS.len());
        for (branch, path) in branches.iter().zip(ACCOUNT_MATCH_PATHS) {
            assert_eq!(branch[path], json!("alice"));
        }
        assert!(filter.get("act.name").is_none());
    }

    #[test]
    fn test_account_actions_with_action_name() {
        let filter = account_actions(Some("alice"), Some("transfer"));
        assert_eq!(filter["act.name"], json!("transfer"));
    }

    #[test]
    fn test_account_actions_wildcard_drops_action_restriction() {
        let filter = account_actions(Some("alice"), Some(ACTION_WILDCARD));
        assert!(filter.get("act.name").is_none());
    }

    #[test]
    fn test_account_actions_without_account_matches_nothing() {
        let filter = account_actions(None, Some("transfer"));
        assert_eq!(filter["$or"], json!([]));
    }

    #[test]
    fn test_contract_actions_shapes() {
        assert_eq!(
            contract_actions(Some("eosio.token"), Some("issue")),
            json!({ "act.account": "eosio.token", "act.name": "issue" })
        );
        assert_eq!(
            contract_actions(Some("eosio.token"), Some(ACTION_WILDCARD)),
            json!({ "act.account": "eosio.token" })
        );
        assert_eq!(contract_actions(None, None), json!({}));
    }

    #[test]
    fn test_user_transactions_excludes_housekeeping() {
        let filter = user_transactions();
        assert_eq!(filter["actions.0.account"]["$ne"], json!(SYSTEM_ACCOUNT));
        assert_eq!(filter["actions.0.name"]["$ne"], json!("onblock"));
    }
}

//! History query execution
//!
//! Translates validated requests into store reads: paged listings fan out
//! the count and the page concurrently, totals for contract action pages
//! are memoized in the count cache, and account/contract summaries derive
//! facts from system action traces.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::cache::CountCache;
use crate::error::{HistoryError, Result};
use crate::filters;
use crate::models::{
    AccountSummary, AccountsPage, ActionsPage, BlocksPage, ContractSummary, SetCodeStamp,
    TransactionsPage, VotersPage,
};
use crate::params::Page;
use crate::store::{self, FindOptions, SortOrder, Store, StoreError};

/// The unpaged recent listings always return this many documents.
pub const RECENT_PAGE_LIMIT: u64 = 10;

pub struct HistoryService {
    store: Arc<dyn Store>,
    action_count_cache: CountCache,
}

impl HistoryService {
    pub fn new(store: Arc<dyn Store>, action_count_cache: CountCache) -> Self {
        HistoryService {
            store,
            action_count_cache,
        }
    }

    /// The ten most recent blocks, newest first.
    pub async fn recent_blocks(&self) -> Result<BlocksPage> {
        let blocks = self
            .store
            .find(
                store::BLOCKS,
                &json!({}),
                FindOptions::page("block_num", SortOrder::Descending, 0, RECENT_PAGE_LIMIT),
            )
            .await?;
        Ok(BlocksPage { blocks })
    }

    /// The ten most recent user transactions, newest first. Housekeeping
    /// transactions are filtered out.
    pub async fn recent_transactions(&self) -> Result<TransactionsPage> {
        let transactions = self
            .store
            .find(
                store::TRANSACTIONS,
                &filters::user_transactions(),
                FindOptions::page("createdAt", SortOrder::Descending, 0, RECENT_PAGE_LIMIT),
            )
            .await?;
        Ok(TransactionsPage { transactions })
    }

    /// Paged traces involving an account in any role. Totals are computed
    /// per request; this surface is too varied to cache well.
    pub async fn account_actions(
        &self,
        account: Option<&str>,
        action: Option<&str>,
        page: Page,
    ) -> Result<ActionsPage> {
        self.actions_page(filters::account_actions(account, action), page, false)
            .await
    }

    /// Paged traces of one contract account. Totals are memoized.
    pub async fn contract_actions(
        &self,
        name: Option<&str>,
        action: Option<&str>,
        page: Page,
    ) -> Result<ActionsPage> {
        self.actions_page(filters::contract_actions(name, action), page, true)
            .await
    }

    async fn actions_page(
        &self,
        filter: Value,
        page: Page,
        cache_total: bool,
    ) -> Result<ActionsPage> {
        let count = self.action_trace_total(&filter, cache_total);
        let window = async {
            self.store
                .find(
                    store::ACTION_TRACES,
                    &filter,
                    FindOptions::page("_id", page.sort, page.skip, page.limit),
                )
                .await
                .map_err(HistoryError::from)
        };
        let (actions_total, actions) = tokio::try_join!(count, window)?;
        Ok(ActionsPage {
            actions_total,
            actions,
        })
    }

    /// Total action traces matching `filter`, optionally memoized under
    /// the filter's canonical JSON as cache key.
    async fn action_trace_total(&self, filter: &Value, use_cache: bool) -> Result<u64> {
        let cache_key = use_cache.then(|| filter.to_string());
        if let Some(key) = &cache_key {
            if let Some(total) = self.action_count_cache.get(key) {
                debug!(key = %key, total, "action total served from cache");
                return Ok(total);
            }
        }

        let pipeline = [
            json!({ "$match": filter }),
            json!({ "$group": { "_id": null, "sum": { "$sum": 1 } } }),
        ];
        let rows = self.store.aggregate(store::ACTION_TRACES, &pipeline).await?;
        let total = match rows.first() {
            // grouping over zero matches yields no row
            None => 0,
            Some(row) => row
                .get("sum")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    StoreError::MalformedAggregation(
                        "count row is missing a numeric sum".to_string(),
                    )
                })?,
        };

        if let Some(key) = cache_key {
            self.action_count_cache.put(key, total);
        }
        Ok(total)
    }

    /// Paged vote traces listing `producer`, with the total vote count.
    pub async fn voters_page(&self, producer: &str, page: Page) -> Result<VotersPage> {
        let filter = filters::voters_of(producer);
        let count = async {
            self.store
                .count_documents(store::ACTION_TRACES, &filter)
                .await
                .map_err(HistoryError::from)
        };
        let window = async {
            self.store
                .find(
                    store::ACTION_TRACES,
                    &filter,
                    FindOptions::page("_id", page.sort, page.skip, page.limit),
                )
                .await
                .map_err(HistoryError::from)
        };
        let (votes_counter, voters) = tokio::try_join!(count, window)?;
        Ok(VotersPage {
            votes_counter,
            voters,
        })
    }

    /// Distinct action names an account's traces carry.
    pub async fn unique_action_names(&self, account: &str) -> Result<Vec<Value>> {
        let names = self
            .store
            .distinct(
                store::ACTION_TRACES,
                "act.name",
                &filters::account_actions(Some(account), None),
            )
            .await?;
        Ok(names)
    }

    /// Paged accounts in natural order, optionally filtered by exact name.
    /// The global account total is only fetched when `include_total` is
    /// set, and it always counts the whole collection.
    pub async fn accounts_page(
        &self,
        name: Option<&str>,
        skip: u64,
        limit: u64,
        include_total: bool,
    ) -> Result<AccountsPage> {
        let filter = filters::accounts_named(name);
        let window = async {
            self.store
                .find(
                    store::ACCOUNTS,
                    &filter,
                    FindOptions {
                        sort: None,
                        skip,
                        limit: Some(limit),
                    },
                )
                .await
                .map_err(HistoryError::from)
        };

        if include_total {
            let everything = json!({});
            let count = async {
                self.store
                    .count_documents(store::ACCOUNTS, &everything)
                    .await
                    .map_err(HistoryError::from)
            };
            let (total, accounts) = tokio::try_join!(count, window)?;
            Ok(AccountsPage {
                all_eos_accounts: Some(total),
                accounts,
            })
        } else {
            Ok(AccountsPage {
                all_eos_accounts: None,
                accounts: window.await?,
            })
        }
    }

    /// Full execution trace of one transaction, or None when unknown.
    pub async fn transaction_trace(&self, id: &str) -> Result<Option<Value>> {
        let trace = self
            .store
            .find_one(store::TRANSACTION_TRACES, &filters::transaction_with_id(id))
            .await?;
        Ok(trace)
    }

    /// Accounts controlled by the given account, from the controls index.
    pub async fn controlled_accounts(&self, controlling_account: &str) -> Result<Vec<Value>> {
        let entries = self
            .store
            .find(
                store::ACCOUNT_CONTROLS,
                &filters::controlled_by(controlling_account),
                FindOptions::default(),
            )
            .await?;
        Ok(entries)
    }

    /// Accounts associated with a public key, from the key index.
    pub async fn key_accounts(&self, public_key: &str) -> Result<Vec<Value>> {
        let entries = self
            .store
            .find(
                store::PUB_KEYS,
                &filters::keyed_by(public_key),
                FindOptions::default(),
            )
            .await?;
        Ok(entries)
    }

    /// Derives creator, contract and producer status for one account from
    /// its system traces.
    pub async fn account_summary(&self, name: &str) -> Result<AccountSummary> {
        let creation = self
            .store
            .find_one(store::ACTION_TRACES, &filters::account_creation(name))
            .await?;
        let set_code_times = self
            .store
            .count_documents(store::ACTION_TRACES, &filters::code_deployments(name))
            .await?;
        let latest_registration = self
            .store
            .find(
                store::ACTION_TRACES,
                &filters::producer_registrations(name),
                FindOptions::first_by("_id", SortOrder::Descending),
            )
            .await?;

        let created_by = creation
            .as_ref()
            .and_then(|trace| trace.pointer("/act/data/creator"))
            .cloned()
            .unwrap_or(Value::Null);
        let is_producer = latest_registration
            .first()
            .and_then(|trace| trace.pointer("/act/name"))
            .and_then(Value::as_str)
            == Some(filters::REGISTER_PRODUCER);

        Ok(AccountSummary {
            account: name.to_string(),
            created_by,
            is_contract: set_code_times > 0,
            is_producer,
        })
    }

    /// Summarizes code deployments for a contract account: how often code
    /// was set and when the first and last deployment happened.
    pub async fn contract_summary(&self, name: &str) -> Result<ContractSummary> {
        let filter = filters::code_deployments(name);
        let set_code_times = self
            .store
            .count_documents(store::ACTION_TRACES, &filter)
            .await?;

        if set_code_times == 0 {
            return Ok(ContractSummary {
                last_set_code: None,
                first_set_code: None,
                set_code_times,
            });
        }

        let newest = self
            .store
            .find(
                store::ACTION_TRACES,
                &filter,
                FindOptions::first_by("_id", SortOrder::Descending),
            )
            .await?;
        let oldest = self
            .store
            .find(
                store::ACTION_TRACES,
                &filter,
                FindOptions::first_by("_id", SortOrder::Ascending),
            )
            .await?;

        Ok(ContractSummary {
            last_set_code: Some(deployment_stamp(newest)?),
            first_set_code: Some(deployment_stamp(oldest)?),
            set_code_times,
        })
    }
}

fn deployment_stamp(traces: Vec<Value>) -> Result<SetCodeStamp> {
    let trace = traces.into_iter().next().ok_or_else(|| {
        HistoryError::Store(StoreError::Inconsistent(
            "positive setcode count but no trace returned".to_string(),
        ))
    })?;
    Ok(SetCodeStamp {
        block_time: trace.get("block_time").cloned().unwrap_or(Value::Null),
    })
}

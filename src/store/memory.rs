//! In-memory document store
//!
//! Backs tests and snapshot-serving deployments. Collections preserve
//! insertion order, and every inserted document receives a monotonically
//! increasing numeric `_id` unless it already carries one.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};

use super::eval;
use super::{FindOptions, SortOrder, Store, StoreError};

#[derive(Default)]
struct Collection {
    next_id: u64,
    documents: Vec<Value>,
}

impl Collection {
    fn insert(&mut self, mut document: Value) -> Result<(), StoreError> {
        let map = document
            .as_object_mut()
            .ok_or_else(|| StoreError::InvalidDocument("document must be a JSON object".to_string()))?;
        self.next_id += 1;
        map.entry("_id").or_insert_with(|| json!(self.next_id));
        self.documents.push(document);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Inserts one document, assigning `_id` when absent.
    pub fn insert(&self, collection: &str, document: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(document)
    }

    pub fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write();
        let target = collections.entry(collection.to_string()).or_default();
        for document in documents {
            target.insert(document)?;
        }
        Ok(())
    }

    /// Loads a snapshot file: a JSON object mapping collection names to
    /// arrays of documents.
    pub fn load_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: Value = serde_json::from_str(&raw)?;
        let collections = snapshot.as_object().ok_or_else(|| {
            StoreError::Snapshot("snapshot root must be an object of collections".to_string())
        })?;

        for (name, documents) in collections {
            let documents = documents.as_array().ok_or_else(|| {
                StoreError::Snapshot(format!("collection {name} must be an array"))
            })?;
            self.insert_many(name, documents.to_vec())?;
        }
        Ok(())
    }

    fn select(
        &self,
        collection: &str,
        filter: &Value,
        options: &FindOptions,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read();
        let Some(target) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut selected = Vec::new();
        for document in &target.documents {
            if eval::matches(filter, document)? {
                selected.push(document);
            }
        }

        if let Some((field, order)) = &options.sort {
            // sort_by is stable, so ties keep insertion order in both
            // directions
            selected.sort_by(|a, b| {
                let left = eval::path_value(a, field);
                let right = eval::path_value(b, field);
                match order {
                    SortOrder::Ascending => eval::compare(left, right),
                    SortOrder::Descending => eval::compare(right, left),
                }
            });
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(selected
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        options: FindOptions,
    ) -> Result<Vec<Value>, StoreError> {
        self.select(collection, filter, &options)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Value,
    ) -> Result<Option<Value>, StoreError> {
        let options = FindOptions {
            sort: None,
            skip: 0,
            limit: Some(1),
        };
        Ok(self.select(collection, filter, &options)?.into_iter().next())
    }

    async fn count_documents(&self, collection: &str, filter: &Value) -> Result<u64, StoreError> {
        let collections = self.collections.read();
        let Some(target) = collections.get(collection) else {
            return Ok(0);
        };

        let mut count = 0u64;
        for document in &target.documents {
            if eval::matches(filter, document)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn distinct(
        &self,
        collection: &str,
        field: &str,
        filter: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read();
        let Some(target) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut values: Vec<Value> = Vec::new();
        for document in &target.documents {
            if !eval::matches(filter, document)? {
                continue;
            }
            for candidate in eval::resolve_path(document, field) {
                match candidate {
                    Value::Array(items) => {
                        for item in items {
                            push_distinct(&mut values, item);
                        }
                    }
                    other => push_distinct(&mut values, other),
                }
            }
        }
        values.sort_by(|a, b| eval::compare(Some(a), Some(b)));
        Ok(values)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Value],
    ) -> Result<Vec<Value>, StoreError> {
        let (filter, output_key) = parse_count_pipeline(pipeline)?;
        let total = self.count_documents(collection, filter).await?;
        if total == 0 {
            // grouping over zero matched documents produces no row
            return Ok(Vec::new());
        }
        Ok(vec![json!({ "_id": null, output_key: total })])
    }
}

fn push_distinct(values: &mut Vec<Value>, candidate: &Value) {
    if !values.iter().any(|value| eval::values_equal(value, candidate)) {
        values.push(candidate.clone());
    }
}

/// Accepts exactly the counting pipeline
/// `[{ "$match": <filter> }, { "$group": { "_id": null, <key>: { "$sum": 1 } } }]`
/// and returns the filter together with the output key.
fn parse_count_pipeline(pipeline: &[Value]) -> Result<(&Value, String), StoreError> {
    let unsupported = || StoreError::UnsupportedPipeline(format!("{pipeline:?}"));

    let [match_stage, group_stage] = pipeline else {
        return Err(unsupported());
    };

    let match_stage = match_stage.as_object().ok_or_else(unsupported)?;
    if match_stage.len() != 1 {
        return Err(unsupported());
    }
    let filter = match_stage.get("$match").ok_or_else(unsupported)?;

    let group_stage = group_stage.as_object().ok_or_else(unsupported)?;
    if group_stage.len() != 1 {
        return Err(unsupported());
    }
    let group = group_stage
        .get("$group")
        .and_then(Value::as_object)
        .ok_or_else(unsupported)?;
    if group.len() != 2 || !group.get("_id").is_some_and(Value::is_null) {
        return Err(unsupported());
    }

    let (output_key, accumulator) = group
        .iter()
        .find(|(key, _)| key.as_str() != "_id")
        .ok_or_else(unsupported)?;
    let accumulator = accumulator.as_object().ok_or_else(unsupported)?;
    let counts_one = accumulator.len() == 1
        && accumulator
            .get("$sum")
            .and_then(Value::as_f64)
            .is_some_and(|step| step == 1.0);
    if !counts_one {
        return Err(unsupported());
    }

    Ok((filter, output_key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_many(
                "blocks",
                vec![
                    json!({ "block_num": 3, "producer": "prodone" }),
                    json!({ "block_num": 1, "producer": "prodtwo" }),
                    json!({ "block_num": 2, "producer": "prodone" }),
                ],
            )
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = seeded();
        let all = store
            .find("blocks", &json!({}), FindOptions::default())
            .await
            .unwrap();
        let ids: Vec<u64> = all.iter().map(|doc| doc["_id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_find_sorts_skips_and_limits() {
        let store = seeded();
        let page = store
            .find(
                "blocks",
                &json!({}),
                FindOptions::page("block_num", SortOrder::Descending, 1, 1),
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["block_num"], json!(2));
    }

    #[tokio::test]
    async fn test_find_skip_past_end_is_empty() {
        let store = seeded();
        let page = store
            .find(
                "blocks",
                &json!({}),
                FindOptions::page("block_num", SortOrder::Ascending, 10, 5),
            )
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_find_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let all = store
            .find("missing", &json!({}), FindOptions::default())
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_find_one_returns_first_in_insertion_order() {
        let store = seeded();
        let first = store
            .find_one("blocks", &json!({ "producer": "prodone" }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first["block_num"], json!(3));
    }

    #[tokio::test]
    async fn test_count_documents() {
        let store = seeded();
        let count = store
            .count_documents("blocks", &json!({ "producer": "prodone" }))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_distinct_unpacks_arrays_and_dedupes() {
        let store = MemoryStore::new();
        store
            .insert_many(
                "action_traces",
                vec![
                    json!({ "act": { "name": "transfer" } }),
                    json!({ "act": { "name": "issue" } }),
                    json!({ "act": { "name": "transfer" } }),
                ],
            )
            .unwrap();
        let names = store
            .distinct("action_traces", "act.name", &json!({}))
            .await
            .unwrap();
        assert_eq!(names, vec![json!("issue"), json!("transfer")]);
    }

    #[tokio::test]
    async fn test_aggregate_counts_matching_documents() {
        let store = seeded();
        let pipeline = [
            json!({ "$match": { "producer": "prodone" } }),
            json!({ "$group": { "_id": null, "sum": { "$sum": 1 } } }),
        ];
        let rows = store.aggregate("blocks", &pipeline).await.unwrap();
        assert_eq!(rows, vec![json!({ "_id": null, "sum": 2 })]);
    }

    #[tokio::test]
    async fn test_aggregate_zero_matches_yields_no_rows() {
        let store = seeded();
        let pipeline = [
            json!({ "$match": { "producer": "nobody" } }),
            json!({ "$group": { "_id": null, "sum": { "$sum": 1 } } }),
        ];
        let rows = store.aggregate("blocks", &pipeline).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_rejects_other_pipelines() {
        let store = seeded();
        let pipeline = [json!({ "$match": {} }), json!({ "$sort": { "block_num": 1 } })];
        assert!(matches!(
            store.aggregate("blocks", &pipeline).await,
            Err(StoreError::UnsupportedPipeline(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_rejects_non_object() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.insert("blocks", json!([1, 2])),
            Err(StoreError::InvalidDocument(_))
        ));
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let snapshot = json!({
            "blocks": [{ "block_num": 9 }],
            "accounts": [{ "name": "alice" }, { "name": "bob" }]
        });
        write!(file, "{snapshot}").unwrap();

        let store = MemoryStore::new();
        store.load_snapshot(file.path()).unwrap();

        assert_eq!(
            store.count_documents("blocks", &json!({})).await.unwrap(),
            1
        );
        assert_eq!(
            store.count_documents("accounts", &json!({})).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_load_snapshot_rejects_non_object_root() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();

        let store = MemoryStore::new();
        assert!(matches!(
            store.load_snapshot(file.path()),
            Err(StoreError::Snapshot(_))
        ));
    }
}

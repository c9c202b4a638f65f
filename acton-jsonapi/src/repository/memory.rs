//! In-memory [`ResourceStore`]
//!
//! Keeps rows per resource type in insertion order and to-many memberships
//! per owner. Useful as a reference implementation, for tests, and for
//! prototyping a resource before a database exists.
//!
//! # Example
//!
//! ```rust
//! use acton_jsonapi::model::{ModelSchema, Record};
//! use acton_jsonapi::repository::{MemoryStore, ResourceQuery, ResourceStore};
//!
//! # tokio_test_block(async {
//! let store = MemoryStore::new().with_schema(ModelSchema::new("articles"));
//! let schema = store.schema("articles").unwrap();
//!
//! let mut record = Record::new(schema).with_attribute("title", "Hello");
//! store.save(&mut record).await.unwrap();
//! assert_eq!(record.id(), Some("1"));
//!
//! let all = store.fetch(&ResourceQuery::new("articles")).await.unwrap();
//! assert_eq!(all.len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::error::{RepositoryError, RepositoryOperation};
use super::query::{FilterCondition, OrderDirection, ResourceQuery, SortSpec};
use super::traits::{RepositoryResult, ResourceStore};
use crate::model::{ModelSchema, Record, RelationDef, RelationKind, Related};

#[derive(Debug, Clone)]
struct Row {
    id: String,
    attributes: Map<String, Value>,
}

type MembershipKey = (String, String, String);

#[derive(Debug, Default)]
struct MemoryState {
    tables: BTreeMap<String, Vec<Row>>,
    memberships: BTreeMap<MembershipKey, Vec<String>>,
    sequences: BTreeMap<String, u64>,
    failures: HashSet<RepositoryOperation>,
}

impl MemoryState {
    fn row(&self, resource_type: &str, id: &str) -> Option<&Row> {
        self.tables
            .get(resource_type)
            .and_then(|rows| rows.iter().find(|row| row.id == id))
    }

    fn check(&self, operation: RepositoryOperation) -> RepositoryResult<()> {
        if self.failures.contains(&operation) {
            return Err(RepositoryError::database_error(
                operation,
                format!("injected {} failure", operation),
            ));
        }
        Ok(())
    }
}

/// In-memory store keyed by resource type
#[derive(Debug, Default)]
pub struct MemoryStore {
    schemas: BTreeMap<String, Arc<ModelSchema>>,
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store with no registered models
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model; records of unregistered types are never found
    #[must_use]
    pub fn with_schema(mut self, schema: ModelSchema) -> Self {
        self.schemas
            .insert(schema.resource_type.clone(), Arc::new(schema));
        self
    }

    /// Shared schema of a registered model
    pub fn schema(&self, resource_type: &str) -> Option<Arc<ModelSchema>> {
        self.schemas.get(resource_type).cloned()
    }

    /// Make every subsequent call of `operation` fail with a database error
    pub async fn fail_on(&self, operation: RepositoryOperation) {
        self.state.write().await.failures.insert(operation);
    }

    /// Stop injecting failures
    pub async fn clear_failures(&self) {
        self.state.write().await.failures.clear();
    }

    /// Number of stored rows of a type
    pub async fn len(&self, resource_type: &str) -> usize {
        self.state
            .read()
            .await
            .tables
            .get(resource_type)
            .map_or(0, Vec::len)
    }

    /// Whether no rows of a type are stored
    pub async fn is_empty(&self, resource_type: &str) -> bool {
        self.len(resource_type).await == 0
    }

    /// Member keys of a to-many association
    pub async fn members(&self, record: &Record, relation: &str) -> Vec<String> {
        let Some(id) = record.id() else {
            return Vec::new();
        };
        let key = (
            record.resource_type().to_string(),
            id.to_string(),
            relation.to_string(),
        );
        self.state
            .read()
            .await
            .memberships
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    fn materialize(&self, resource_type: &str, row: &Row) -> Option<Record> {
        let schema = self.schemas.get(resource_type)?;
        let mut record = Record::new(schema.clone()).with_id(row.id.clone());
        record.fill(&row.attributes);
        Some(record)
    }

    fn membership_key(
        record: &Record,
        relation: &RelationDef,
        operation: RepositoryOperation,
    ) -> RepositoryResult<MembershipKey> {
        let id = record.id().ok_or_else(|| {
            RepositoryError::constraint_violation(
                operation,
                format!(
                    "cannot change '{}' members of an unsaved {} record",
                    relation.name,
                    record.resource_type()
                ),
            )
        })?;
        Ok((
            record.resource_type().to_string(),
            id.to_string(),
            relation.name.clone(),
        ))
    }
}

fn row_matches(row: &Row, filters: &[FilterCondition]) -> bool {
    filters.iter().all(|condition| {
        if condition.column == "id" {
            return condition.value.matches(&Value::String(row.id.clone()));
        }
        condition
            .value
            .matches(row.attributes.get(&condition.column).unwrap_or(&Value::Null))
    })
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn compare_rows(a: &Row, b: &Row, sort: &[SortSpec]) -> Ordering {
    for spec in sort {
        let ordering = if spec.column == "id" {
            compare_ids(&a.id, &b.id)
        } else {
            compare_values(
                a.attributes.get(&spec.column).unwrap_or(&Value::Null),
                b.attributes.get(&spec.column).unwrap_or(&Value::Null),
            )
        };
        let ordering = match spec.direction {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl ResourceStore for MemoryStore {
    async fn find(&self, resource_type: &str, id: &str) -> RepositoryResult<Option<Record>> {
        let state = self.state.read().await;
        state.check(RepositoryOperation::Find)?;
        Ok(state
            .row(resource_type, id)
            .and_then(|row| self.materialize(resource_type, row)))
    }

    async fn fetch(&self, query: &ResourceQuery) -> RepositoryResult<Vec<Record>> {
        let state = self.state.read().await;
        state.check(RepositoryOperation::Query)?;

        let mut rows: Vec<&Row> = state
            .tables
            .get(&query.resource_type)
            .map(|rows| rows.iter().filter(|row| row_matches(row, &query.filters)).collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| compare_rows(a, b, &query.sort));

        let (offset, limit) = query
            .pagination
            .map_or((0, usize::MAX), |p| {
                (
                    usize::try_from(p.offset).unwrap_or(usize::MAX),
                    usize::try_from(p.limit).unwrap_or(usize::MAX),
                )
            });

        tracing::trace!(
            resource_type = %query.resource_type,
            filters = query.filters.len(),
            sort = query.sort.len(),
            "memory store fetch"
        );

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|row| self.materialize(&query.resource_type, row))
            .collect())
    }

    async fn count(&self, query: &ResourceQuery) -> RepositoryResult<u64> {
        let state = self.state.read().await;
        state.check(RepositoryOperation::Count)?;
        let count = state
            .tables
            .get(&query.resource_type)
            .map_or(0, |rows| {
                rows.iter()
                    .filter(|row| row_matches(row, &query.filters))
                    .count()
            });
        Ok(count as u64)
    }

    async fn save(&self, record: &mut Record) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.check(RepositoryOperation::Save)?;

        let resource_type = record.resource_type().to_string();
        let is_new = record.id().is_none();
        if is_new {
            let sequence = state.sequences.entry(resource_type.clone()).or_insert(0);
            *sequence += 1;
            record.set_id(sequence.to_string());
        }

        if record.schema().timestamps {
            let now = Value::String(chrono::Utc::now().to_rfc3339());
            if is_new || record.attribute("created_at").is_none() {
                record.set_attribute("created_at", now.clone());
            }
            record.set_attribute("updated_at", now);
        }

        let id = record.id().map(str::to_string).unwrap_or_default();
        let attributes = record.attributes().clone();
        let rows = state.tables.entry(resource_type.clone()).or_default();
        match rows.iter_mut().find(|row| row.id == id) {
            Some(row) => row.attributes = attributes,
            None => rows.push(Row {
                id: id.clone(),
                attributes,
            }),
        }

        tracing::debug!(resource_type = %resource_type, id = %id, created = is_new, "record saved");
        Ok(())
    }

    async fn delete(&self, record: &Record) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.check(RepositoryOperation::Delete)?;

        let resource_type = record.resource_type().to_string();
        let id = record.id().unwrap_or_default().to_string();
        let rows = state.tables.entry(resource_type.clone()).or_default();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(RepositoryError::not_found(resource_type, id)
                .with_operation(RepositoryOperation::Delete));
        }
        state
            .memberships
            .retain(|(owner_type, owner_id, _), _| *owner_type != resource_type || *owner_id != id);

        tracing::debug!(resource_type = %resource_type, id = %id, "record deleted");
        Ok(())
    }

    async fn load_relation(
        &self,
        record: &Record,
        relation: &RelationDef,
    ) -> RepositoryResult<Related> {
        let state = self.state.read().await;
        state.check(RepositoryOperation::LoadRelation)?;

        match relation.kind {
            RelationKind::ToOne => {
                let key = relation
                    .foreign_key
                    .as_ref()
                    .and_then(|column| record.attribute(column))
                    .and_then(|value| match value {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    });
                let related = key.and_then(|key| {
                    state
                        .row(&relation.related_type, &key)
                        .and_then(|row| self.materialize(&relation.related_type, row))
                });
                Ok(Related::One(related.map(Box::new)))
            }
            RelationKind::ToMany => {
                let Some(id) = record.id() else {
                    return Ok(Related::Many(Vec::new()));
                };
                let key = (
                    record.resource_type().to_string(),
                    id.to_string(),
                    relation.name.clone(),
                );
                let members = state
                    .memberships
                    .get(&key)
                    .map(|ids| {
                        ids.iter()
                            .filter_map(|member| state.row(&relation.related_type, member))
                            .filter_map(|row| self.materialize(&relation.related_type, row))
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(Related::Many(members))
            }
        }
    }

    async fn attach(
        &self,
        record: &Record,
        relation: &RelationDef,
        ids: &[String],
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.check(RepositoryOperation::Attach)?;
        let key = Self::membership_key(record, relation, RepositoryOperation::Attach)?;
        let members = state.memberships.entry(key).or_default();
        for id in ids {
            if !members.contains(id) {
                members.push(id.clone());
            }
        }
        Ok(())
    }

    async fn sync(
        &self,
        record: &Record,
        relation: &RelationDef,
        ids: &[String],
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.check(RepositoryOperation::Sync)?;
        let key = Self::membership_key(record, relation, RepositoryOperation::Sync)?;
        let mut members: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            if !members.contains(id) {
                members.push(id.clone());
            }
        }
        state.memberships.insert(key, members);
        Ok(())
    }
}

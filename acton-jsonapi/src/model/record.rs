//! Records and their JSON:API resource-object form

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::schema::{pluralize, ModelSchema, RelationDef, RelationKind};

/// Attribute names that never live in the attribute map
const RESERVED_ATTRIBUTES: [&str; 2] = ["id", "type"];

/// A loaded relation value
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    /// To-one relation; `None` when nothing is associated
    One(Option<Box<Record>>),
    /// To-many relation
    Many(Vec<Record>),
}

impl Related {
    /// Empty value for a relation of the given cardinality
    pub fn empty(kind: RelationKind) -> Self {
        match kind {
            RelationKind::ToOne => Self::One(None),
            RelationKind::ToMany => Self::Many(Vec::new()),
        }
    }

    /// Related records as a flat list; a single record becomes a one-element list
    pub fn records(&self) -> Vec<&Record> {
        match self {
            Self::One(Some(record)) => vec![record.as_ref()],
            Self::One(None) => Vec::new(),
            Self::Many(records) => records.iter().collect(),
        }
    }
}

/// A persisted record exposed through the API
///
/// Wraps the attribute map produced by the store together with the shared
/// [`ModelSchema`]. The key is kept apart from the attributes, and `type` is
/// derived from the schema, so neither can appear inside `attributes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<ModelSchema>,
    id: Option<String>,
    attributes: Map<String, Value>,
    relations: BTreeMap<String, Related>,
    exposed_relations: Vec<String>,
}

impl Record {
    /// Create an unsaved record without attributes
    pub fn new(schema: Arc<ModelSchema>) -> Self {
        Self {
            schema,
            id: None,
            attributes: Map::new(),
            relations: BTreeMap::new(),
            exposed_relations: Vec::new(),
        }
    }

    /// Set the primary key
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set one attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Shared model metadata
    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// JSON:API type of the record
    pub fn resource_type(&self) -> &str {
        &self.schema.resource_type
    }

    /// Primary key, absent until the record is first saved
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Assign the primary key
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// `(type, id)` identity used for included-set deduplication
    pub fn identity(&self) -> Option<(String, String)> {
        self.id
            .as_ref()
            .map(|id| (self.schema.resource_type.clone(), id.clone()))
    }

    /// All stored attributes, hidden ones included
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// A single stored attribute
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set one attribute; reserved names are ignored
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
            return;
        }
        self.attributes.insert(name, value.into());
    }

    /// Copy every entry of `values` onto the record, skipping reserved names
    pub fn fill(&mut self, values: &Map<String, Value>) {
        for (name, value) in values {
            self.set_attribute(name.clone(), value.clone());
        }
    }

    /// A loaded relation
    pub fn relation(&self, name: &str) -> Option<&Related> {
        self.relations.get(name)
    }

    /// Whether a relation has been loaded
    pub fn relation_loaded(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Store a loaded relation value
    pub fn set_relation(&mut self, name: impl Into<String>, related: Related) {
        self.relations.insert(name.into(), related);
    }

    /// Associate a to-one related record
    ///
    /// Writes the related key into the relation's foreign key column and caches
    /// the related record. Nothing is persisted until the owner is saved.
    pub fn associate(&mut self, relation: &RelationDef, related: Record) {
        if let (Some(column), Some(key)) = (&relation.foreign_key, related.id()) {
            self.attributes
                .insert(column.clone(), Value::String(key.to_string()));
        }
        self.relations
            .insert(relation.name.clone(), Related::One(Some(Box::new(related))));
    }

    /// Relations resolved for the current request
    pub fn exposed_relations(&self) -> &[String] {
        &self.exposed_relations
    }

    /// Record the relations resolved for the current request
    pub fn set_exposed_relations(&mut self, relations: Vec<String>) {
        self.exposed_relations = relations;
    }

    /// `{id, type}` reference to this record
    pub fn linkage(&self) -> Value {
        json!({
            "id": self.id,
            "type": self.schema.resource_type,
        })
    }

    /// Serialize into the JSON:API resource-object shape
    ///
    /// Emits `{id, type, attributes}` and, when at least one loaded relation is
    /// representable, a `links` object of relationship linkage. Hidden names and
    /// pivot records are skipped; to-many keys use the plural relation name.
    pub fn to_document(&self) -> Value {
        let attributes: Map<String, Value> = self
            .attributes
            .iter()
            .filter(|(name, _)| {
                !RESERVED_ATTRIBUTES.contains(&name.as_str()) && !self.schema.is_hidden(name)
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let mut document = json!({
            "id": self.id,
            "type": self.schema.resource_type,
            "attributes": attributes,
        });

        let links = self.relationship_linkage();
        if !links.is_empty() {
            document["links"] = Value::Object(links);
        }
        document
    }

    fn relationship_linkage(&self) -> Map<String, Value> {
        let mut links = Map::new();
        for (name, related) in &self.relations {
            if self.schema.is_hidden(name) {
                continue;
            }
            match related {
                Related::One(Some(record)) if !record.schema.pivot => {
                    links.insert(name.clone(), json!({ "linkage": record.linkage() }));
                }
                Related::One(_) => {}
                Related::Many(records) => {
                    if records.iter().any(|r| r.schema.pivot) {
                        continue;
                    }
                    let linkage: Vec<Value> = records.iter().map(Record::linkage).collect();
                    links.insert(pluralize(name), json!({ "linkage": linkage }));
                }
            }
        }
        links
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

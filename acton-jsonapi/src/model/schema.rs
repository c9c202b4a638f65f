//! Static description of a resource model
//!
//! A [`ModelSchema`] is shared by every [`Record`](super::Record) of one model
//! class. It fixes the resource type, the relations the model declares, which
//! of them are exposed by default, and which names never leave the server.

/// Cardinality of a declared relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// At most one related record; stored as a foreign key on the owner
    ToOne,
    /// Any number of related records; stored as memberships
    ToMany,
}

/// How a relation is materialised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelationSource {
    /// A direct association loaded through the store
    #[default]
    Association,
    /// A value produced by the resource handler
    Computed,
}

/// A relation declared on a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    /// Relation name as it appears in `include` and `links`
    pub name: String,
    /// Cardinality
    pub kind: RelationKind,
    /// Resource type of the related records
    pub related_type: String,
    /// Owner attribute holding the related key (to-one associations only)
    pub foreign_key: Option<String>,
    /// Association or computed accessor
    pub source: RelationSource,
}

impl RelationDef {
    /// Declare a to-one association
    ///
    /// The foreign key defaults to `<name>_id`.
    pub fn to_one(name: impl Into<String>, related_type: impl Into<String>) -> Self {
        let name = name.into();
        let foreign_key = format!("{}_id", name);
        Self {
            name,
            kind: RelationKind::ToOne,
            related_type: related_type.into(),
            foreign_key: Some(foreign_key),
            source: RelationSource::Association,
        }
    }

    /// Declare a to-many association
    pub fn to_many(name: impl Into<String>, related_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RelationKind::ToMany,
            related_type: related_type.into(),
            foreign_key: None,
            source: RelationSource::Association,
        }
    }

    /// Override the foreign key column of a to-one association
    #[must_use]
    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    /// Mark the relation as produced by a computed accessor
    #[must_use]
    pub fn computed(mut self) -> Self {
        self.source = RelationSource::Computed;
        self
    }

    /// Whether the relation is produced by a computed accessor
    pub fn is_computed(&self) -> bool {
        self.source == RelationSource::Computed
    }
}

/// Per-model metadata shared by all records of the model
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::model::{ModelSchema, RelationDef};
///
/// let schema = ModelSchema::for_table("article")
///     .with_relation(RelationDef::to_one("author", "people"))
///     .with_relation(RelationDef::to_many("comments", "comments"))
///     .with_default_relation("author")
///     .hide("internal_notes");
///
/// assert_eq!(schema.resource_type, "articles");
/// assert!(schema.is_hidden("internal_notes"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    /// JSON:API type string
    pub resource_type: String,
    /// Attribute and relation names excluded from serialization
    pub hidden: Vec<String>,
    /// Relations exposed when the client does not ask for any
    pub default_relations: Vec<String>,
    /// Declared relations
    pub relations: Vec<RelationDef>,
    /// Whether the store maintains `created_at` / `updated_at`
    pub timestamps: bool,
    /// Junction records are never emitted as relationship linkage
    pub pivot: bool,
}

impl ModelSchema {
    /// Create a schema with an explicit resource type
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            hidden: Vec::new(),
            default_relations: Vec::new(),
            relations: Vec::new(),
            timestamps: false,
            pivot: false,
        }
    }

    /// Create a schema whose resource type is the pluralized table name
    pub fn for_table(table: &str) -> Self {
        Self::new(pluralize(table))
    }

    /// Declare a relation
    #[must_use]
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    /// Expose a relation by default
    #[must_use]
    pub fn with_default_relation(mut self, name: impl Into<String>) -> Self {
        self.default_relations.push(name.into());
        self
    }

    /// Hide an attribute or relation from serialization
    #[must_use]
    pub fn hide(mut self, name: impl Into<String>) -> Self {
        self.hidden.push(name.into());
        self
    }

    /// Enable `created_at` / `updated_at` maintenance; both are hidden
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self.hidden.push("created_at".to_string());
        self.hidden.push("updated_at".to_string());
        self
    }

    /// Mark the model as a junction (pivot) model
    #[must_use]
    pub fn pivot(mut self) -> Self {
        self.pivot = true;
        self
    }

    /// Look up a declared relation by name
    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Whether a name is hidden from serialization
    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.iter().any(|h| h == name)
    }
}

/// English plural of a lowercase identifier
///
/// Covers the regular forms used for table and relation names; words that
/// already end in `s` are returned unchanged.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || word.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{}ies", stem);
        }
    }
    if word.ends_with('x') || word.ends_with('z') || word.ends_with("ch") || word.ends_with("sh")
    {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

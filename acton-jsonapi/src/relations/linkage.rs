//! Persistence of relationship linkage
//!
//! Linkage is resolved completely before anything is written: every relation
//! must be declared, every entry must name the declared related type, and
//! every referenced record must exist. Only then are to-one associations set
//! on the owner (before its save) and to-many memberships written (after it).

use std::collections::BTreeMap;

use crate::handlers::{codes, JsonApiError};
use crate::model::{pluralize, ModelSchema, Record, RelationDef, RelationKind, Related};
use crate::repository::ResourceStore;
use crate::request::Linkage;

/// How to-many linkage is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Add the listed members, keeping existing ones
    Attach,
    /// Make the listed members the complete membership
    Sync,
}

/// Linkage resolved against the schema and the store
#[derive(Debug, Clone, Default)]
pub struct LinkagePlan {
    to_one: Vec<(RelationDef, Record)>,
    to_many: Vec<(RelationDef, Vec<Record>)>,
}

impl LinkagePlan {
    /// Foreign key columns the to-one linkage writes
    pub fn requested_columns(&self) -> Vec<&str> {
        self.to_one
            .iter()
            .filter_map(|(relation, _)| relation.foreign_key.as_deref())
            .collect()
    }
}

/// Resolve parsed linkage for a model
///
/// Keys may use the relation name or, for to-many relations, its plural.
pub async fn resolve_linkage<S: ResourceStore>(
    store: &S,
    schema: &ModelSchema,
    links: BTreeMap<String, Linkage>,
) -> Result<LinkagePlan, JsonApiError> {
    let mut plan = LinkagePlan::default();

    for (key, linkage) in links {
        let relation = declared_relation(schema, &key)?;
        let cardinality_matches = match relation.kind {
            RelationKind::ToOne => linkage.is_to_one(),
            RelationKind::ToMany => linkage.is_to_many(),
        };
        if !cardinality_matches {
            return Err(JsonApiError::bad_request(
                codes::INVALID_ATTRS,
                "Linkage item is malformed",
            )
            .with_description(format!(
                "Relationship '{}' does not accept this linkage shape",
                key
            )));
        }

        let mut related = Vec::with_capacity(linkage.identifiers().len());
        for identifier in linkage.identifiers() {
            if identifier.resource_type != relation.related_type {
                return Err(JsonApiError::conflict("Linkage type mismatch").with_description(
                    format!(
                        "Relationship '{}' links '{}' resources, not '{}'",
                        key, relation.related_type, identifier.resource_type
                    ),
                ));
            }
            let record = store
                .find(&relation.related_type, &identifier.id)
                .await?
                .ok_or_else(|| JsonApiError::not_found(&relation.related_type, &identifier.id))?;
            related.push(record);
        }

        match relation.kind {
            RelationKind::ToOne => {
                if let Some(record) = related.pop() {
                    plan.to_one.push((relation.clone(), record));
                }
            }
            RelationKind::ToMany => plan.to_many.push((relation.clone(), related)),
        }
    }

    Ok(plan)
}

fn declared_relation<'s>(schema: &'s ModelSchema, key: &str) -> Result<&'s RelationDef, JsonApiError> {
    let relation = schema
        .relations
        .iter()
        .find(|r| r.name == key)
        .or_else(|| {
            schema
                .relations
                .iter()
                .find(|r| r.kind == RelationKind::ToMany && pluralize(&r.name) == key)
        })
        .ok_or_else(|| {
            JsonApiError::bad_request(codes::INVALID_ATTRS, "Unknown relationship").with_description(
                format!("'{}' has no relationship named '{}'", schema.resource_type, key),
            )
        })?;

    if relation.is_computed() {
        return Err(
            JsonApiError::bad_request(codes::INVALID_ATTRS, "Relationship is read-only")
                .with_description(format!("'{}' is computed and cannot be linked", key)),
        );
    }
    Ok(relation)
}

/// Associate to-one linkage on the owner; persisted by the owner's save
pub fn save_to_one_links(record: &mut Record, plan: &LinkagePlan) {
    for (relation, related) in &plan.to_one {
        record.associate(relation, related.clone());
    }
}

/// Write to-many linkage for a saved owner
pub async fn save_to_many_links<S: ResourceStore>(
    store: &S,
    record: &mut Record,
    plan: &LinkagePlan,
    mode: LinkMode,
) -> Result<(), JsonApiError> {
    for (relation, related) in &plan.to_many {
        let ids: Vec<String> = related
            .iter()
            .filter_map(|r| r.id().map(str::to_string))
            .collect();
        match mode {
            LinkMode::Attach => store.attach(record, relation, &ids).await?,
            LinkMode::Sync => {
                store.sync(record, relation, &ids).await?;
                record.set_relation(relation.name.clone(), Related::Many(related.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ErrorKind;
    use crate::repository::MemoryStore;
    use crate::request::ResourceIdentifier;
    use std::sync::Arc;

    fn article_schema() -> ModelSchema {
        ModelSchema::new("articles")
            .with_relation(RelationDef::to_one("author", "people"))
            .with_relation(RelationDef::to_many("tag", "tags"))
            .with_relation(RelationDef::to_many("score", "scores").computed())
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new()
            .with_schema(article_schema())
            .with_schema(ModelSchema::new("people"))
            .with_schema(ModelSchema::new("tags"));
        for (resource_type, count) in [("people", 2), ("tags", 3)] {
            let schema = store.schema(resource_type).unwrap();
            for _ in 0..count {
                store.save(&mut Record::new(Arc::clone(&schema))).await.unwrap();
            }
        }
        store
    }

    fn links(entries: Vec<(&str, Linkage)>) -> BTreeMap<String, Linkage> {
        entries
            .into_iter()
            .map(|(key, linkage)| (key.to_string(), linkage))
            .collect()
    }

    fn tags(ids: &[&str]) -> Linkage {
        Linkage::Many(ids.iter().map(|id| ResourceIdentifier::new("tags", *id)).collect())
    }

    #[tokio::test]
    async fn test_resolve_and_save() {
        let store = seeded_store().await;
        let schema = store.schema("articles").unwrap();
        let plan = resolve_linkage(
            &store,
            &schema,
            links(vec![
                ("author", Linkage::One(ResourceIdentifier::new("people", "2"))),
                ("tags", tags(&["1", "3"])),
            ]),
        )
        .await
        .unwrap();
        assert_eq!(plan.requested_columns(), ["author_id"]);

        let mut article = Record::new(schema);
        save_to_one_links(&mut article, &plan);
        assert_eq!(article.attribute("author_id"), Some(&"2".into()));

        store.save(&mut article).await.unwrap();
        save_to_many_links(&store, &mut article, &plan, LinkMode::Attach)
            .await
            .unwrap();
        assert_eq!(store.members(&article, "tag").await, ["1", "3"]);
    }

    #[tokio::test]
    async fn test_sync_replaces_and_attach_adds() {
        let store = seeded_store().await;
        let schema = store.schema("articles").unwrap();
        let mut article = Record::new(Arc::clone(&schema));
        store.save(&mut article).await.unwrap();

        let first = resolve_linkage(&store, &schema, links(vec![("tag", tags(&["1", "2"]))]))
            .await
            .unwrap();
        save_to_many_links(&store, &mut article, &first, LinkMode::Attach)
            .await
            .unwrap();

        let second = resolve_linkage(&store, &schema, links(vec![("tag", tags(&["3"]))]))
            .await
            .unwrap();
        save_to_many_links(&store, &mut article, &second, LinkMode::Attach)
            .await
            .unwrap();
        assert_eq!(store.members(&article, "tag").await, ["1", "2", "3"]);

        save_to_many_links(&store, &mut article, &first, LinkMode::Sync)
            .await
            .unwrap();
        assert_eq!(store.members(&article, "tag").await, ["1", "2"]);
        assert_eq!(
            article.relation("tag").map(|r| r.records().len()),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_resolution_failures() {
        let store = seeded_store().await;
        let schema = store.schema("articles").unwrap();

        let unknown = resolve_linkage(&store, &schema, links(vec![("editor", tags(&[]))]))
            .await
            .unwrap_err();
        assert_eq!(unknown.kind, ErrorKind::BadRequest);
        assert_eq!(unknown.title, "Unknown relationship");

        let wrong_type = resolve_linkage(
            &store,
            &schema,
            links(vec![("author", Linkage::One(ResourceIdentifier::new("tags", "1")))]),
        )
        .await
        .unwrap_err();
        assert_eq!(wrong_type.kind, ErrorKind::Conflict);

        let wrong_shape = resolve_linkage(&store, &schema, links(vec![("author", tags(&["1"]))]))
            .await
            .unwrap_err();
        assert_eq!(wrong_shape.title, "Linkage item is malformed");

        let missing = resolve_linkage(&store, &schema, links(vec![("tags", tags(&["1", "42"]))]))
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
        assert_eq!(missing.code, codes::UNKNOWN_ID);

        let computed = resolve_linkage(&store, &schema, links(vec![("score", Linkage::Many(vec![]))]))
            .await
            .unwrap_err();
        assert_eq!(computed.title, "Relationship is read-only");
    }
}

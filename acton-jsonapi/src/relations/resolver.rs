//! Relation exposure, loading and included-set collection

use std::collections::HashSet;
use std::sync::Arc;

use crate::handlers::{JsonApiError, ResourceHandler};
use crate::model::Record;
use crate::repository::ResourceStore;
use crate::request::RequestContext;

/// Resolves relations for the records of one response
pub struct RelationshipResolver<'a, H: ?Sized> {
    handler: &'a H,
}

impl<'a, H: ResourceHandler + ?Sized> RelationshipResolver<'a, H> {
    pub fn new(handler: &'a H) -> Self {
        Self { handler }
    }

    /// Relations eligible for inclusion on `record`
    ///
    /// The handler's exposed relations, narrowed to the request's `include`
    /// list, or to the record's default relations when nothing was requested.
    /// Keeps the handler's declaration order.
    pub fn exposed_relations_for(&self, record: &Record, ctx: &RequestContext) -> Vec<String> {
        let wanted = if ctx.include.is_empty() {
            &record.schema().default_relations
        } else {
            &ctx.include
        };
        self.handler
            .config()
            .exposed_relations
            .iter()
            .filter(|relation| wanted.contains(*relation))
            .cloned()
            .collect()
    }

    /// Record the eligible relations on every record
    pub fn expose_relations(&self, records: &mut [Record], ctx: &RequestContext) {
        for record in records.iter_mut() {
            let exposed = self.exposed_relations_for(record, ctx);
            record.set_exposed_relations(exposed);
        }
    }

    /// Requested includes the handler does not expose
    pub fn unknown_relations_from_request(&self, ctx: &RequestContext) -> Vec<String> {
        let config = self.handler.config();
        ctx.include
            .iter()
            .filter(|relation| !config.exposes(relation))
            .cloned()
            .collect()
    }

    /// Load every exposed or default relation not loaded yet
    ///
    /// Computed relations come from the handler, associations from the
    /// store. Names the schema does not declare are skipped.
    pub async fn load_related_models(&self, records: &mut [Record]) -> Result<(), JsonApiError> {
        for record in records.iter_mut() {
            let schema = Arc::clone(record.schema());
            let mut names: Vec<String> = Vec::new();
            for name in record
                .exposed_relations()
                .iter()
                .chain(&schema.default_relations)
            {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }

            for name in names {
                if record.relation_loaded(&name) {
                    continue;
                }
                let Some(relation) = schema.relation(&name) else {
                    tracing::warn!(
                        resource_type = %schema.resource_type,
                        relation = %name,
                        "Exposed relation is not declared on the model"
                    );
                    continue;
                };
                let related = if relation.is_computed() {
                    self.handler.compute_relation(record, relation).await?
                } else {
                    self.handler.store().load_relation(record, relation).await?
                };
                record.set_relation(name, related);
            }
        }
        Ok(())
    }

    /// Related records of every exposed relation, one entry per `(type, id)`
    ///
    /// Order follows first occurrence. Hidden relations contribute nothing.
    pub fn included_models(&self, records: &[Record]) -> Vec<Record> {
        let mut seen = HashSet::new();
        let mut included = Vec::new();
        for record in records {
            for name in record.exposed_relations() {
                if record.schema().is_hidden(name) {
                    continue;
                }
                let Some(related) = record.relation(name) else {
                    continue;
                };
                for candidate in related.records() {
                    if let Some(identity) = candidate.identity() {
                        if seen.insert(identity) {
                            included.push(candidate.clone());
                        }
                    }
                }
            }
        }
        included
    }
}

//! Default CRUD operations
//!
//! Each function implements one operation in terms of the handler's store,
//! schema and validator. They back the [`ResourceHandler`] default methods and
//! stay callable from a handler's own override.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::error::{codes, JsonApiError};
use super::traits::{HandlerResult, Outcome, Page, ResourceHandler};
use crate::document::PaginationMeta;
use crate::model::Record;
use crate::relations::{resolve_linkage, save_to_many_links, save_to_one_links, LinkMode};
use crate::repository::{FilterCondition, Pagination, ResourceQuery, ResourceStore};
use crate::request::RequestContext;

/// Fetch one record by route key, or a filtered, sorted, optionally paged list
///
/// The total for pagination is counted from the filtered query before any
/// sort is applied.
pub async fn handle_get_default<H: ResourceHandler + ?Sized>(
    handler: &H,
    ctx: &RequestContext,
) -> HandlerResult {
    let store = handler.store();
    let resource_type = handler.schema().resource_type.as_str();

    if let Some(id) = ctx.id.as_deref() {
        return Ok(store.find(resource_type, id).await?.map(Outcome::Record));
    }

    let mut query = ResourceQuery::new(resource_type);
    for (column, value) in &ctx.filter {
        query = query.filter(FilterCondition::eq(column.as_str(), value.as_str()));
    }

    let total = match ctx.page {
        Some(_) => Some(store.count(&query).await?),
        None => None,
    };

    for spec in &ctx.sort {
        query = query.sort_by(spec.clone());
    }

    match (ctx.page, total) {
        (Some(page), Some(total)) => {
            let query = query.paginate(Pagination::page(
                u64::from(page.number),
                u64::from(page.size),
            ));
            let records = store.fetch(&query).await?;
            Ok(Some(Outcome::Page(Page {
                records,
                meta: PaginationMeta::new(page.number, page.size, total),
            })))
        }
        _ => Ok(Some(Outcome::Collection(store.fetch(&query).await?))),
    }
}

/// Create a record from the payload
///
/// To-one linkage is associated before the save, to-many linkage attached
/// after it.
pub async fn handle_post_default<H: ResourceHandler + ?Sized>(
    handler: &H,
    ctx: &RequestContext,
) -> HandlerResult {
    if ctx.id.is_some() {
        return Err(JsonApiError::bad_request(
            codes::ID_PROVIDED_NOT_ALLOWED,
            "ID provided but not allowed",
        )
        .with_description("Records are created at the collection URL"));
    }

    let store = handler.store();
    let schema = handler.schema();
    let attributes = ctx.parse_data(&schema.resource_type)?;
    handler
        .validator()
        .validate(&schema.resource_type, &attributes)
        .map_err(JsonApiError::validation_failed)?;

    let mut record = Record::new(Arc::clone(schema));
    record.fill(&attributes);

    let links = ctx.parse_links()?;
    let plan = resolve_linkage(store, schema, links).await?;
    save_to_one_links(&mut record, &plan);

    store.save(&mut record).await?;
    save_to_many_links(store, &mut record, &plan, LinkMode::Attach).await?;

    Ok(Some(Outcome::Record(record)))
}

/// Update the record addressed by the route key
///
/// To-many linkage replaces the existing membership. The outcome is marked
/// changed when the saved attributes differ from what the payload sent, or
/// from the originals where the payload sent nothing.
pub async fn handle_put_default<H: ResourceHandler + ?Sized>(
    handler: &H,
    ctx: &RequestContext,
) -> HandlerResult {
    let Some(id) = ctx.id.as_deref() else {
        return Err(JsonApiError::no_id());
    };

    let store = handler.store();
    let schema = handler.schema();
    let updates = ctx.parse_data(&schema.resource_type)?;
    let links = ctx.parse_links()?;

    let Some(mut record) = store.find(&schema.resource_type, id).await? else {
        return Ok(None);
    };
    let plan = resolve_linkage(store, schema, links).await?;

    let original = record.attributes().clone();
    record.fill(&updates);
    save_to_one_links(&mut record, &plan);

    store.save(&mut record).await?;
    save_to_many_links(store, &mut record, &plan, LinkMode::Sync).await?;

    let changed = changed_beyond_request(
        &original,
        record.attributes(),
        &updates,
        &plan.requested_columns(),
    );
    Ok(Some(Outcome::Updated { record, changed }))
}

/// Delete the record addressed by the route key
pub async fn handle_delete_default<H: ResourceHandler + ?Sized>(
    handler: &H,
    ctx: &RequestContext,
) -> HandlerResult {
    let Some(id) = ctx.id.as_deref() else {
        return Err(JsonApiError::no_id());
    };

    let store = handler.store();
    let Some(record) = store.find(&handler.schema().resource_type, id).await? else {
        return Ok(None);
    };
    store.delete(&record).await?;

    Ok(Some(Outcome::Record(record)))
}

fn changed_beyond_request(
    original: &Map<String, Value>,
    saved: &Map<String, Value>,
    requested: &Map<String, Value>,
    linked_columns: &[&str],
) -> bool {
    saved.iter().any(|(name, value)| {
        if linked_columns.contains(&name.as_str()) {
            return false;
        }
        match requested.get(name) {
            Some(sent) => sent != value,
            None => original.get(name) != Some(value),
        }
    })
}

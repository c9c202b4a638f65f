//! Request dispatch
//!
//! The [`Dispatcher`] is the single catch boundary of the pipeline: it maps
//! the method to an operation, parses the request, runs the handler, shapes
//! the response document, and renders any [`JsonApiError`] under the
//! resource's error scope.

use axum::http::StatusCode;
use tracing::Instrument;

use super::config::Operation;
use super::error::{codes, JsonApiError};
use super::traits::{Outcome, ResourceHandler};
use crate::config::JsonApiConfig;
use crate::document::{ErrorObject, PaginationLinks, PaginationMeta, ResponseDocument};
use crate::model::Record;
use crate::relations::RelationshipResolver;
use crate::request::{ApiRequest, RequestContext};

/// Drives one resource handler
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::handlers::{Dispatcher, ResourceConfig, StandardHandler};
/// use acton_jsonapi::model::ModelSchema;
/// use acton_jsonapi::repository::MemoryStore;
/// use acton_jsonapi::request::IncomingRequest;
/// use axum::http::{Method, StatusCode, Uri};
/// use std::sync::Arc;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = Arc::new(MemoryStore::new().with_schema(ModelSchema::new("tags")));
/// let handler = StandardHandler::new(store, ResourceConfig::new("tags")).unwrap();
/// let dispatcher = Dispatcher::new(handler);
///
/// let uri: Uri = "/tags".parse().unwrap();
/// let request = IncomingRequest::new(Method::GET, &uri).unwrap();
/// let document = dispatcher.dispatch(&request).await;
///
/// assert_eq!(document.status(), StatusCode::OK);
/// assert_eq!(document.to_json()["data"], serde_json::json!([]));
/// # });
/// ```
pub struct Dispatcher<H> {
    handler: H,
    settings: JsonApiConfig,
}

impl<H: ResourceHandler> Dispatcher<H> {
    /// Dispatcher with default settings
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            settings: JsonApiConfig::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: JsonApiConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn resource_type(&self) -> &str {
        &self.handler.config().resource_type
    }

    /// Serve one request; failures become error documents
    pub async fn dispatch<R: ApiRequest + Sync + ?Sized>(&self, request: &R) -> ResponseDocument {
        let config = self.handler.config();
        let span = tracing::info_span!(
            "jsonapi_request",
            method = %request.method(),
            resource_type = %config.resource_type,
            id = request.resource_id().unwrap_or_default(),
        );

        async {
            match self.run(request).await {
                Ok(document) => {
                    tracing::debug!(status = document.status().as_u16(), "Request served");
                    document
                }
                Err(error) => {
                    if error.status().is_server_error() {
                        tracing::error!(code = error.code, detail = ?error.detail, "{}", error);
                    } else {
                        tracing::info!(code = error.code, "{}", error);
                    }
                    error.into_document(config.error_scope)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run<R: ApiRequest + Sync + ?Sized>(
        &self,
        request: &R,
    ) -> Result<ResponseDocument, JsonApiError> {
        let config = self.handler.config();
        let operation = Operation::from_method(request.method())
            .filter(|operation| config.supports(*operation))
            .ok_or_else(|| JsonApiError::method_not_allowed(request.method()))?;

        let mut ctx = RequestContext::from_request(request)?;
        ctx.limit_page_size(self.settings.max_page_size);

        tracing::debug!(%operation, include = ?ctx.include, "Dispatching");
        let outcome = match operation {
            Operation::Fetch => self.handler.handle_get(&ctx).await,
            Operation::Create => self.handler.handle_post(&ctx).await,
            Operation::Update => self.handler.handle_put(&ctx).await,
            Operation::Delete => self.handler.handle_delete(&ctx).await,
        }?;

        let Some(outcome) = outcome else {
            return Err(JsonApiError::not_found(
                &config.resource_type,
                ctx.id.as_deref().unwrap_or_default(),
            ));
        };

        self.build_document(operation, &ctx, outcome).await
    }

    async fn build_document(
        &self,
        operation: Operation,
        ctx: &RequestContext,
        outcome: Outcome,
    ) -> Result<ResponseDocument, JsonApiError> {
        let (mut records, meta, single, changed): (Vec<Record>, Option<PaginationMeta>, bool, bool) =
            match outcome {
                Outcome::Record(record) => (vec![record], None, true, false),
                Outcome::Collection(records) => (records, None, false, false),
                Outcome::Page(page) => (page.records, Some(page.meta), false, false),
                Outcome::Updated { record, changed } => (vec![record], None, true, changed),
            };

        let status = operation.success_status(changed);
        if status == StatusCode::NO_CONTENT {
            return Ok(ResponseDocument::new(status));
        }

        let resolver = RelationshipResolver::new(&self.handler);
        resolver.expose_relations(&mut records, ctx);
        resolver.load_related_models(&mut records).await?;
        let included = resolver.included_models(&records);

        let mut document = ResponseDocument::with_records(status, &records);
        document.set_body_singular(single || ctx.id.is_some());
        if let Some(meta) = meta {
            document.set_links(&PaginationLinks::new(
                self.settings.base_url.as_deref(),
                &ctx.path,
                ctx.raw_query.as_deref(),
                &meta,
            ));
        }
        document.set_included(&included);

        let unknown = resolver.unknown_relations_from_request(ctx);
        if !unknown.is_empty() {
            tracing::warn!(relations = ?unknown, "Unknown relations requested");
            document.set_errors(vec![ErrorObject {
                code: self.handler.config().error_scope | codes::UNKNOWN_LINKED_RESOURCES,
                title: "Unknown linked resources requested".to_string(),
                description: Some(format!(
                    "These relationships are not available: {}",
                    unknown.join(", ")
                )),
                details: None,
            }]);
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{
        handle_get_default, HandlerResult, JsonApiError, Operation, RequiredAttributes,
        ResourceConfig, StandardHandler,
    };
    use crate::model::{ModelSchema, RelationDef, Related};
    use crate::repository::{
        MemoryStore, RepositoryOperation, RepositoryResult, ResourceQuery, ResourceStore,
    };
    use crate::request::IncomingRequest;
    use axum::http::{Method, Uri};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    const SCOPE: u32 = 256;

    async fn seeded() -> Arc<MemoryStore> {
        let store = MemoryStore::new()
            .with_schema(
                ModelSchema::new("articles")
                    .with_relation(RelationDef::to_one("author", "people"))
                    .with_relation(RelationDef::to_many("tag", "tags"))
                    .with_relation(RelationDef::to_one("editor", "people").computed()),
            )
            .with_schema(ModelSchema::new("people"))
            .with_schema(ModelSchema::new("tags"))
            .with_schema(ModelSchema::new("posts").with_timestamps());

        let people = store.schema("people").unwrap();
        for name in ["Ada", "Grace"] {
            let mut person = Record::new(Arc::clone(&people)).with_attribute("name", name);
            store.save(&mut person).await.unwrap();
        }
        let tags = store.schema("tags").unwrap();
        for label in ["rust", "http"] {
            let mut tag = Record::new(Arc::clone(&tags)).with_attribute("label", label);
            store.save(&mut tag).await.unwrap();
        }
        let articles = store.schema("articles").unwrap();
        for (title, author) in [("b", "1"), ("a", "1"), ("c", "2")] {
            let mut article = Record::new(Arc::clone(&articles))
                .with_attribute("title", title)
                .with_attribute("author_id", author);
            store.save(&mut article).await.unwrap();
        }
        Arc::new(store)
    }

    fn articles(store: Arc<MemoryStore>) -> Dispatcher<StandardHandler<MemoryStore>> {
        let config = ResourceConfig::new("articles")
            .with_exposed_relations(["author", "tag"])
            .with_error_scope(SCOPE);
        Dispatcher::new(StandardHandler::new(store, config).unwrap())
    }

    fn request(method: Method, uri: &str) -> IncomingRequest {
        let uri: Uri = uri.parse().unwrap();
        IncomingRequest::new(method, &uri).unwrap()
    }

    fn titles(document: &Value) -> Vec<String> {
        document["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["attributes"]["title"].as_str().unwrap().to_string())
            .collect()
    }

    fn first_error(document: &Value) -> &Value {
        &document["errors"][0]
    }

    #[tokio::test]
    async fn test_fetch_collection_without_relations() {
        let dispatcher = articles(seeded().await);
        let document = dispatcher.dispatch(&request(Method::GET, "/articles")).await;

        assert_eq!(document.status(), StatusCode::OK);
        let body = document.to_json();
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert!(body["data"][0].get("links").is_none());
        assert!(body.get("included").is_none());
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_fetch_one_is_singular() {
        let dispatcher = articles(seeded().await);
        let body = dispatcher
            .dispatch(&request(Method::GET, "/articles/2").with_id("2"))
            .await
            .to_json();

        assert_eq!(body["data"]["id"], "2");
        assert_eq!(body["data"]["type"], "articles");
        assert_eq!(body["data"]["attributes"]["title"], "a");
    }

    #[tokio::test]
    async fn test_missing_record_is_scoped_not_found() {
        let dispatcher = articles(seeded().await);
        let document = dispatcher
            .dispatch(&request(Method::GET, "/articles/99").with_id("99"))
            .await;

        assert_eq!(document.status(), StatusCode::NOT_FOUND);
        assert_eq!(first_error(&document.to_json())["code"], SCOPE | codes::UNKNOWN_ID);
    }

    #[tokio::test]
    async fn test_sort_and_filter() {
        let dispatcher = articles(seeded().await);
        let body = dispatcher
            .dispatch(&request(
                Method::GET,
                "/articles?sort=-title&filter%5Bauthor_id%5D=1",
            ))
            .await
            .to_json();
        assert_eq!(titles(&body), ["b", "a"]);

        let body = dispatcher
            .dispatch(&request(Method::GET, "/articles?sort=%2Btitle"))
            .await
            .to_json();
        assert_eq!(titles(&body), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_sort_without_direction_runs_no_query() {
        let store = seeded().await;
        store.fail_on(RepositoryOperation::Query).await;
        let dispatcher = articles(Arc::clone(&store));

        let document = dispatcher
            .dispatch(&request(Method::GET, "/articles?sort=title"))
            .await;

        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
        let body = document.to_json();
        assert_eq!(first_error(&body)["title"], "Sort direction not specified");
        assert_eq!(first_error(&body)["code"], SCOPE | codes::INVALID_ATTRS);
    }

    #[tokio::test]
    async fn test_partial_page_is_rejected() {
        let dispatcher = articles(seeded().await);
        let document = dispatcher
            .dispatch(&request(Method::GET, "/articles?page%5Bnumber%5D=1"))
            .await;
        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_paged_fetch_links() {
        let dispatcher = articles(seeded().await);
        let body = dispatcher
            .dispatch(&request(
                Method::GET,
                "/articles?sort=%2Btitle&page%5Bnumber%5D=2&page%5Bsize%5D=1",
            ))
            .await
            .to_json();

        assert_eq!(titles(&body), ["b"]);
        let links = &body["links"];
        assert_eq!(links["self"], "/articles?sort=%2Btitle&page[number]=2&page[size]=1");
        assert_eq!(links["first"], "/articles?sort=%2Btitle&page[number]=1&page[size]=1");
        assert_eq!(links["last"], "/articles?sort=%2Btitle&page[number]=3&page[size]=1");
        assert_eq!(links["prev"], "/articles?sort=%2Btitle&page[number]=1&page[size]=1");
        assert_eq!(links["next"], "/articles?sort=%2Btitle&page[number]=3&page[size]=1");
    }

    #[tokio::test]
    async fn test_page_size_is_capped_and_base_url_applied() {
        let settings = JsonApiConfig {
            base_url: Some("https://api.example.com/".to_string()),
            max_page_size: 2,
        };
        let dispatcher = articles(seeded().await).with_settings(settings);
        let body = dispatcher
            .dispatch(&request(
                Method::GET,
                "/articles?page%5Bnumber%5D=1&page%5Bsize%5D=50",
            ))
            .await
            .to_json();

        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(
            body["links"]["last"],
            "https://api.example.com/articles?page[number]=2&page[size]=2"
        );
        assert_eq!(body["links"].get("prev"), Some(&Value::Null));
        assert_eq!(
            body["links"]["next"],
            "https://api.example.com/articles?page[number]=2&page[size]=2"
        );
    }

    #[tokio::test]
    async fn test_included_records_are_deduplicated() {
        let dispatcher = articles(seeded().await);
        let body = dispatcher
            .dispatch(&request(Method::GET, "/articles?include=author"))
            .await
            .to_json();

        let included = body["included"].as_array().unwrap();
        assert_eq!(included.len(), 2);
        assert!(included.iter().all(|person| person["type"] == "people"));
        assert_eq!(body["data"][1]["links"]["author"]["linkage"]["id"], "1");
    }

    #[tokio::test]
    async fn test_unknown_include_is_not_fatal() {
        let dispatcher = articles(seeded().await);
        let document = dispatcher
            .dispatch(&request(Method::GET, "/articles?include=author,comments"))
            .await;

        assert_eq!(document.status(), StatusCode::OK);
        let body = document.to_json();
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(
            first_error(&body)["code"],
            SCOPE | codes::UNKNOWN_LINKED_RESOURCES
        );
        assert!(first_error(&body)["description"]
            .as_str()
            .unwrap()
            .contains("comments"));
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let store = seeded().await;
        let dispatcher = articles(Arc::clone(&store));
        let payload = json!({
            "data": {
                "type": "articles",
                "id": "77",
                "attributes": {"title": "new"},
                "links": {
                    "author": {"linkage": {"type": "people", "id": "2"}},
                    "tags": {"linkage": [{"type": "tags", "id": "1"}, {"type": "tags", "id": "2"}]}
                }
            }
        });

        let document = dispatcher
            .dispatch(&request(Method::POST, "/articles").with_json(&payload))
            .await;
        assert_eq!(document.status(), StatusCode::CREATED);
        let body = document.to_json();
        assert_eq!(body["data"]["id"], "4");
        assert_eq!(body["data"]["links"]["author"]["linkage"]["id"], "2");

        let body = dispatcher
            .dispatch(&request(Method::GET, "/articles/4?include=author,tag").with_id("4"))
            .await
            .to_json();
        let attributes = body["data"]["attributes"].as_object().unwrap();
        assert_eq!(attributes["title"], "new");
        assert_eq!(attributes["author_id"], "2");
        assert!(!attributes.contains_key("id"));
        assert!(!attributes.contains_key("type"));
        assert_eq!(body["data"]["links"]["tags"]["linkage"].as_array().unwrap().len(), 2);
        assert_eq!(body["included"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_rejects_route_id() {
        let dispatcher = articles(seeded().await);
        let document = dispatcher
            .dispatch(&request(Method::POST, "/articles/1").with_id("1"))
            .await;

        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            first_error(&document.to_json())["code"],
            SCOPE | codes::ID_PROVIDED_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_create_without_data() {
        let dispatcher = articles(seeded().await);
        let document = dispatcher
            .dispatch(&request(Method::POST, "/articles").with_json(&json!({"meta": {}})))
            .await;

        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
        assert_eq!(first_error(&document.to_json())["code"], SCOPE | codes::MISSING_DATA);
    }

    #[tokio::test]
    async fn test_create_with_wrong_type_conflicts() {
        let dispatcher = articles(seeded().await);
        let payload = json!({"data": {"type": "people", "attributes": {"title": "x"}}});
        let document = dispatcher
            .dispatch(&request(Method::POST, "/articles").with_json(&payload))
            .await;
        assert_eq!(document.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_malformed_linkage_creates_nothing() {
        let store = seeded().await;
        let dispatcher = articles(Arc::clone(&store));
        let payload = json!({
            "data": {
                "type": "articles",
                "attributes": {"title": "x"},
                "links": {"author": {"linkage": [{"type": "people", "id": "1"}]}}
            }
        });

        let document = dispatcher
            .dispatch(&request(Method::POST, "/articles").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.len("articles").await, 3);
    }

    #[tokio::test]
    async fn test_linkage_to_missing_record() {
        let store = seeded().await;
        let dispatcher = articles(Arc::clone(&store));
        let payload = json!({
            "data": {
                "type": "articles",
                "attributes": {"title": "x"},
                "links": {"author": {"linkage": {"type": "people", "id": "9"}}}
            }
        });

        let document = dispatcher
            .dispatch(&request(Method::POST, "/articles").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.len("articles").await, 3);
    }

    #[tokio::test]
    async fn test_validation_errors_per_field() {
        let store = seeded().await;
        let config = ResourceConfig::new("articles").with_error_scope(SCOPE);
        let handler = StandardHandler::new(Arc::clone(&store), config)
            .unwrap()
            .with_validator(RequiredAttributes::new(["title", "body"]));
        let dispatcher = Dispatcher::new(handler);

        let payload = json!({"data": {"type": "articles", "attributes": {"title": null}}});
        let document = dispatcher
            .dispatch(&request(Method::POST, "/articles").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
        let body = document.to_json();
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["details"]["attribute"], "body");
        assert_eq!(errors[1]["description"], "The title field is required.");
        assert!(errors.iter().all(|e| e["code"] == SCOPE | codes::INVALID_ATTRS));
        assert_eq!(store.len("articles").await, 3);
    }

    #[tokio::test]
    async fn test_update_without_side_effects_is_no_content() {
        let store = seeded().await;
        let dispatcher = articles(Arc::clone(&store));
        let payload = json!({
            "data": {
                "type": "articles",
                "attributes": {"title": "z"},
                "links": {"author": {"linkage": {"type": "people", "id": "2"}}}
            }
        });

        let document = dispatcher
            .dispatch(&request(Method::PUT, "/articles/1").with_id("1").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::NO_CONTENT);
        assert_eq!(document.to_json(), json!({}));
        let saved = store.find("articles", "1").await.unwrap().unwrap();
        assert_eq!(saved.attribute("title"), Some(&json!("z")));
        assert_eq!(saved.attribute("author_id"), Some(&json!("2")));
    }

    #[tokio::test]
    async fn test_update_with_side_effects_returns_record() {
        let store = seeded().await;
        let posts = store.schema("posts").unwrap();
        let mut post = Record::new(posts).with_attribute("title", "draft");
        store.save(&mut post).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let handler = StandardHandler::new(Arc::clone(&store), ResourceConfig::new("posts")).unwrap();
        let dispatcher = Dispatcher::new(handler);
        let payload = json!({"data": {"type": "posts", "attributes": {"title": "final"}}});
        let document = dispatcher
            .dispatch(&request(Method::PUT, "/posts/1").with_id("1").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::OK);
        let body = document.to_json();
        assert_eq!(body["data"]["attributes"]["title"], "final");
        assert!(body["data"]["attributes"].get("updated_at").is_none());
    }

    struct LowercaseTitles {
        inner: Arc<MemoryStore>,
    }

    impl ResourceStore for LowercaseTitles {
        async fn find(&self, resource_type: &str, id: &str) -> RepositoryResult<Option<Record>> {
            self.inner.find(resource_type, id).await
        }

        async fn fetch(&self, query: &ResourceQuery) -> RepositoryResult<Vec<Record>> {
            self.inner.fetch(query).await
        }

        async fn count(&self, query: &ResourceQuery) -> RepositoryResult<u64> {
            self.inner.count(query).await
        }

        async fn save(&self, record: &mut Record) -> RepositoryResult<()> {
            let lowered = record
                .attribute("title")
                .and_then(Value::as_str)
                .map(str::to_lowercase);
            if let Some(title) = lowered {
                record.set_attribute("title", title);
            }
            self.inner.save(record).await
        }

        async fn delete(&self, record: &Record) -> RepositoryResult<()> {
            self.inner.delete(record).await
        }

        async fn load_relation(
            &self,
            record: &Record,
            relation: &RelationDef,
        ) -> RepositoryResult<Related> {
            self.inner.load_relation(record, relation).await
        }

        async fn attach(
            &self,
            record: &Record,
            relation: &RelationDef,
            ids: &[String],
        ) -> RepositoryResult<()> {
            self.inner.attach(record, relation, ids).await
        }

        async fn sync(
            &self,
            record: &Record,
            relation: &RelationDef,
            ids: &[String],
        ) -> RepositoryResult<()> {
            self.inner.sync(record, relation, ids).await
        }
    }

    #[tokio::test]
    async fn test_update_rewritten_by_store_returns_record() {
        let store = seeded().await;
        let schema = store.schema("articles").unwrap();
        let handler = StandardHandler::with_schema(
            Arc::new(LowercaseTitles {
                inner: Arc::clone(&store),
            }),
            ResourceConfig::new("articles"),
            schema,
        );
        let dispatcher = Dispatcher::new(handler);

        let payload = json!({"data": {"type": "articles", "attributes": {"title": "LOUD"}}});
        let document = dispatcher
            .dispatch(&request(Method::PUT, "/articles/1").with_id("1").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::OK);
        assert_eq!(document.to_json()["data"]["attributes"]["title"], "loud");
        let saved = store.find("articles", "1").await.unwrap().unwrap();
        assert_eq!(saved.attribute("title"), Some(&json!("loud")));
    }

    #[tokio::test]
    async fn test_update_with_malformed_linkage_changes_nothing() {
        let store = seeded().await;
        let dispatcher = articles(Arc::clone(&store));
        let payload = json!({
            "data": {
                "type": "articles",
                "attributes": {"title": "changed"},
                "links": {"author": {"linkage": {"type": "people"}}}
            }
        });

        let document = dispatcher
            .dispatch(&request(Method::PUT, "/articles/1").with_id("1").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            first_error(&document.to_json())["code"],
            SCOPE | codes::INVALID_ATTRS
        );
        let saved = store.find("articles", "1").await.unwrap().unwrap();
        assert_eq!(saved.attribute("title"), Some(&json!("b")));
        assert_eq!(saved.attribute("author_id"), Some(&json!("1")));
    }

    #[tokio::test]
    async fn test_update_replaces_to_many_members() {
        let store = seeded().await;
        let dispatcher = articles(Arc::clone(&store));
        let record = store.find("articles", "1").await.unwrap().unwrap();
        let tag = store.schema("articles").unwrap().relation("tag").cloned().unwrap();
        store
            .attach(&record, &tag, &["1".to_string(), "2".to_string()])
            .await
            .unwrap();

        let payload = json!({
            "data": {
                "type": "articles",
                "links": {"tags": {"linkage": [{"type": "tags", "id": "2"}]}}
            }
        });
        let document = dispatcher
            .dispatch(&request(Method::PUT, "/articles/1").with_id("1").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::NO_CONTENT);
        assert_eq!(store.members(&record, "tag").await, ["2"]);
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let dispatcher = articles(seeded().await);
        let payload = json!({"data": {"type": "articles", "attributes": {"title": "z"}}});
        let document = dispatcher
            .dispatch(&request(Method::PUT, "/articles").with_json(&payload))
            .await;

        assert_eq!(document.status(), StatusCode::BAD_REQUEST);
        assert_eq!(first_error(&document.to_json())["code"], SCOPE | codes::NO_ID);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = seeded().await;
        let dispatcher = articles(Arc::clone(&store));

        let document = dispatcher
            .dispatch(&request(Method::DELETE, "/articles/2").with_id("2"))
            .await;
        assert_eq!(document.status(), StatusCode::NO_CONTENT);
        assert_eq!(store.len("articles").await, 2);

        let document = dispatcher
            .dispatch(&request(Method::DELETE, "/articles/2").with_id("2"))
            .await;
        assert_eq!(document.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_methods() {
        let store = seeded().await;
        let document = articles(Arc::clone(&store))
            .dispatch(&request(Method::PATCH, "/articles/1").with_id("1"))
            .await;
        assert_eq!(document.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            first_error(&document.to_json())["code"],
            SCOPE | codes::HTTP_METHOD_NOT_ALLOWED
        );

        let config = ResourceConfig::new("articles").with_operations([Operation::Fetch]);
        let read_only = Dispatcher::new(StandardHandler::new(store, config).unwrap());
        let document = read_only
            .dispatch(&request(Method::DELETE, "/articles/1").with_id("1"))
            .await;
        assert_eq!(document.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let store = seeded().await;
        store.fail_on(RepositoryOperation::Query).await;
        let document = articles(Arc::clone(&store))
            .dispatch(&request(Method::GET, "/articles"))
            .await;

        assert_eq!(document.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = document.to_json();
        assert_eq!(first_error(&body)["title"], "Database Request Failed");
        assert_eq!(first_error(&body)["code"], SCOPE);
    }

    struct UntitledHidden {
        inner: StandardHandler<MemoryStore>,
    }

    impl ResourceHandler for UntitledHidden {
        type Store = MemoryStore;

        fn store(&self) -> &MemoryStore {
            self.inner.store()
        }

        fn config(&self) -> &ResourceConfig {
            self.inner.config()
        }

        fn schema(&self) -> &Arc<ModelSchema> {
            self.inner.schema()
        }

        async fn compute_relation(
            &self,
            _record: &Record,
            relation: &RelationDef,
        ) -> Result<Related, JsonApiError> {
            let editor = self.store().find(&relation.related_type, "2").await?;
            Ok(Related::One(editor.map(Box::new)))
        }

        async fn handle_get(&self, ctx: &RequestContext) -> HandlerResult {
            let outcome = handle_get_default(self, ctx).await?;
            Ok(match outcome {
                Some(Outcome::Collection(records)) => Some(Outcome::Collection(
                    records
                        .into_iter()
                        .filter(|record| record.attribute("title") != Some(&json!("c")))
                        .collect(),
                )),
                other => other,
            })
        }
    }

    #[tokio::test]
    async fn test_overrides_compose_with_defaults() {
        let store = seeded().await;
        let config = ResourceConfig::new("articles").with_exposed_relations(["editor"]);
        let dispatcher = Dispatcher::new(UntitledHidden {
            inner: StandardHandler::new(store, config).unwrap(),
        });

        let body = dispatcher
            .dispatch(&request(Method::GET, "/articles?include=editor&sort=%2Btitle"))
            .await
            .to_json();

        assert_eq!(titles(&body), ["a", "b"]);
        assert_eq!(body["data"][0]["links"]["editor"]["linkage"]["id"], "2");
        assert_eq!(body["included"].as_array().unwrap().len(), 1);
    }
}

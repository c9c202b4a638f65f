//! axum integration
//!
//! Mounts a [`Dispatcher`] at `/<type>` and `/<type>/{id}`. Every method is
//! routed to the dispatcher, which answers unsupported ones with a JSON:API
//! `405` document.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{Dispatcher, ResourceHandler};
use crate::request::IncomingRequest;

/// Router serving one resource type
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::handlers::{Dispatcher, ResourceConfig, StandardHandler};
/// use acton_jsonapi::model::ModelSchema;
/// use acton_jsonapi::repository::MemoryStore;
/// use acton_jsonapi::router::resource_router;
/// use std::sync::Arc;
///
/// let store = Arc::new(
///     MemoryStore::new()
///         .with_schema(ModelSchema::new("articles"))
///         .with_schema(ModelSchema::new("people")),
/// );
/// let articles = StandardHandler::new(Arc::clone(&store), ResourceConfig::new("articles")).unwrap();
/// let people = StandardHandler::new(store, ResourceConfig::new("people")).unwrap();
///
/// let app = resource_router(Arc::new(Dispatcher::new(articles)))
///     .merge(resource_router(Arc::new(Dispatcher::new(people))));
/// # let _: axum::Router = app;
/// ```
pub fn resource_router<H: ResourceHandler + 'static>(dispatcher: Arc<Dispatcher<H>>) -> Router {
    let collection = format!("/{}", dispatcher.resource_type());
    let member = format!("/{}/{{id}}", dispatcher.resource_type());

    Router::new()
        .route(&collection, any(serve_collection::<H>))
        .route(&member, any(serve_member::<H>))
        .with_state(dispatcher)
        .layer(TraceLayer::new_for_http())
}

async fn serve_collection<H: ResourceHandler + 'static>(
    State(dispatcher): State<Arc<Dispatcher<H>>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    serve(&dispatcher, method, &uri, None, body).await
}

async fn serve_member<H: ResourceHandler + 'static>(
    State(dispatcher): State<Arc<Dispatcher<H>>>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    serve(&dispatcher, method, &uri, Some(id), body).await
}

async fn serve<H: ResourceHandler>(
    dispatcher: &Dispatcher<H>,
    method: Method,
    uri: &Uri,
    id: Option<String>,
    body: Bytes,
) -> Response {
    let request = match IncomingRequest::new(method, uri) {
        Ok(request) => request.with_body(body),
        Err(error) => {
            return error
                .into_document(dispatcher.handler().config().error_scope)
                .into_response()
        }
    };
    let request = match id {
        Some(id) => request.with_id(id),
        None => request,
    };
    dispatcher.dispatch(&request).await.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::JSONAPI_CONTENT_TYPE;
    use crate::handlers::{ResourceConfig, StandardHandler};
    use crate::model::{ModelSchema, Record};
    use crate::repository::{MemoryStore, ResourceStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let store = MemoryStore::new().with_schema(ModelSchema::new("tags"));
        let schema = store.schema("tags").unwrap();
        let mut tag = Record::new(schema).with_attribute("label", "rust");
        store.save(&mut tag).await.unwrap();

        let config = ResourceConfig::new("tags").with_error_scope(512);
        let handler = StandardHandler::new(Arc::new(store), config).unwrap();
        resource_router(Arc::new(Dispatcher::new(handler)))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_member_route_sets_content_type() {
        let response = app()
            .await
            .oneshot(Request::get("/tags/1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            JSONAPI_CONTENT_TYPE
        );
        let body = body_json(response).await;
        assert_eq!(body["data"]["attributes"]["label"], "rust");
    }

    #[tokio::test]
    async fn test_create_through_collection_route() {
        let payload = json!({"data": {"type": "tags", "attributes": {"label": "http"}}});
        let response = app()
            .await
            .oneshot(
                Request::post("/tags")
                    .header(header::CONTENT_TYPE, JSONAPI_CONTENT_TYPE)
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["data"]["id"], "2");
    }

    #[tokio::test]
    async fn test_no_content_has_empty_body() {
        let response = app()
            .await
            .oneshot(Request::delete("/tags/1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_method_is_jsonapi_error() {
        let response = app()
            .await
            .oneshot(Request::patch("/tags/1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["code"], 512 | 16);
    }
}

//! Normalized request intent

use std::collections::BTreeMap;

use axum::{body::Bytes, http::Method};
use serde_json::{Map, Value};

use super::adapter::ApiRequest;
use super::linkage::{malformed, Linkage};
use crate::handlers::{codes, JsonApiError};
use crate::repository::{OrderDirection, SortSpec};

/// Attribute names a payload can never write
const RESERVED_MEMBERS: [&str; 3] = ["id", "type", "links"];

/// Requested page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    /// 1-indexed page number
    pub number: u32,
    /// Items per page
    pub size: u32,
}

/// Everything the handlers need to know about one request
///
/// Built once per request by [`RequestContext::from_request`]. Query
/// parameters are parsed eagerly, so a malformed sort or page spec fails
/// before any handler runs; the body is decoded lazily by
/// [`parse_data`](Self::parse_data) and [`parse_links`](Self::parse_links).
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::request::{IncomingRequest, RequestContext};
/// use acton_jsonapi::repository::OrderDirection;
/// use axum::http::{Method, Uri};
///
/// let uri: Uri = "/articles?include=author,comments&sort=-created_at,%2Btitle&filter[status]=draft&page[number]=2&page[size]=10"
///     .parse()
///     .unwrap();
/// let request = IncomingRequest::new(Method::GET, &uri).unwrap();
/// let ctx = RequestContext::from_request(&request).unwrap();
///
/// assert_eq!(ctx.include, ["author", "comments"]);
/// assert_eq!(ctx.sort[0].direction, OrderDirection::Descending);
/// assert_eq!(ctx.sort[1].column, "title");
/// assert_eq!(ctx.filter.get("status").map(String::as_str), Some("draft"));
/// assert_eq!(ctx.page.map(|p| (p.number, p.size)), Some((2, 10)));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub id: Option<String>,
    /// Requested relation names, in request order
    pub include: Vec<String>,
    /// Sort columns in precedence order
    pub sort: Vec<SortSpec>,
    /// Equality filters; never holds `sort`, `include` or page keys
    pub filter: BTreeMap<String, String>,
    pub page: Option<PageSpec>,
    pub path: String,
    pub raw_query: Option<String>,
    body: Bytes,
}

impl RequestContext {
    /// Parse a request
    pub fn from_request<R: ApiRequest + ?Sized>(request: &R) -> Result<Self, JsonApiError> {
        let mut include = Vec::new();
        let mut sort = Vec::new();
        let mut filter = BTreeMap::new();
        let mut page_params = BTreeMap::new();

        for (key, value) in request.query_pairs() {
            match key.as_str() {
                "include" => include = parse_include(value),
                "sort" => sort = parse_sort(value)?,
                _ if is_page_key(key) => {
                    page_params.insert(key.as_str(), value.as_str());
                }
                _ => {
                    filter.insert(filter_column(key).to_string(), value.clone());
                }
            }
        }

        let page = if page_params.is_empty() {
            None
        } else {
            Some(parse_page(&page_params)?)
        };

        Ok(Self {
            method: request.method().clone(),
            id: request.resource_id().map(str::to_string),
            include,
            sort,
            filter,
            page,
            path: request.path().to_string(),
            raw_query: request.raw_query().map(str::to_string),
            body: Bytes::copy_from_slice(request.body()),
        })
    }

    /// Clamp `page[size]` to `max`; 0 leaves it unbounded
    pub fn limit_page_size(&mut self, max: u32) {
        if let Some(page) = self.page.as_mut() {
            if max > 0 && page.size > max {
                page.size = max;
            }
        }
    }

    /// Raw body bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Attribute map of the payload's `data` member
    ///
    /// Requires `data.type` to equal `expected_type`. Flat members of `data`
    /// and members of a nested `data.attributes` object are merged, the
    /// nested ones winning; `id`, `type` and `links` are stripped.
    pub fn parse_data(&self, expected_type: &str) -> Result<Map<String, Value>, JsonApiError> {
        let payload: Value =
            serde_json::from_slice(&self.body).map_err(|_| JsonApiError::missing_data())?;
        let Some(Value::Object(data)) = payload.get("data") else {
            return Err(JsonApiError::missing_data());
        };

        let provided = data.get("type").and_then(Value::as_str);
        if provided != Some(expected_type) {
            return Err(JsonApiError::conflict("Resource type mismatch").with_description(
                format!(
                    "Expected resource type '{}' but the payload provided '{}'",
                    expected_type,
                    provided.unwrap_or_default()
                ),
            ));
        }

        let mut attributes = Map::new();
        let mut nested = None;
        for (name, value) in data {
            match (name.as_str(), value) {
                ("attributes", Value::Object(members)) => nested = Some(members),
                (name, _) if RESERVED_MEMBERS.contains(&name) => {}
                _ => {
                    attributes.insert(name.clone(), value.clone());
                }
            }
        }
        for (name, value) in nested.into_iter().flatten() {
            if !RESERVED_MEMBERS.contains(&name.as_str()) {
                attributes.insert(name.clone(), value.clone());
            }
        }
        Ok(attributes)
    }

    /// Linkage per relation name from `data.links.<relation>.linkage`
    ///
    /// Absent `links` yields an empty map. Any malformed entry rejects the
    /// whole payload.
    pub fn parse_links(&self) -> Result<BTreeMap<String, Linkage>, JsonApiError> {
        let Ok(payload) = serde_json::from_slice::<Value>(&self.body) else {
            return Ok(BTreeMap::new());
        };
        let links = match payload.get("data").and_then(|data| data.get("links")) {
            None | Some(Value::Null) => return Ok(BTreeMap::new()),
            Some(Value::Object(links)) => links,
            Some(_) => return Err(malformed()),
        };

        links
            .iter()
            .map(|(relation, member)| -> Result<(String, Linkage), JsonApiError> {
                let linkage = member.get("linkage").ok_or_else(malformed)?;
                Ok((relation.clone(), Linkage::from_value(linkage)?))
            })
            .collect()
    }
}

fn parse_include(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every token needs a direction sigil; an unencoded `+` arrives as a space
fn parse_sort(value: &str) -> Result<Vec<SortSpec>, JsonApiError> {
    value
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let mut chars = token.chars();
            let direction = match chars.next() {
                Some('+' | ' ') => OrderDirection::Ascending,
                Some('-') => OrderDirection::Descending,
                _ => return Err(sort_error(token)),
            };
            let column = chars.as_str().trim();
            if column.is_empty() {
                return Err(sort_error(token));
            }
            Ok(SortSpec::new(column, direction))
        })
        .collect()
}

fn sort_error(token: &str) -> JsonApiError {
    JsonApiError::bad_request(codes::INVALID_ATTRS, "Sort direction not specified")
        .with_description(format!(
            "Sort token '{}' must start with + (ascending) or - (descending)",
            token
        ))
}

fn is_page_key(key: &str) -> bool {
    key == "page" || key.starts_with("page[")
}

fn filter_column(key: &str) -> &str {
    key.strip_prefix("filter[")
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|column| !column.is_empty())
        .unwrap_or(key)
}

fn parse_page(params: &BTreeMap<&str, &str>) -> Result<PageSpec, JsonApiError> {
    let field = |name: &str| {
        params
            .get(name)
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
    };
    match (field("page[number]"), field("page[size]")) {
        (Some(number), Some(size)) => Ok(PageSpec { number, size }),
        _ => Err(
            JsonApiError::bad_request(codes::INVALID_ATTRS, "Expected page[size] and page[number]")
                .with_description("Both page[size] and page[number] must be positive integers"),
        ),
    }
}

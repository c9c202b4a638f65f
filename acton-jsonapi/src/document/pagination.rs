//! Pagination metadata and links

use serde::{Deserialize, Serialize};

/// Pagination metadata for a paged fetch
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::document::PaginationMeta;
///
/// let pagination = PaginationMeta::new(1, 20, 100);
/// assert_eq!(pagination.total_pages, 5);
/// assert!(pagination.has_next);
/// assert!(!pagination.has_prev);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
    /// Total number of items across all pages
    pub total: u64,
    /// Total number of pages; at least 1
    pub total_pages: u32,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create new pagination metadata
    ///
    /// An empty result set still has one (empty) page.
    #[must_use]
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = calculate_total_pages(total, per_page);

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

fn calculate_total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page);
    let pages = total.saturating_add(per_page).saturating_sub(1) / per_page;
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Top-level `links` of a paged collection
///
/// Every URL keeps the request's query string except its `page` parameters,
/// then appends `page[number]` and `page[size]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PaginationLinks {
    /// Build links for `meta`, addressed at `base_url` + `path`
    pub fn new(
        base_url: Option<&str>,
        path: &str,
        raw_query: Option<&str>,
        meta: &PaginationMeta,
    ) -> Self {
        let base = format!("{}{}", base_url.unwrap_or_default().trim_end_matches('/'), path);
        let preserved = preserved_query(raw_query.unwrap_or_default());
        let url = |page: u32| {
            format!(
                "{}?{}page[number]={}&page[size]={}",
                base, preserved, page, meta.per_page
            )
        };

        let self_link = url(meta.page);
        let neighbour = |exists: bool, page: u32| {
            Some(url(page)).filter(|link| exists && *link != self_link)
        };
        let prev = neighbour(meta.has_prev, meta.page.saturating_sub(1));
        let next = neighbour(meta.has_next, meta.page.saturating_add(1));

        Self {
            first: url(1),
            last: url(meta.total_pages),
            prev,
            next,
            self_link,
        }
    }
}

/// Query string without page parameters, `&`-terminated when non-empty
fn preserved_query(raw_query: &str) -> String {
    raw_query
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_page_param(pair))
        .fold(String::new(), |mut out, pair| {
            out.push_str(pair);
            out.push('&');
            out
        })
}

fn is_page_param(pair: &str) -> bool {
    let key = pair.split('=').next().unwrap_or_default().to_ascii_lowercase();
    key == "page" || key.starts_with("page[") || key.starts_with("page%5b")
}

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::{debug, warn};

use crate::table::delegate::{FetchRequest, FetchedPage, PageSource};

/// Blocking REST page source.
///
/// Issues `GET {base_url}{page_path}` with the request encoded as query
/// parameters and expects `{ "rows": [...], "totalRecords": n }` back.
#[derive(Clone)]
pub struct HttpPageSource<R> {
    base_url: String,
    page_path: String,
    client: reqwest::blocking::Client,
    _rows: PhantomData<fn() -> R>,
}

impl<R> HttpPageSource<R> {
    pub fn new(base_url: &str, page_path: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            page_path: page_path.to_string(),
            client: reqwest::blocking::Client::new(),
            _rows: PhantomData,
        }
    }

    pub fn endpoint(&self) -> String {
        if self.page_path.starts_with('/') {
            format!("{}{}", self.base_url, self.page_path)
        } else {
            format!("{}/{}", self.base_url, self.page_path)
        }
    }
}

/// Query parameters for a page request. Column filters are sent as
/// `filter[<column>]=<text>`; unset values are omitted.
pub fn query_params(request: &FetchRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("page".to_string(), request.page.to_string()),
        ("pageSize".to_string(), request.page_size.to_string()),
    ];
    if let Some(column) = &request.sort_column {
        params.push(("sortColumn".to_string(), column.clone()));
        params.push((
            "sortDirection".to_string(),
            request.sort_direction.as_str().to_string(),
        ));
    }
    if let Some(query) = &request.search_query {
        params.push(("search".to_string(), query.clone()));
    }
    for (column, text) in request.column_search.iter() {
        params.push((format!("filter[{}]", column), text.to_string()));
    }
    params
}

impl<R: DeserializeOwned> PageSource<R> for HttpPageSource<R> {
    fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage<R>> {
        let url = self.endpoint();
        debug!(target: "fetch", "GET {} page {}", url, request.page);

        let response = self
            .client
            .get(&url)
            .query(&query_params(request))
            .send()
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            warn!(target: "fetch", "{} returned {}", url, status);
            bail!("API Error ({}): {}", status, error_text);
        }

        let page: FetchedPage<R> = response
            .json()
            .with_context(|| format!("Unexpected response body from {}", url))?;
        debug!(
            target: "fetch",
            "received {} rows of {}",
            page.rows.len(),
            page.total_records
        );
        Ok(page)
    }
}

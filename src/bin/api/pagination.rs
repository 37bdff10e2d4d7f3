use axum::http::Uri;
use itertools::Itertools;
use serde::Serialize;

use super::{error::AppError, extract::QueryParams};
use crate::database::store::{Page, PageRequest};

const PAGE_PARAM: &str = "page";
const LIMIT_PARAM: &str = "limit";

#[derive(Serialize, Debug)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Page number and size requested through `?page=` and `?limit=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    request: PageRequest,
}

fn invalid_page() -> AppError {
    AppError::NotFound("Invalid page.".to_owned())
}

impl Pagination {
    pub fn from_params(params: &QueryParams, default_page_size: i64) -> Result<Self, AppError> {
        let page = match params.get(PAGE_PARAM) {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(invalid_page()),
            },
        };

        // A bad limit falls back to the default instead of failing the request
        let page_size = params
            .get(LIMIT_PARAM)
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|limit| *limit >= 1)
            .unwrap_or(default_page_size);

        let request = PageRequest::for_page(page, page_size).ok_or_else(invalid_page)?;
        Ok(Self { page, request })
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    pub fn respond<T>(&self, page: Page<T>, uri: &Uri) -> Result<Paginated<T>, AppError> {
        if page.items.is_empty() && self.page > 1 {
            return Err(invalid_page());
        }

        let next = (self.request.end() < page.total).then(|| page_link(uri, Some(self.page + 1)));
        let previous = (self.page > 1).then(|| page_link(uri, Some(self.page - 1).filter(|p| *p > 1)));

        Ok(Paginated {
            count: page.total,
            next,
            previous,
            results: page.items,
        })
    }
}

/// Rebuilds the request URI with its `page` pair replaced, or dropped for the
/// first page.
fn page_link(uri: &Uri, page: Option<i64>) -> String {
    let mut kept = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(PAGE_PARAM));

    let query = match page {
        Some(page) => kept.map(str::to_owned).chain([format!("{PAGE_PARAM}={page}")]).join("&"),
        None => kept.join("&"),
    };

    if query.is_empty() {
        uri.path().to_owned()
    } else {
        format!("{}?{}", uri.path(), query)
    }
}

//! Cursor-driven pagination over list endpoints.
//!
//! The walker keeps calling a page fetcher with the continuation token from
//! the previous page until the upstream stops returning one. A failure ends
//! the walk but keeps everything already collected.

use crate::youtube::{ApiError, ListResponse};

/// One page of results plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> From<ListResponse<T>> for Page<T> {
    fn from(response: ListResponse<T>) -> Self {
        Self {
            items: response.items,
            next_token: response.next_page_token,
        }
    }
}

/// Result of a walk: the items gathered in arrival order, and the error that
/// cut it short, if any.
#[derive(Debug)]
pub struct Walk<T> {
    pub items: Vec<T>,
    pub pages: usize,
    pub error: Option<ApiError>,
}

impl<T> Walk<T> {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Drains every page reachable from the first request.
///
/// `fetch` receives `None` for the first page and the previous page's token
/// afterwards. There is no page cap beyond what the upstream enforces.
pub fn walk<T, F>(mut fetch: F) -> Walk<T>
where
    F: FnMut(Option<&str>) -> Result<Page<T>, ApiError>,
{
    let mut items = Vec::new();
    let mut pages = 0usize;
    let mut token: Option<String> = None;

    loop {
        match fetch(token.as_deref()) {
            Ok(page) => {
                pages += 1;
                items.extend(page.items);
                // An empty token string would restart from the first page.
                match page.next_token.filter(|next| !next.is_empty()) {
                    Some(next) => token = Some(next),
                    None => {
                        return Walk {
                            items,
                            pages,
                            error: None,
                        };
                    }
                }
            }
            Err(err) => {
                tracing::warn!(
                    pages,
                    collected = items.len(),
                    error = %err,
                    "pagination aborted, keeping partial results"
                );
                return Walk {
                    items,
                    pages,
                    error: Some(err),
                };
            }
        }
    }
}

use std::future::Future;

use crate::RedmineResponse;

/// Redmine caps `limit` at 100 on listing endpoints.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = MAX_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

/// Calls `fetch_page` with offsets `0, page_size, 2 * page_size, ...` until a page comes back
/// empty, concatenating the pages in order.
///
/// Pages are fetched one after another. If a page fails, fetching stops and the items collected
/// so far are returned together with the failing status, so a partial result is never mistaken
/// for a complete one.
pub async fn fetch_all<T, F, Fut>(page_size: u32, mut fetch_page: F) -> RedmineResponse<Vec<T>>
where
    F: FnMut(Page) -> Fut,
    Fut: Future<Output = RedmineResponse<Vec<T>>>,
{
    let limit = page_size.clamp(1, MAX_PAGE_SIZE);
    let mut items = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch_page(Page { offset, limit }).await;

        if page.has_error() {
            tracing::warn!(
                offset,
                fetched = items.len(),
                status = page.status.status_code,
                "Stopped paging after a failed page"
            );
            return RedmineResponse::new(items, page.status);
        }

        if page.data.is_empty() {
            tracing::debug!(pages = offset / limit + 1, total = items.len(), "Fetched all pages");
            return RedmineResponse::new(items, page.status);
        }

        items.extend(page.data);
        offset = offset.saturating_add(limit);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use reqwest::StatusCode;

    use super::*;
    use crate::StatusResponse;

    fn page_of(offset: u32, len: usize) -> RedmineResponse<Vec<u32>> {
        RedmineResponse::new(
            (0..len as u32).map(|i| offset + i).collect(),
            StatusResponse::success(StatusCode::OK),
        )
    }

    #[tokio::test]
    async fn concatenates_pages_until_an_empty_one() {
        let sizes = [100, 100, 37, 0];
        let calls = RefCell::new(Vec::new());

        let result = fetch_all(100, |page| {
            calls.borrow_mut().push(page.offset);
            let len = sizes[(page.offset / 100) as usize];
            async move { page_of(page.offset, len) }
        })
        .await;

        assert!(!result.has_error());
        assert_eq!(result.data.len(), 237);
        assert_eq!(result.data, (0..237).collect::<Vec<u32>>());
        assert_eq!(*calls.borrow(), vec![0, 100, 200, 300]);
    }

    #[tokio::test]
    async fn empty_first_page_stops_after_one_call() {
        let mut calls = 0;

        let result = fetch_all(100, |page| {
            calls += 1;
            async move { page_of(page.offset, 0) }
        })
        .await;

        assert!(result.data.is_empty());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn failed_page_returns_partial_data_with_the_error() {
        let mut calls = 0;

        let result = fetch_all(10, |page| {
            calls += 1;
            async move {
                if page.offset == 0 {
                    page_of(0, 10)
                } else {
                    RedmineResponse::failure(StatusResponse::internal_error("boom"))
                }
            }
        })
        .await;

        assert_eq!(calls, 2);
        assert!(result.has_error());
        assert_eq!(result.data.len(), 10);
    }

    #[tokio::test]
    async fn page_size_is_clamped_to_the_redmine_maximum() {
        let mut limits = Vec::new();

        fetch_all(500, |page| {
            limits.push(page.limit);
            async move { page_of(page.offset, 0) }
        })
        .await;

        assert_eq!(limits, vec![MAX_PAGE_SIZE]);
    }
}

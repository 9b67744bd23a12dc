use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::debug;

use crate::{error::ApiError, types::Page};

use super::executor::{ApiRequest, RequestExecutor};

/// Walks a cursor-linked listing and materializes every item.
pub struct Paginator<'a> {
    executor: &'a RequestExecutor,
    page_delay: Duration,
}

impl<'a> Paginator<'a> {
    pub fn new(executor: &'a RequestExecutor, page_delay: Duration) -> Self {
        Self {
            executor,
            page_delay,
        }
    }

    /// Fetches `path` and every page linked through `next`, in order.
    ///
    /// Waits `page_delay` between two page fetches, on top of whatever
    /// spacing the scheduler applies. The first page is fetched right away.
    ///
    /// # Errors
    ///
    /// The first page that still fails after retries aborts the walk; items
    /// gathered so far are dropped.
    pub async fn collect<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut next = Some(path.to_string());
        let mut pages = 0usize;

        while let Some(cursor) = next.take() {
            if pages > 0 {
                sleep(self.page_delay).await;
            }

            let page: Page<T> = self.executor.fetch(&ApiRequest::get(cursor)).await?;
            pages += 1;
            debug!(page = pages, items = page.items.len(), total = ?page.total, "fetched page");

            items.extend(page.items);
            next = page.next.filter(|n| !n.is_empty());
        }

        Ok(items)
    }
}

//! Batched retrieval of every entity matching a filter.

use std::future::Future;

use futures_util::future::try_join_all;
use tracing::debug;

/// Number of pages needed to cover `total` items at `page_size` per page.
#[must_use]
pub fn page_count(total: u64, page_size: u32) -> u64 {
    total.div_ceil(u64::from(page_size.max(1)))
}

/// Fetch every page of `filter` concurrently.
///
/// Issues exactly `ceil(total / page_size)` calls with pages `1..=n`, and
/// returns the pages in page order. `None` or zero totals issue no requests.
/// The first failing page fails the whole batch and partial pages are dropped.
///
/// # Errors
///
/// Returns the first error produced by `fetch_page`.
pub async fn fetch_all<F, Fut, Filter, T, E>(
    fetch_page: F,
    total: Option<u64>,
    filter: &Filter,
    page_size: u32,
) -> Result<Vec<T>, E>
where
    F: Fn(&Filter, u32, u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let page_size = page_size.max(1);
    let pages = page_count(total.unwrap_or(0), page_size);
    if pages == 0 {
        return Ok(Vec::new());
    }
    let last_page = u32::try_from(pages).unwrap_or(u32::MAX);
    debug!(pages = last_page, page_size, "fetching all matching pages");
    try_join_all((1..=last_page).map(|page| fetch_page(filter, page, page_size))).await
}

//! Paginated retrieval of every parameter under a query key.

use crate::param::{Parameter, QueryKey, TypeFilter};
use crate::store::{Page, ParameterStore, StoreError};

/// Retry budget for individual page requests.
///
/// The bound stays small by default so systemic store unavailability is
/// visible quickly instead of being masked by endless retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure of a page request.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { max_retries: 1 }
    }
}

/// Fetch every parameter stored under `prefix`, following continuation
/// tokens until the store reports no more pages.
///
/// Requests descend recursively, carry the type filter server-side, and ask
/// for decryption iff the filter includes secrets. Any store failure aborts
/// the whole fetch; pages accumulated so far are discarded.
pub fn fetch_all<S: ParameterStore>(
    store: &S,
    prefix: &QueryKey,
    filter: &TypeFilter,
    retry: RetryPolicy,
) -> Result<Vec<Parameter>, StoreError> {
    let decrypt = filter.wants_decryption();
    let mut gathered = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let page = fetch_page(store, prefix, decrypt, filter, token.as_deref(), retry)?;
        pages += 1;
        gathered.extend(page.items);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    tracing::debug!(pages, parameters = gathered.len(), prefix = %prefix, "fetch complete");
    Ok(gathered)
}

fn fetch_page<S: ParameterStore>(
    store: &S,
    prefix: &QueryKey,
    decrypt: bool,
    filter: &TypeFilter,
    token: Option<&str>,
    retry: RetryPolicy,
) -> Result<Page, StoreError> {
    let mut attempt = 0u32;
    loop {
        match store.list_by_path(prefix, true, decrypt, filter, token) {
            Ok(page) => return Ok(page),
            Err(err) if attempt < retry.max_retries && err.is_retryable() => {
                attempt += 1;
                tracing::debug!(attempt, error = %err, "retrying page request");
            }
            Err(err) => return Err(err),
        }
    }
}

//! Turns an over-fetched result list into a [`CursorWindow`].
//!
//! Callers fetch `size + 1` rows; the extra row only signals that another
//! window follows and is never returned.

use crate::error::PlannerError;
use model::{
    entity::{Entity, KeyExtractor},
    pagination::{
        cursor::{CursorRequest, KeysetCursorRequest},
        window::CursorWindow,
    },
    sort::Sort,
};

pub fn has_more_elements<T>(size: usize, results: &[T]) -> bool {
    !results.is_empty() && results.len() > size
}

pub fn is_last<T>(size: usize, results: &[T]) -> bool {
    !has_more_elements(size, results)
}

fn trim<T>(size: usize, mut results: Vec<T>) -> Vec<T> {
    results.truncate(size);
    results
}

/// Builds a window without reading keys from the results.
///
/// Offset requests advance by the page size. Keyset requests are passed on
/// unchanged apart from the last flag; use [`create_keyset_window`] to advance them.
pub fn create_window<T>(request: &CursorRequest, results: Vec<T>) -> CursorWindow<T> {
    let size = request.size();
    let last = is_last(size, &results);

    let next = match request {
        CursorRequest::Offset(offset) if !last => CursorRequest::Offset(offset.next()),
        other => other.with_last(last),
    };

    CursorWindow::new(trim(size, results), request.is_first(), last, next)
}

/// Builds a window whose next request resumes after the last returned element.
pub fn create_keyset_window<T: Entity>(
    request: &KeysetCursorRequest,
    results: Vec<T>,
    extractor: &KeyExtractor,
) -> Result<CursorWindow<T>, PlannerError> {
    create_keyset_window_with_sort(request, request.sort(), results, extractor)
}

/// Like [`create_keyset_window`], extracting keys for `key_sort` (the effective
/// order of the executed query) instead of the request's own sort.
pub fn create_keyset_window_with_sort<T: Entity>(
    request: &KeysetCursorRequest,
    key_sort: &Sort,
    results: Vec<T>,
    extractor: &KeyExtractor,
) -> Result<CursorWindow<T>, PlannerError> {
    let size = request.size();
    if size == 0 {
        return Err(PlannerError::InvalidRequest(
            "page size must be greater than zero".to_string(),
        ));
    }
    let first = request.is_first();

    let next = if has_more_elements(size, &results) {
        let last_returned = &results[size - 1];
        let keys = extractor.extract(last_returned, key_sort)?;
        request.with_next(keys)
    } else {
        request.with_last(true)
    };

    let last = next.is_last();
    Ok(CursorWindow::new(
        trim(size, results),
        first,
        last,
        CursorRequest::Keyset(next),
    ))
}

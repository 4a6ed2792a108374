//! Fetches one window of a collection at a time.

use crate::{
    connectors::source::{FindRequest, FindRequestBuilder, QueryExecutor},
    error::EngineError,
};
use bson::Document;
use engine_config::settings::PagingSettings;
use model::{
    entity::KeyExtractor,
    pagination::{cursor::CursorRequest, window::CursorWindow},
    query::Query,
};
use planner::{
    query::{PagedQuery, fetch_size, plan},
    window::{create_keyset_window_with_sort, create_window},
};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Instant};
use tracing::{debug, info};

/// Plans, executes and assembles windows over a [`QueryExecutor`].
#[derive(Clone)]
pub struct WindowedFind {
    executor: Arc<dyn QueryExecutor>,
    settings: PagingSettings,
    extractor: KeyExtractor,
}

impl WindowedFind {
    pub fn new(executor: Arc<dyn QueryExecutor>, settings: PagingSettings) -> Self {
        let extractor = KeyExtractor::new(settings.id_field());
        WindowedFind {
            executor,
            settings,
            extractor,
        }
    }

    pub fn settings(&self) -> &PagingSettings {
        &self.settings
    }

    /// Fetches the window `request` points at.
    ///
    /// A request already marked last yields an empty window without querying.
    pub async fn find_window(
        &self,
        collection: &str,
        query: &Query,
        request: &CursorRequest,
    ) -> Result<CursorWindow<Document>, EngineError> {
        request.validate()?;
        if request.size() > self.settings.max_page_size() {
            return Err(EngineError::PageSizeExceeded {
                requested: request.size(),
                max: self.settings.max_page_size(),
            });
        }

        if request.is_last() {
            debug!(collection, "Request is past the last window, skipping query");
            return Ok(CursorWindow::new(
                Vec::new(),
                request.is_first(),
                true,
                request.clone(),
            ));
        }

        let paged = plan(
            query,
            request,
            self.settings.id_field(),
            self.settings.or_clause_policy(),
        )?;
        let find = FindRequestBuilder::new(collection)
            .paged(&paged)
            .limit(fetch_size(request))
            .max_time(self.settings.max_time())
            .build();

        debug!(
            collection,
            filter = %find.filter,
            sort = %find.sort,
            skip = find.skip,
            limit = find.limit,
            "Executing window query"
        );

        let started = Instant::now();
        let results = self.execute(find).await?;
        let fetched = results.len();

        let window = match (request, &paged) {
            (CursorRequest::Keyset(keyset), PagedQuery::Keyset(planned)) => {
                create_keyset_window_with_sort(keyset, &planned.key_sort, results, &self.extractor)?
            }
            _ => create_window(request, results),
        };

        info!(
            collection,
            fetched,
            returned = window.len(),
            is_first = window.is_first(),
            is_last = window.is_last(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched window"
        );
        Ok(window)
    }

    /// Like [`find_window`](Self::find_window), deserializing every document into `T`.
    pub async fn find_window_as<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
        request: &CursorRequest,
    ) -> Result<CursorWindow<T>, EngineError> {
        let window = self.find_window(collection, query, request).await?;
        Ok(window.try_map(bson::from_document)?)
    }

    /// Walks windows from `request` until the last one, or until `max_windows`
    /// windows have been fetched.
    pub async fn find_windows(
        &self,
        collection: &str,
        query: &Query,
        request: &CursorRequest,
        max_windows: Option<usize>,
    ) -> Result<Vec<CursorWindow<Document>>, EngineError> {
        let mut windows = Vec::new();
        let mut next = request.clone();

        while max_windows.is_none_or(|max| windows.len() < max) {
            let window = self.find_window(collection, query, &next).await?;
            let last = window.is_last();
            next = window.next_cursor_request().clone();
            windows.push(window);
            if last {
                break;
            }
        }

        Ok(windows)
    }

    async fn execute(&self, find: FindRequest) -> Result<Vec<Document>, EngineError> {
        let Some(limit) = find.max_time else {
            return Ok(self.executor.find(find).await?);
        };

        let collection = find.collection.clone();
        match tokio::time::timeout(limit, self.executor.find(find)).await {
            Ok(results) => Ok(results?),
            Err(_) => Err(EngineError::Timeout {
                collection,
                after: limit,
            }),
        }
    }
}

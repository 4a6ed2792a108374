//! In-memory document store that answers `find` requests the way a MongoDB
//! server would for the subset of operators window queries use.

use crate::{
    connectors::source::{FindRequest, QueryExecutor},
    error::ExecutionError,
};
use async_trait::async_trait;
use bson::Document;
use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::trace;

pub mod filter;
pub mod order;
pub mod projection;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_many(
        &self,
        collection: &str,
        documents: impl IntoIterator<Item = Document>,
    ) -> usize {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection.to_string()).or_default();
        let before = stored.len();
        stored.extend(documents);
        stored.len() - before
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub async fn drop_collection(&self, collection: &str) -> bool {
        self.collections.write().await.remove(collection).is_some()
    }
}

#[async_trait]
impl QueryExecutor for MemoryStore {
    async fn find(&self, request: FindRequest) -> Result<Vec<Document>, ExecutionError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(&request.collection) else {
            trace!(collection = %request.collection, "Collection not found, returning no documents");
            return Ok(Vec::new());
        };

        let mut selected = Vec::new();
        for doc in documents {
            if filter::matches(doc, &request.filter)? {
                selected.push(doc);
            }
        }

        let mut failure = None;
        selected.sort_by(|a, b| match order::compare_documents(a, b, &request.sort) {
            Ok(ordering) => ordering,
            Err(err) => {
                failure.get_or_insert(err);
                Ordering::Equal
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }

        let skip = usize::try_from(request.skip).unwrap_or(usize::MAX);
        let limit = if request.limit == 0 {
            usize::MAX
        } else {
            request.limit
        };

        let results = selected
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| projection::project(doc.clone(), &request.fields))
            .collect::<Result<Vec<_>, _>>()?;

        trace!(
            collection = %request.collection,
            matched = results.len(),
            "Evaluated find in memory"
        );
        Ok(results)
    }
}

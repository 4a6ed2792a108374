use crate::error::ExecutionError;
use async_trait::async_trait;
use bson::Document;
use planner::query::PagedQuery;
use std::time::Duration;

/// A single `find` against one collection, as issued for a window.
#[derive(Debug, Clone, PartialEq)]
pub struct FindRequest {
    pub collection: String,
    pub filter: Document,
    pub fields: Document,
    pub sort: Document,
    pub skip: u64,
    pub limit: usize,
    pub max_time: Option<Duration>,
}

pub struct FindRequestBuilder {
    collection: String,
    filter: Document,
    fields: Document,
    sort: Document,
    skip: u64,
    limit: usize,
    max_time: Option<Duration>,
}

impl FindRequestBuilder {
    pub fn new(collection: impl Into<String>) -> Self {
        FindRequestBuilder {
            collection: collection.into(),
            filter: Document::new(),
            fields: Document::new(),
            sort: Document::new(),
            skip: 0,
            limit: 0,
            max_time: None,
        }
    }

    /// Copies filter, projection, sort and skip from a planned query.
    pub fn paged(mut self, query: &PagedQuery) -> Self {
        self.filter = query.filter().clone();
        self.fields = query.fields().clone();
        self.sort = query.sort().clone();
        self.skip = query.skip();
        self
    }

    pub fn filter(mut self, filter: Document) -> Self {
        self.filter = filter;
        self
    }

    pub fn fields(mut self, fields: Document) -> Self {
        self.fields = fields;
        self
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = sort;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Maximum number of documents to return; 0 means no limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn max_time(mut self, max_time: Option<Duration>) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn build(self) -> FindRequest {
        FindRequest {
            collection: self.collection,
            filter: self.filter,
            fields: self.fields,
            sort: self.sort,
            skip: self.skip,
            limit: self.limit,
            max_time: self.max_time,
        }
    }
}

/// Runs `find` requests against a document store.
///
/// Implementations return documents in the order given by the request's sort
/// and apply its projection, skip and limit.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn find(&self, request: FindRequest) -> Result<Vec<Document>, ExecutionError>;
}

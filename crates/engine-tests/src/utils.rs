#![allow(dead_code)]

use bson::Document;
use engine_core::{connectors::memory::order::compare_documents, find::WindowedFind};
use model::{
    pagination::{cursor::CursorRequest, window::CursorWindow},
    query::Query,
};
use std::collections::HashSet;

pub fn ids(documents: &[Document]) -> Vec<i32> {
    documents
        .iter()
        .map(|doc| doc.get_i32("_id").expect("integer _id"))
        .collect()
}

/// `(firstName, age)` pairs of the people fixture.
pub fn names(window: &CursorWindow<Document>) -> Vec<(String, i32)> {
    window
        .iter()
        .map(|doc| {
            (
                doc.get_str("firstName").expect("firstName").to_string(),
                doc.get_i32("age").expect("age"),
            )
        })
        .collect()
}

/// Fetches every window from `request` on and returns them in order.
pub async fn walk(
    finder: &WindowedFind,
    collection: &str,
    query: &Query,
    request: &CursorRequest,
) -> Vec<CursorWindow<Document>> {
    finder
        .find_windows(collection, query, request, Some(1_000))
        .await
        .expect("walk windows")
}

/// Concatenated items of all windows.
pub fn flatten(windows: Vec<CursorWindow<Document>>) -> Vec<Document> {
    windows.into_iter().flat_map(CursorWindow::into_items).collect()
}

/// `documents` ordered by `sort` the way the store orders them.
pub fn sorted(mut documents: Vec<Document>, sort: &Document) -> Vec<Document> {
    documents.sort_by(|a, b| compare_documents(a, b, sort).expect("valid sort"));
    documents
}

pub fn assert_no_duplicates(documents: &[Document]) {
    let mut seen = HashSet::new();
    for id in ids(documents) {
        assert!(seen.insert(id), "document {id} returned twice");
    }
}

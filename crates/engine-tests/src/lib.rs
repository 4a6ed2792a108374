#![allow(dead_code)]

use bson::{Bson, Document, doc};
use engine_config::settings::PagingSettings;
use engine_core::{connectors::memory::MemoryStore, find::WindowedFind};
use std::sync::Arc;

pub mod utils;

const PEOPLE: &str = "people";
const GENERATED: &str = "generated";

/// The six people of the documented example. The two John/40 rows tie on every
/// sort property and differ only by `_id`.
fn people() -> Vec<Document> {
    vec![
        doc! { "_id": 1, "firstName": "John", "lastName": "a", "age": 40 },
        doc! { "_id": 2, "firstName": "Jane", "lastName": "a", "age": 42 },
        doc! { "_id": 3, "firstName": "Jane", "lastName": "b", "age": 20 },
        doc! { "_id": 4, "firstName": "John", "lastName": "b", "age": 20 },
        doc! { "_id": 5, "firstName": "Jane", "lastName": "b", "age": 40 },
        doc! { "_id": 6, "firstName": "John", "lastName": "b", "age": 40 },
    ]
}

/// Deterministic pseudo-random documents with heavy ties on `group` and `score`.
fn generated(count: i32) -> Vec<Document> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move |bound: u64| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state % bound
    };

    (1..=count)
        .map(|id| {
            let mut doc = doc! {
                "_id": id,
                "group": format!("g{}", next(4)),
                "score": next(5) as i64,
                "label": format!("item-{id:03}"),
            };
            // some documents carry a double score to mix numeric types
            if next(3) == 0 {
                doc.insert("score", Bson::Double(next(5) as f64));
            }
            doc
        })
        .collect()
}

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_many(PEOPLE, people()).await;
    store.insert_many(GENERATED, generated(60)).await;
    store
}

async fn finder() -> WindowedFind {
    finder_with(PagingSettings::default()).await
}

async fn finder_with(settings: PagingSettings) -> WindowedFind {
    WindowedFind::new(Arc::new(seeded_store().await), settings)
}

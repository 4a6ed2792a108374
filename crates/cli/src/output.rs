use crate::error::CliError;
use bson::{Bson, Document};
use model::pagination::window::CursorWindow;
use planner::query::PagedQuery;
use serde_json::{Value, json};

fn relaxed(doc: &Document) -> Value {
    Bson::Document(doc.clone()).into_relaxed_extjson()
}

pub fn plan_json(query: &PagedQuery, limit: usize) -> Value {
    json!({
        "filter": relaxed(query.filter()),
        "fields": relaxed(query.fields()),
        "sort": relaxed(query.sort()),
        "skip": query.skip(),
        "limit": limit,
    })
}

pub fn windows_json(windows: Vec<CursorWindow<Document>>) -> Result<Value, CliError> {
    let windows: Vec<CursorWindow<Value>> = windows
        .into_iter()
        .map(|window| window.map(|doc| relaxed(&doc)))
        .collect();
    Ok(serde_json::to_value(windows)?)
}

/// Writes `value` as pretty JSON to `path`, or to stdout when no path is given.
pub async fn emit(value: &Value, path: Option<&str>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}

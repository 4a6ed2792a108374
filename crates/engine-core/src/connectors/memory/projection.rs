use crate::error::ExecutionError;
use bson::{Bson, Document};

const ID_FIELD: &str = "_id";

fn is_zero(value: &Bson) -> bool {
    match value {
        Bson::Int32(v) => *v == 0,
        Bson::Int64(v) => *v == 0,
        Bson::Double(v) => *v == 0.0,
        Bson::Boolean(b) => !*b,
        _ => false,
    }
}

/// Top-level field a projection path refers to.
fn root(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Applies an inclusion or exclusion projection. `_id` is kept unless
/// excluded explicitly; embedded paths project their whole top-level field.
pub fn project(doc: Document, fields: &Document) -> Result<Document, ExecutionError> {
    if fields.is_empty() {
        return Ok(doc);
    }

    let keep_id = !fields.get(ID_FIELD).is_some_and(is_zero);
    let (excluded, included): (Vec<_>, Vec<_>) = fields
        .iter()
        .filter(|(field, _)| field.as_str() != ID_FIELD)
        .partition(|(_, value)| is_zero(value));

    if !excluded.is_empty() && !included.is_empty() {
        return Err(ExecutionError::InvalidProjection(format!(
            "cannot mix inclusion and exclusion in {fields}"
        )));
    }

    let inclusion = !included.is_empty() || (excluded.is_empty() && keep_id);
    if inclusion {
        let roots: Vec<&str> = included.iter().map(|(field, _)| root(field)).collect();
        return Ok(doc
            .into_iter()
            .filter(|(key, _)| (keep_id && key == ID_FIELD) || roots.contains(&key.as_str()))
            .collect());
    }

    if excluded.iter().any(|(field, _)| field.contains('.')) {
        return Err(ExecutionError::InvalidProjection(format!(
            "embedded exclusions are not supported: {fields}"
        )));
    }
    let dropped: Vec<&str> = excluded.iter().map(|(field, _)| field.as_str()).collect();
    Ok(doc
        .into_iter()
        .filter(|(key, _)| {
            !dropped.contains(&key.as_str()) && (keep_id || key != ID_FIELD)
        })
        .collect())
}

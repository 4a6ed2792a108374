//! Evaluates query filters against documents held in memory.
//!
//! Supported: `$and`, `$or`, `$nor`, implicit equality, and the field
//! operators `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`,
//! `$exists`. Array fields match when any element matches.

use super::order::{comparable, compare_values, values_equal};
use crate::error::ExecutionError;
use bson::{Bson, Document};
use model::entity::Entity;
use std::cmp::Ordering;

pub fn matches(doc: &Document, filter: &Document) -> Result<bool, ExecutionError> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for branch in branches(key, condition)? {
                    if !matches(doc, branch)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => any_branch(doc, key, condition)?,
            "$nor" => !any_branch(doc, key, condition)?,
            op if op.starts_with('$') => {
                return Err(ExecutionError::UnsupportedOperator(op.to_string()));
            }
            path => matches_field(doc.field(path).as_ref(), condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn branches<'a>(key: &str, condition: &'a Bson) -> Result<Vec<&'a Document>, ExecutionError> {
    let Bson::Array(items) = condition else {
        return Err(ExecutionError::InvalidFilter(format!("{key} needs an array")));
    };
    if items.is_empty() {
        return Err(ExecutionError::InvalidFilter(format!(
            "{key} needs a non-empty array"
        )));
    }

    items
        .iter()
        .map(|item| match item {
            Bson::Document(branch) => Ok(branch),
            other => Err(ExecutionError::InvalidFilter(format!(
                "{key} entries must be documents, found {other}"
            ))),
        })
        .collect()
}

fn any_branch(doc: &Document, key: &str, condition: &Bson) -> Result<bool, ExecutionError> {
    for branch in branches(key, condition)? {
        if matches(doc, branch)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_operator_document(condition: &Bson) -> bool {
    match condition {
        Bson::Document(ops) => ops.keys().next().is_some_and(|k| k.starts_with('$')),
        _ => false,
    }
}

fn matches_field(value: Option<&Bson>, condition: &Bson) -> Result<bool, ExecutionError> {
    let Bson::Document(ops) = condition else {
        return Ok(equals(value, condition));
    };
    if !is_operator_document(condition) {
        return Ok(equals(value, condition));
    }

    for (op, operand) in ops {
        let matched = match op.as_str() {
            "$eq" => equals(value, operand),
            "$ne" => !equals(value, operand),
            "$gt" => compares(value, operand, |o| o == Ordering::Greater),
            "$gte" => compares(value, operand, |o| o != Ordering::Less),
            "$lt" => compares(value, operand, |o| o == Ordering::Less),
            "$lte" => compares(value, operand, |o| o != Ordering::Greater),
            "$in" => in_list(op, value, operand)?,
            "$nin" => !in_list(op, value, operand)?,
            "$exists" => value.is_some() == truthy(operand),
            other => return Err(ExecutionError::UnsupportedOperator(other.to_string())),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn equals(value: Option<&Bson>, operand: &Bson) -> bool {
    match value {
        None => matches!(operand, Bson::Null),
        Some(Bson::Array(items)) if !matches!(operand, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, operand))
        }
        Some(value) => values_equal(value, operand),
    }
}

fn compares(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let check = |v: &Bson| comparable(v, operand) && accept(compare_values(v, operand));
    match value {
        None => false,
        Some(Bson::Array(items)) if !matches!(operand, Bson::Array(_)) => {
            items.iter().any(check)
        }
        Some(value) => check(value),
    }
}

fn in_list(op: &str, value: Option<&Bson>, operand: &Bson) -> Result<bool, ExecutionError> {
    let Bson::Array(candidates) = operand else {
        return Err(ExecutionError::InvalidFilter(format!("{op} needs an array")));
    };
    Ok(candidates.iter().any(|candidate| equals(value, candidate)))
}

fn truthy(operand: &Bson) -> bool {
    match operand {
        Bson::Boolean(b) => *b,
        Bson::Int32(v) => *v != 0,
        Bson::Int64(v) => *v != 0,
        Bson::Double(v) => *v != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}

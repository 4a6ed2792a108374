//! Total order over BSON values, following the server's comparison rules:
//! values of different types order by type bracket, numbers compare by value
//! regardless of their BSON type. `Decimal128` values sit in a bracket of their
//! own after the other numbers and order among themselves by raw bytes, not by
//! numeric value: the order is total and stable across windows but not numeric.

use crate::error::ExecutionError;
use bson::{Bson, Document};
use model::{entity::Entity, sort::Direction};
use std::cmp::Ordering;

/// Position of a value's type in the cross-type order.
pub fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 2,
        Bson::Decimal128(_) => 3,
        Bson::String(_) | Bson::Symbol(_) => 4,
        Bson::Document(_) => 5,
        Bson::Array(_) => 6,
        Bson::Binary(_) => 7,
        Bson::ObjectId(_) => 8,
        Bson::Boolean(_) => 9,
        Bson::DateTime(_) => 10,
        Bson::Timestamp(_) => 11,
        Bson::RegularExpression(_) => 12,
        Bson::DbPointer(_)
        | Bson::JavaScriptCode(_)
        | Bson::JavaScriptCodeWithScope(_) => 13,
        Bson::MaxKey => 14,
    }
}

/// Whether `a` and `b` fall into the same comparison bracket.
pub fn comparable(a: &Bson, b: &Bson) -> bool {
    type_rank(a) == type_rank(b)
}

pub fn compare_values(a: &Bson, b: &Bson) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Bson::String(x) | Bson::Symbol(x), Bson::String(y) | Bson::Symbol(y)) => x.cmp(y),
        (Bson::Document(x), Bson::Document(y)) => compare_documents_by_fields(x, y),
        (Bson::Array(x), Bson::Array(y)) => compare_sequences(x, y),
        (Bson::Binary(x), Bson::Binary(y)) => x
            .bytes
            .len()
            .cmp(&y.bytes.len())
            .then_with(|| u8::from(x.subtype).cmp(&u8::from(y.subtype)))
            .then_with(|| x.bytes.cmp(&y.bytes)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        (Bson::Timestamp(x), Bson::Timestamp(y)) => {
            (x.time, x.increment).cmp(&(y.time, y.increment))
        }
        (Bson::RegularExpression(x), Bson::RegularExpression(y)) => {
            (&x.pattern, &x.options).cmp(&(&y.pattern, &y.options))
        }
        (Bson::Decimal128(x), Bson::Decimal128(y)) => x.bytes().cmp(&y.bytes()),
        _ if type_rank(a) == 2 => compare_numbers(a, b),
        _ => format!("{a:?}").cmp(&format!("{b:?}")),
    }
}

pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    compare_values(a, b) == Ordering::Equal
}

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> f64 {
    match value {
        Bson::Int32(v) => f64::from(*v),
        Bson::Int64(v) => *v as f64,
        Bson::Double(v) => *v,
        _ => f64::NAN,
    }
}

fn compare_numbers(a: &Bson, b: &Bson) -> Ordering {
    if let (Some(x), Some(y)) = (as_i64(a), as_i64(b)) {
        return x.cmp(&y);
    }

    let (x, y) = (as_f64(a), as_f64(b));
    // NaN sorts before every other number
    x.partial_cmp(&y)
        .unwrap_or_else(|| x.is_nan().cmp(&y.is_nan()).reverse())
}

fn compare_sequences(a: &[Bson], b: &[Bson]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_values(x, y))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

fn compare_documents_by_fields(a: &Document, b: &Document) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|((ka, va), (kb, vb))| compare_values(va, vb).then_with(|| ka.cmp(kb)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Orders two documents by a `{ field: 1 | -1 }` sort document.
/// Missing fields sort as `null`.
pub fn compare_documents(
    a: &Document,
    b: &Document,
    sort: &Document,
) -> Result<Ordering, ExecutionError> {
    for (property, value) in sort {
        let direction = Direction::from_sort_value(value).ok_or_else(|| {
            ExecutionError::InvalidSort(format!("'{property}' has sort value {value}"))
        })?;

        let left = a.field(property).unwrap_or(Bson::Null);
        let right = b.field(property).unwrap_or(Bson::Null);

        let ordering = match direction {
            Direction::Ascending => compare_values(&left, &right),
            Direction::Descending => compare_values(&right, &left),
        };
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(Ordering::Equal)
}

use crate::error::PlannerError;
use bson::{Bson, Document};
use model::{
    pagination::cursor::CursorRequest,
    query::Query,
    sort::{Direction, Order, Sort},
};

pub mod keyset;
pub mod offsets;

pub use keyset::{KeysetCursorQuery, KeysetQueryBuilder, OrClausePolicy, create_keyset_query};
pub use offsets::{OffsetQuery, create_offset_query};

/// Driver-facing query for one window, by cursor request variant.
#[derive(Debug, Clone, PartialEq)]
pub enum PagedQuery {
    Keyset(KeysetCursorQuery),
    Offset(OffsetQuery),
}

impl PagedQuery {
    pub fn filter(&self) -> &Document {
        match self {
            PagedQuery::Keyset(q) => &q.filter,
            PagedQuery::Offset(q) => &q.filter,
        }
    }

    pub fn fields(&self) -> &Document {
        match self {
            PagedQuery::Keyset(q) => &q.fields,
            PagedQuery::Offset(q) => &q.fields,
        }
    }

    pub fn sort(&self) -> &Document {
        match self {
            PagedQuery::Keyset(q) => &q.sort,
            PagedQuery::Offset(q) => &q.sort,
        }
    }

    pub fn skip(&self) -> u64 {
        match self {
            PagedQuery::Keyset(_) => 0,
            PagedQuery::Offset(q) => q.skip,
        }
    }
}

/// Plans the query for `request`, dispatching on its variant.
pub fn plan(
    query: &Query,
    request: &CursorRequest,
    id_field: &str,
    or_policy: OrClausePolicy,
) -> Result<PagedQuery, PlannerError> {
    match request {
        CursorRequest::Keyset(keyset) => KeysetQueryBuilder::new(query, keyset, id_field)
            .or_clause_policy(or_policy)
            .build()
            .map(PagedQuery::Keyset),
        CursorRequest::Offset(offset) => {
            create_offset_query(query, offset, id_field).map(PagedQuery::Offset)
        }
    }
}

/// Number of rows to fetch for `request`: one more than the page size, so the
/// window can tell whether another page follows.
pub fn fetch_size(request: &CursorRequest) -> usize {
    request.size().saturating_add(1)
}

/// Request sort with the unique field appended ascending when missing.
pub(crate) fn target_sort(sort: &Sort, id_field: &str) -> Sort {
    sort.and(&Sort::by([Order::asc(id_field)]))
}

/// Base sort document overlaid with `target`, and `id_field` moved last and ascending.
pub(crate) fn merge_sort(base: &Document, target: &Sort, id_field: &str) -> Document {
    let mut merged = base.clone();
    for order in target {
        merged.insert(order.property(), order.direction().as_i32());
    }

    let mut sort: Document = merged
        .into_iter()
        .filter(|(property, _)| property != id_field)
        .collect();
    sort.insert(id_field, 1);
    sort
}

/// Reads a merged sort document back as a [`Sort`].
pub(crate) fn sort_from_document(sort: &Document) -> Result<Sort, PlannerError> {
    let mut orders = Vec::with_capacity(sort.len());
    for (property, value) in sort {
        let direction = Direction::from_sort_value(value).ok_or_else(|| {
            PlannerError::InvalidRequest(format!(
                "sort on '{property}' uses {value}, only 1 and -1 can be paginated"
            ))
        })?;
        orders.push(Order::new(property.as_str(), direction));
    }
    Ok(Sort::by(orders))
}

/// Makes sure every property of `sort` is returned by the projection so the
/// keyset of the last row can be read back.
///
/// Inclusion projections gain the sort properties; exclusion projections drop
/// any exclusion of a sort property. An empty projection already returns everything.
pub(crate) fn extend_projection(fields: &Document, sort: &Sort) -> Document {
    let mut fields = fields.clone();
    if fields.is_empty() {
        return fields;
    }

    if is_exclusion(&fields) {
        for property in sort.properties() {
            fields.remove(property);
        }
    } else {
        for property in sort.properties() {
            fields.insert(property, 1);
        }
    }

    fields
}

fn is_exclusion(fields: &Document) -> bool {
    fields
        .iter()
        .filter(|(field, _)| field.as_str() != "_id")
        .all(|(_, value)| is_zero(value))
        && fields.iter().any(|(_, value)| is_zero(value))
}

fn is_zero(value: &Bson) -> bool {
    match value {
        Bson::Int32(v) => *v == 0,
        Bson::Int64(v) => *v == 0,
        Bson::Double(v) => *v == 0.0,
        Bson::Boolean(v) => !*v,
        _ => false,
    }
}

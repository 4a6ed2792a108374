use crate::{
    error::PlannerError,
    query::{extend_projection, merge_sort, sort_from_document, target_sort},
};
use bson::{Bson, Document, doc};
use model::{
    pagination::cursor::KeysetCursorRequest,
    query::Query,
    sort::{Direction, Order, Sort},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the keyset predicate is combined with a top-level `$or` already present
/// in the base filter.
///
/// A filter document holds a single top-level `$or`, so the two disjunctions
/// cannot both keep their meaning without restructuring the caller's filter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrClausePolicy {
    /// Fail with [`PlannerError::ConflictingDisjunction`].
    #[default]
    Reject,

    /// Append the keyset branches to the existing `$or`. The result matches
    /// rows satisfying any base branch *or* lying after the keyset, so pages
    /// may repeat rows matched by the base branches.
    Append,
}

impl FromStr for OrClausePolicy {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(OrClausePolicy::Reject),
            "append" => Ok(OrClausePolicy::Append),
            other => Err(PlannerError::InvalidRequest(format!(
                "unknown $or policy '{other}'"
            ))),
        }
    }
}

/// Filter, projection and sort that fetch the window following a keyset.
#[derive(Debug, Clone, PartialEq)]
pub struct KeysetCursorQuery {
    pub filter: Document,
    pub fields: Document,
    pub sort: Document,
    /// Effective total order as a [`Sort`]; keysets for the next window must be
    /// extracted with exactly these properties.
    pub key_sort: Sort,
}

/// Rewrites a base [`Query`] so it returns the rows sorting strictly after
/// the keyset of a [`KeysetCursorRequest`].
pub struct KeysetQueryBuilder<'a> {
    query: &'a Query,
    request: &'a KeysetCursorRequest,
    id_field: &'a str,
    or_policy: OrClausePolicy,
}

impl<'a> KeysetQueryBuilder<'a> {
    pub fn new(query: &'a Query, request: &'a KeysetCursorRequest, id_field: &'a str) -> Self {
        Self {
            query,
            request,
            id_field,
            or_policy: OrClausePolicy::default(),
        }
    }

    pub fn or_clause_policy(mut self, policy: OrClausePolicy) -> Self {
        self.or_policy = policy;
        self
    }

    pub fn build(self) -> Result<KeysetCursorQuery, PlannerError> {
        if self.request.size() == 0 {
            return Err(PlannerError::InvalidRequest(
                "page size must be greater than zero".to_string(),
            ));
        }
        if self.id_field.is_empty() {
            return Err(PlannerError::InvalidRequest(
                "unique field name must not be empty".to_string(),
            ));
        }

        let target = target_sort(self.request.sort(), self.id_field);
        let sort = merge_sort(self.query.sort(), &target, self.id_field);
        let key_sort = sort_from_document(&sort)?;
        let fields = extend_projection(self.query.fields(), &key_sort);

        let keys = self.request.keys();
        let mut filter = self.query.filter().clone();

        // The first window has no keyset and needs no predicate.
        if !keys.is_empty() {
            check_keyset(keys, &key_sort)?;
            let branches = seek_predicate(&key_sort, keys);
            merge_disjunction(&mut filter, branches, self.or_policy)?;
        }

        Ok(KeysetCursorQuery {
            filter,
            fields,
            sort,
            key_sort,
        })
    }
}

/// Shorthand for [`KeysetQueryBuilder`] with the default `$or` policy.
pub fn create_keyset_query(
    query: &Query,
    request: &KeysetCursorRequest,
    id_field: &str,
) -> Result<KeysetCursorQuery, PlannerError> {
    KeysetQueryBuilder::new(query, request, id_field).build()
}

fn check_keyset(keys: &Document, sort: &Sort) -> Result<(), PlannerError> {
    let missing: Vec<&str> = sort
        .properties()
        .filter(|property| !keys.contains_key(property))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PlannerError::InvalidCursorState(format!(
            "keyset does not contain values for [{}]",
            missing.join(", ")
        )))
    }
}

/// Builds one conjunction per sort position `i`: equality on the properties
/// before `i`, strict inequality in sort direction on property `i`.
///
/// `null` sorts below every other type while range operators only compare
/// within one type, so positions next to the null group get their own terms:
/// ascending after `null` is any non-null value, and descending after a
/// non-null value also includes `null`.
fn seek_predicate(sort: &Sort, keys: &Document) -> Vec<Bson> {
    let orders: Vec<&Order> = sort.iter().collect();
    let mut branches = Vec::with_capacity(orders.len());

    for i in 0..orders.len() {
        let mut prefix = Document::new();

        for (j, order) in orders.iter().enumerate() {
            let value = keys.get(order.property()).cloned().unwrap_or(Bson::Null);

            if j >= i {
                for term in seek_after(order, value) {
                    let mut constraint = prefix.clone();
                    constraint.insert(order.property(), term);
                    branches.push(Bson::Document(constraint));
                }
                break;
            }

            prefix.insert(order.property(), value);
        }
    }

    branches
}

/// Conditions, any of which selects values strictly after `value` in the
/// order's direction.
fn seek_after(order: &Order, value: Bson) -> Vec<Bson> {
    match (order.direction(), value) {
        (Direction::Ascending, Bson::Null) => vec![Bson::Document(doc! { "$ne": Bson::Null })],
        (Direction::Descending, Bson::Null) => Vec::new(),
        (Direction::Descending, value) => vec![
            Bson::Document(doc! { "$lt": value }),
            Bson::Null,
        ],
        (Direction::Ascending, value) => vec![Bson::Document(doc! { "$gt": value })],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn name_age() -> Sort {
        Sort::by_properties(&["firstName", "age"])
    }

    fn jane_40() -> Document {
        doc! { "firstName": "Jane", "age": 40, "_id": 2 }
    }

    #[test]
    fn test_first_window_has_no_predicate() {
        let query = Query::new(doc! { "active": true });
        let request = KeysetCursorRequest::of_size(2, name_age());

        let built = create_keyset_query(&query, &request, "_id").unwrap();

        assert_eq!(built.filter, doc! { "active": true });
        assert!(built.fields.is_empty());
        assert_eq!(built.sort, doc! { "firstName": 1, "age": 1, "_id": 1 });
        let order: Vec<&String> = built.sort.keys().collect();
        assert_eq!(order, vec!["firstName", "age", "_id"]);
    }

    #[test]
    fn test_first_window_is_idempotent() {
        let query = Query::new(doc! { "active": true }).include("firstName");
        let request = KeysetCursorRequest::of_size(2, name_age());

        let a = create_keyset_query(&query, &request, "_id").unwrap();
        let b = create_keyset_query(&query, &request, "_id").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seek_predicate_for_ascending_sort() {
        let query = Query::all();
        let request = KeysetCursorRequest::of_size(2, name_age()).with_next(jane_40());

        let built = create_keyset_query(&query, &request, "_id").unwrap();

        assert_eq!(
            built.filter,
            doc! {
                "$or": [
                    { "firstName": { "$gt": "Jane" } },
                    { "firstName": "Jane", "age": { "$gt": 40 } },
                    { "firstName": "Jane", "age": 40, "_id": { "$gt": 2 } },
                ]
            }
        );
    }

    #[test]
    fn test_seek_predicate_respects_direction() {
        let sort = Sort::by([Order::desc("age"), Order::asc("firstName")]);
        let request =
            KeysetCursorRequest::of_size(2, sort).with_next(doc! { "age": 40, "firstName": "Jane", "_id": 2 });

        let built = create_keyset_query(&Query::all(), &request, "_id").unwrap();

        assert_eq!(
            built.filter,
            doc! {
                "$or": [
                    { "age": { "$lt": 40 } },
                    { "age": null },
                    { "age": 40, "firstName": { "$gt": "Jane" } },
                    { "age": 40, "firstName": "Jane", "_id": { "$gt": 2 } },
                ]
            }
        );
        assert_eq!(built.sort, doc! { "age": -1, "firstName": 1, "_id": 1 });
    }

    #[test]
    fn test_empty_sort_orders_by_id_only() {
        let request = KeysetCursorRequest::of_size(3, Sort::unsorted()).with_next(doc! { "_id": 9 });

        let built = create_keyset_query(&Query::all(), &request, "_id").unwrap();

        assert_eq!(built.sort, doc! { "_id": 1 });
        assert_eq!(built.filter, doc! { "$or": [ { "_id": { "$gt": 9 } } ] });
    }

    #[test]
    fn test_projection_gains_sort_fields() {
        let query = Query::all().include("email");
        let request = KeysetCursorRequest::of_size(2, name_age());

        let built = create_keyset_query(&query, &request, "id").unwrap();
        assert_eq!(
            built.fields,
            doc! { "email": 1, "firstName": 1, "age": 1, "id": 1 }
        );
    }

    #[test]
    fn test_base_sort_fields_take_part_in_keyset() {
        let query = Query::all().with_sort_document(doc! { "score": -1 });
        let request = KeysetCursorRequest::of_size(2, Sort::by_properties(&["age"]))
            .with_next(doc! { "age": 40, "_id": 2 });

        let err = create_keyset_query(&query, &request, "_id").unwrap_err();
        assert_eq!(
            err,
            PlannerError::InvalidCursorState("keyset does not contain values for [score]".to_string())
        );

        let first = KeysetCursorRequest::of_size(2, Sort::by_properties(&["age"]));
        let built = create_keyset_query(&query, &first, "_id").unwrap();
        let props: Vec<&str> = built.key_sort.properties().collect();
        assert_eq!(props, vec!["score", "age", "_id"]);
    }

    #[test]
    fn test_keyset_missing_id_is_invalid_state() {
        let request = KeysetCursorRequest::of_size(2, name_age())
            .with_next(doc! { "firstName": "Jane", "age": 40 });

        let err = create_keyset_query(&Query::all(), &request, "_id").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidCursorState(_)));
    }

    #[test]
    fn test_existing_or_is_rejected_by_default() {
        let query = Query::new(doc! { "$or": [ { "a": 1 }, { "b": 2 } ] });
        let request = KeysetCursorRequest::of_size(2, name_age()).with_next(jane_40());

        let err = create_keyset_query(&query, &request, "_id").unwrap_err();
        assert_eq!(err, PlannerError::ConflictingDisjunction);
    }

    #[test]
    fn test_existing_or_allowed_on_first_window() {
        let query = Query::new(doc! { "$or": [ { "a": 1 }, { "b": 2 } ] });
        let request = KeysetCursorRequest::of_size(2, name_age());

        let built = create_keyset_query(&query, &request, "_id").unwrap();
        assert_eq!(built.filter, doc! { "$or": [ { "a": 1 }, { "b": 2 } ] });
    }

    #[test]
    fn test_existing_or_appended_when_configured() {
        let query = Query::new(doc! { "active": true, "$or": [ { "a": 1 } ] });
        let request = KeysetCursorRequest::of_size(2, Sort::unsorted()).with_next(doc! { "_id": 5 });

        let built = KeysetQueryBuilder::new(&query, &request, "_id")
            .or_clause_policy(OrClausePolicy::Append)
            .build()
            .unwrap();

        assert_eq!(
            built.filter,
            doc! { "active": true, "$or": [ { "a": 1 }, { "_id": { "$gt": 5 } } ] }
        );
    }

    #[test]
    fn test_rejects_zero_size_and_empty_id() {
        let request = KeysetCursorRequest::of_size(0, name_age());
        assert!(matches!(
            create_keyset_query(&Query::all(), &request, "_id"),
            Err(PlannerError::InvalidRequest(_))
        ));

        let request = KeysetCursorRequest::of_size(1, name_age());
        assert!(matches!(
            create_keyset_query(&Query::all(), &request, ""),
            Err(PlannerError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_seek_predicate_around_null_group() {
        let sort = Sort::by([Order::asc("nick"), Order::desc("rank")]);
        let request = KeysetCursorRequest::of_size(2, sort)
            .with_next(doc! { "nick": null, "rank": null, "_id": 2 });

        let built = create_keyset_query(&Query::all(), &request, "_id").unwrap();

        assert_eq!(
            built.filter,
            doc! {
                "$or": [
                    { "nick": { "$ne": null } },
                    { "nick": null, "rank": null, "_id": { "$gt": 2 } },
                ]
            }
        );

        let request = request.with_next(doc! { "nick": "a", "rank": 3, "_id": 2 });
        let built = create_keyset_query(&Query::all(), &request, "_id").unwrap();
        assert_eq!(
            built.filter,
            doc! {
                "$or": [
                    { "nick": { "$gt": "a" } },
                    { "nick": "a", "rank": { "$lt": 3 } },
                    { "nick": "a", "rank": null },
                    { "nick": "a", "rank": 3, "_id": { "$gt": 2 } },
                ]
            }
        );
    }

    #[test]
    fn test_or_policy_parse() {
        assert_eq!("append".parse::<OrClausePolicy>().unwrap(), OrClausePolicy::Append);
        assert_eq!(" Reject ".parse::<OrClausePolicy>().unwrap(), OrClausePolicy::Reject);
        assert!("merge".parse::<OrClausePolicy>().is_err());
    }
}

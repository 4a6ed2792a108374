use crate::sort::Sort;
use bson::Document;
use serde::{Deserialize, Serialize};

/// A find query in MongoDB document form: filter, field projection and sort.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Query {
    #[serde(default)]
    filter: Document,
    #[serde(default)]
    fields: Document,
    #[serde(default)]
    sort: Document,
}

impl Query {
    pub fn new(filter: Document) -> Self {
        Query {
            filter,
            ..Default::default()
        }
    }

    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_fields(mut self, fields: Document) -> Self {
        self.fields = fields;
        self
    }

    /// Adds `field` to the inclusion projection.
    pub fn include(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), 1);
        self
    }

    /// Appends the orders of `sort` to the sort document.
    pub fn with_sort(mut self, sort: &Sort) -> Self {
        for order in sort {
            self.sort
                .insert(order.property(), order.direction().as_i32());
        }
        self
    }

    pub fn with_sort_document(mut self, sort: Document) -> Self {
        self.sort = sort;
        self
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn sort(&self) -> &Document {
        &self.sort
    }

    pub fn is_sorted(&self) -> bool {
        !self.sort.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Order;
    use bson::doc;

    #[test]
    fn test_builder() {
        let query = Query::new(doc! { "active": true })
            .include("firstName")
            .with_sort(&Sort::by([Order::desc("age")]));

        assert_eq!(query.filter(), &doc! { "active": true });
        assert_eq!(query.fields(), &doc! { "firstName": 1 });
        assert_eq!(query.sort(), &doc! { "age": -1 });
        assert!(query.is_sorted());
        assert!(!Query::all().is_sorted());
    }

    #[test]
    fn test_deserialize_partial() {
        let query: Query = serde_json::from_str(r#"{"filter": {"age": {"$gte": 21}}}"#).unwrap();
        assert!(query.fields().is_empty());
        assert!(query.filter().contains_key("age"));
    }
}

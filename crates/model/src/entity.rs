use crate::{error::ModelError, sort::Sort};
use bson::{Bson, Document};

/// Read access to the properties a result can be sorted by.
pub trait Entity {
    /// Current value of the property at `path` (dot separated for embedded fields),
    /// or `None` when the entity has no such property.
    fn field(&self, path: &str) -> Option<Bson>;
}

/// An entity type with a fixed unique property that breaks sort ties.
pub trait IdentifiedEntity: Entity {
    const ID_FIELD: &'static str;
}

impl Entity for Document {
    fn field(&self, path: &str) -> Option<Bson> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;

        for segment in segments {
            current = match current {
                Bson::Document(doc) => doc.get(segment)?,
                _ => return None,
            };
        }

        Some(current.clone())
    }
}

impl IdentifiedEntity for Document {
    const ID_FIELD: &'static str = "_id";
}

/// Extracts the keyset (sort key values) of an entity.
///
/// Resolved once per entity type; the unique field is appended to every
/// sort it extracts for so the resulting keyset identifies a single position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExtractor {
    id_field: String,
}

impl KeyExtractor {
    pub fn new(id_field: impl Into<String>) -> Self {
        KeyExtractor {
            id_field: id_field.into(),
        }
    }

    pub fn for_entity<E: IdentifiedEntity>() -> Self {
        Self::new(E::ID_FIELD)
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns `{ property: value }` for every property of `sort` followed by the unique field.
    pub fn extract<E: Entity + ?Sized>(
        &self,
        entity: &E,
        sort: &Sort,
    ) -> Result<Document, ModelError> {
        let mut keys = Document::new();
        let properties = sort.properties().chain(std::iter::once(self.id_field.as_str()));

        for property in properties {
            if keys.contains_key(property) {
                continue;
            }

            let value = entity
                .field(property)
                .ok_or_else(|| ModelError::UnresolvableField(property.to_string()))?;
            keys.insert(property, value);
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Order;
    use bson::doc;

    struct Person {
        id: i64,
        first_name: String,
        age: i32,
    }

    impl Entity for Person {
        fn field(&self, path: &str) -> Option<Bson> {
            match path {
                "id" => Some(Bson::Int64(self.id)),
                "firstName" => Some(Bson::String(self.first_name.clone())),
                "age" => Some(Bson::Int32(self.age)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_extract_follows_sort_order_then_id() {
        let person = Person {
            id: 7,
            first_name: "Jane".to_string(),
            age: 40,
        };
        let sort = Sort::by([Order::desc("age"), Order::asc("firstName")]);

        let keys = KeyExtractor::new("id").extract(&person, &sort).unwrap();

        let order: Vec<&String> = keys.keys().collect();
        assert_eq!(order, vec!["age", "firstName", "id"]);
        assert_eq!(keys, doc! { "age": 40, "firstName": "Jane", "id": 7_i64 });
    }

    #[test]
    fn test_extract_does_not_repeat_id() {
        let person = Person {
            id: 1,
            first_name: "John".to_string(),
            age: 20,
        };
        let sort = Sort::by([Order::asc("id"), Order::asc("age")]);

        let keys = KeyExtractor::new("id").extract(&person, &sort).unwrap();
        assert_eq!(keys, doc! { "id": 1_i64, "age": 20 });
    }

    #[test]
    fn test_extract_unknown_field() {
        let person = Person {
            id: 1,
            first_name: "John".to_string(),
            age: 20,
        };
        let sort = Sort::by_properties(&["lastName"]);

        let err = KeyExtractor::new("id").extract(&person, &sort).unwrap_err();
        assert_eq!(err, ModelError::UnresolvableField("lastName".to_string()));
    }

    #[test]
    fn test_document_nested_paths() {
        let doc = doc! { "_id": 1, "address": { "city": "Oslo" }, "tags": ["a"] };

        assert_eq!(doc.field("address.city"), Some(Bson::String("Oslo".into())));
        assert_eq!(doc.field("address.zip"), None);
        assert_eq!(doc.field("tags.0"), None);

        let keys = KeyExtractor::for_entity::<Document>()
            .extract(&doc, &Sort::by_properties(&["address.city"]))
            .unwrap();
        assert_eq!(keys, doc! { "address.city": "Oslo", "_id": 1 });
    }

    #[test]
    fn test_null_value_is_resolvable() {
        let doc = doc! { "_id": 1, "nickname": null };
        let keys = KeyExtractor::for_entity::<Document>()
            .extract(&doc, &Sort::by_properties(&["nickname"]))
            .unwrap();
        assert_eq!(keys.get("nickname"), Some(&Bson::Null));
    }
}

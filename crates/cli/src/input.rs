use crate::error::CliError;
use bson::{Bson, Document};
use std::path::Path;

/// Parses an extended JSON object, e.g. `{"age": {"$gt": 20}}`.
pub fn parse_document(name: &str, text: &str) -> Result<Document, CliError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    match Bson::try_from(value)? {
        Bson::Document(doc) => Ok(doc),
        _ => Err(CliError::NotADocument(name.to_string())),
    }
}

pub fn parse_optional(name: &str, text: Option<&str>) -> Result<Document, CliError> {
    text.map_or_else(|| Ok(Document::new()), |text| parse_document(name, text))
}

/// Reads a file holding a JSON array of extended JSON objects.
pub async fn read_documents(path: &Path) -> Result<Vec<Document>, CliError> {
    let content = tokio::fs::read_to_string(path).await?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&content)?;

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match Bson::try_from(value)? {
            Bson::Document(doc) => Ok(doc),
            _ => Err(CliError::NotADocument(format!("element {i} of {}", path.display()))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use std::io::Write;

    #[test]
    fn test_parse_document_reads_extended_json() {
        let parsed = parse_document(
            "query",
            r#"{ "_id": { "$oid": "65f1c0a4e4b0a1b2c3d4e5f6" }, "age": { "$gt": 20 } }"#,
        )
        .unwrap();

        let oid = ObjectId::parse_str("65f1c0a4e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(parsed, doc! { "_id": oid, "age": { "$gt": 20 } });
    }

    #[test]
    fn test_parse_document_rejects_non_objects() {
        assert!(matches!(
            parse_document("keys", "[1, 2]"),
            Err(CliError::NotADocument(name)) if name == "keys"
        ));
        assert!(matches!(parse_document("keys", "{"), Err(CliError::Json(_))));
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional("fields", None).unwrap(), Document::new());
        assert_eq!(
            parse_optional("fields", Some(r#"{"age": 1}"#)).unwrap(),
            doc! { "age": 1 }
        );
    }

    #[tokio::test]
    async fn test_read_documents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "_id": 1, "name": "Jane" }}, {{ "_id": 2 }}]"#).unwrap();

        let documents = read_documents(file.path()).await.unwrap();
        assert_eq!(documents, vec![doc! { "_id": 1, "name": "Jane" }, doc! { "_id": 2 }]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "_id": 1 }}, 7]"#).unwrap();
        assert!(matches!(
            read_documents(file.path()).await,
            Err(CliError::NotADocument(_))
        ));
    }
}

use crate::{error::ModelError, sort::Sort};
use bson::Document;
use serde::{Deserialize, Serialize};

/// Request for a window that resumes after the last seen sort key values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeysetCursorRequest {
    size: usize,
    sort: Sort,
    /// Sort key values of the last element of the previous window.
    /// Empty when requesting the first window.
    #[serde(default)]
    keys: Document,
    #[serde(default)]
    last: bool,
}

impl KeysetCursorRequest {
    /// First window of `size` elements ordered by `sort`.
    pub fn of_size(size: usize, sort: Sort) -> Self {
        KeysetCursorRequest {
            size,
            sort,
            keys: Document::new(),
            last: false,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn keys(&self) -> &Document {
        &self.keys
    }

    pub fn is_first(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.last
    }

    pub fn with_size(&self, size: usize) -> Self {
        KeysetCursorRequest {
            size,
            ..self.clone()
        }
    }

    /// Request positioned after the element whose sort keys are `keys`.
    pub fn with_next(&self, keys: Document) -> Self {
        KeysetCursorRequest {
            keys,
            last: false,
            ..self.clone()
        }
    }

    pub fn with_last(&self, last: bool) -> Self {
        KeysetCursorRequest {
            last,
            ..self.clone()
        }
    }
}

/// Request for a window starting at a numeric position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OffsetCursorRequest {
    size: usize,
    sort: Sort,
    #[serde(default)]
    offset: u64,
    #[serde(default)]
    last: bool,
}

impl OffsetCursorRequest {
    pub fn of_size(size: usize, sort: Sort) -> Self {
        OffsetCursorRequest {
            size,
            sort,
            offset: 0,
            last: false,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_first(&self) -> bool {
        self.offset == 0
    }

    pub fn is_last(&self) -> bool {
        self.last
    }

    pub fn with_size(&self, size: usize) -> Self {
        OffsetCursorRequest {
            size,
            ..self.clone()
        }
    }

    pub fn with_offset(&self, offset: u64) -> Self {
        OffsetCursorRequest {
            offset,
            last: false,
            ..self.clone()
        }
    }

    /// Request for the window directly following this one.
    pub fn next(&self) -> Self {
        self.with_offset(self.offset.saturating_add(self.size as u64))
    }

    pub fn with_last(&self, last: bool) -> Self {
        OffsetCursorRequest {
            last,
            ..self.clone()
        }
    }
}

/// Represents a request for one window of a sorted result set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CursorRequest {
    /// Resume after the sort key values of the last returned element.
    Keyset(KeysetCursorRequest),

    /// Skip a fixed number of elements.
    Offset(OffsetCursorRequest),
}

impl CursorRequest {
    pub fn size(&self) -> usize {
        match self {
            CursorRequest::Keyset(r) => r.size(),
            CursorRequest::Offset(r) => r.size(),
        }
    }

    pub fn sort(&self) -> &Sort {
        match self {
            CursorRequest::Keyset(r) => r.sort(),
            CursorRequest::Offset(r) => r.sort(),
        }
    }

    pub fn is_first(&self) -> bool {
        match self {
            CursorRequest::Keyset(r) => r.is_first(),
            CursorRequest::Offset(r) => r.is_first(),
        }
    }

    /// Whether the window produced for the previous request was the final one.
    pub fn is_last(&self) -> bool {
        match self {
            CursorRequest::Keyset(r) => r.is_last(),
            CursorRequest::Offset(r) => r.is_last(),
        }
    }

    pub fn with_size(&self, size: usize) -> Self {
        match self {
            CursorRequest::Keyset(r) => CursorRequest::Keyset(r.with_size(size)),
            CursorRequest::Offset(r) => CursorRequest::Offset(r.with_size(size)),
        }
    }

    pub fn with_last(&self, last: bool) -> Self {
        match self {
            CursorRequest::Keyset(r) => CursorRequest::Keyset(r.with_last(last)),
            CursorRequest::Offset(r) => CursorRequest::Offset(r.with_last(last)),
        }
    }

    /// Rejects requests that cannot produce a window.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.size() == 0 {
            return Err(ModelError::InvalidPageSize(0));
        }
        Ok(())
    }
}

impl From<KeysetCursorRequest> for CursorRequest {
    fn from(request: KeysetCursorRequest) -> Self {
        CursorRequest::Keyset(request)
    }
}

impl From<OffsetCursorRequest> for CursorRequest {
    fn from(request: OffsetCursorRequest) -> Self {
        CursorRequest::Offset(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn sort() -> Sort {
        Sort::by_properties(&["firstName", "age"])
    }

    #[test]
    fn test_keyset_with_next_leaves_receiver_untouched() {
        let first = KeysetCursorRequest::of_size(2, sort());
        let next = first.with_next(doc! { "firstName": "Jane", "age": 40, "_id": 2 });

        assert!(first.is_first());
        assert!(first.keys().is_empty());
        assert!(!next.is_first());
        assert_eq!(next.keys().get_i32("age").unwrap(), 40);
        assert_eq!(next.size(), 2);
        assert_eq!(next.sort(), &sort());
    }

    #[test]
    fn test_keyset_with_size_keeps_keys() {
        let request = KeysetCursorRequest::of_size(2, sort())
            .with_next(doc! { "firstName": "Jane", "age": 40, "_id": 2 })
            .with_size(5);

        assert_eq!(request.size(), 5);
        assert_eq!(request.keys().len(), 3);
    }

    #[test]
    fn test_offset_next() {
        let request = OffsetCursorRequest::of_size(10, sort());
        assert!(request.is_first());

        let next = request.next();
        assert_eq!(next.offset(), 10);
        assert!(!next.is_first());
        assert_eq!(next.next().offset(), 20);
    }

    #[test]
    fn test_with_last_on_enum() {
        let request: CursorRequest = OffsetCursorRequest::of_size(3, sort()).into();
        let last = request.with_last(true);

        assert!(!request.is_last());
        assert!(last.is_last());
        assert_eq!(last.size(), 3);
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let request: CursorRequest = KeysetCursorRequest::of_size(0, sort()).into();
        assert_eq!(request.validate(), Err(ModelError::InvalidPageSize(0)));
    }

    #[test]
    fn test_serde_round_trip_keeps_variant() {
        let request: CursorRequest = KeysetCursorRequest::of_size(2, sort())
            .with_next(doc! { "firstName": "John", "age": 20, "_id": 4 })
            .into();

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"type\":\"keyset\""));

        let parsed: CursorRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.size(), 2);
        assert!(!parsed.is_first());
    }
}

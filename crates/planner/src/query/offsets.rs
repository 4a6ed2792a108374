use crate::{
    error::PlannerError,
    query::{extend_projection, merge_sort, sort_from_document, target_sort},
};
use bson::Document;
use model::{pagination::cursor::OffsetCursorRequest, query::Query};

/// Filter, projection, sort and skip for a window addressed by position.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetQuery {
    pub filter: Document,
    pub fields: Document,
    pub sort: Document,
    pub skip: u64,
}

/// Maps an [`OffsetCursorRequest`] onto skip/limit paging.
///
/// The sort and projection follow the same rules as keyset queries so both
/// request kinds see rows in the same total order.
pub fn create_offset_query(
    query: &Query,
    request: &OffsetCursorRequest,
    id_field: &str,
) -> Result<OffsetQuery, PlannerError> {
    if request.size() == 0 {
        return Err(PlannerError::InvalidRequest(
            "page size must be greater than zero".to_string(),
        ));
    }

    let target = target_sort(request.sort(), id_field);
    let sort = merge_sort(query.sort(), &target, id_field);
    let fields = extend_projection(query.fields(), &sort_from_document(&sort)?);

    Ok(OffsetQuery {
        filter: query.filter().clone(),
        fields,
        sort,
        skip: request.offset(),
    })
}

use crate::pagination::cursor::CursorRequest;
use serde::Serialize;

/// One page of results together with its position in the result set
/// and the request that fetches the following page.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CursorWindow<T> {
    items: Vec<T>,
    is_first: bool,
    is_last: bool,
    next_cursor_request: CursorRequest,
}

impl<T> CursorWindow<T> {
    pub fn new(
        items: Vec<T>,
        is_first: bool,
        is_last: bool,
        next_cursor_request: CursorRequest,
    ) -> Self {
        CursorWindow {
            items,
            is_first,
            is_last,
            next_cursor_request,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.is_first
    }

    pub fn is_last(&self) -> bool {
        self.is_last
    }

    pub fn has_next(&self) -> bool {
        !self.is_last
    }

    pub fn next_cursor_request(&self) -> &CursorRequest {
        &self.next_cursor_request
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Converts every item, keeping the window metadata.
    pub fn map<U, F>(self, f: F) -> CursorWindow<U>
    where
        F: FnMut(T) -> U,
    {
        CursorWindow {
            items: self.items.into_iter().map(f).collect(),
            is_first: self.is_first,
            is_last: self.is_last,
            next_cursor_request: self.next_cursor_request,
        }
    }

    /// Like [`CursorWindow::map`], stopping at the first conversion error.
    pub fn try_map<U, E, F>(self, f: F) -> Result<CursorWindow<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<U>, E>>()?;
        Ok(CursorWindow {
            items,
            is_first: self.is_first,
            is_last: self.is_last,
            next_cursor_request: self.next_cursor_request,
        })
    }
}

impl<T> IntoIterator for CursorWindow<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a CursorWindow<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

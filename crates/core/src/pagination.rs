//! One-image-at-a-time browsing over a filtered key list.
//!
//! The position is owned by the caller (one per reviewer session); the
//! server only clamps it against the current list length.

use serde::Serialize;

/// A bounds-checked position inside a list of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    pub index: usize,
    pub total: usize,
}

impl PageCursor {
    /// Clamp `requested` into `[0, total - 1]`.
    ///
    /// Returns `None` for an empty list, where no position is valid.
    pub fn clamped(requested: usize, total: usize) -> Option<Self> {
        if total == 0 {
            return None;
        }
        Some(Self {
            index: requested.min(total - 1),
            total,
        })
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total
    }

    /// Cursor one step back, or `self` when already at the start.
    pub fn previous(self) -> Self {
        Self {
            index: self.index.saturating_sub(1),
            ..self
        }
    }

    /// Cursor one step forward, or `self` when already at the end.
    pub fn next(self) -> Self {
        if self.has_next() {
            Self {
                index: self.index + 1,
                ..self
            }
        } else {
            self
        }
    }

    /// The item under the cursor.
    pub fn select<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_no_cursor() {
        assert_eq!(PageCursor::clamped(0, 0), None);
    }

    #[test]
    fn out_of_range_index_is_clamped_to_last() {
        let cursor = PageCursor::clamped(10, 3).unwrap();
        assert_eq!(cursor.index, 2);
        assert!(!cursor.has_next());
        assert!(cursor.has_previous());
    }

    #[test]
    fn single_item_has_no_neighbours() {
        let cursor = PageCursor::clamped(0, 1).unwrap();
        assert!(!cursor.has_previous());
        assert!(!cursor.has_next());
        assert_eq!(cursor.next(), cursor);
        assert_eq!(cursor.previous(), cursor);
    }

    #[test]
    fn walking_forward_and_back() {
        let items = ["a", "b", "c"];
        let start = PageCursor::clamped(0, items.len()).unwrap();
        let end = start.next().next().next();
        assert_eq!(end.select(&items), Some(&"c"));
        assert_eq!(end.previous().select(&items), Some(&"b"));
        assert_eq!(start.previous().select(&items), Some(&"a"));
    }
}

//! ID-based cursor pagination.
//!
//! A cursor is the smallest ID the next page may contain. Pages are ordered
//! by ascending ID, so rows inserted after a traversal started are picked up
//! if their ID lies past the resume point and earlier rows are never
//! returned twice. No state is held between calls.

use serde::{Deserialize, Serialize};

/// Page size and resume point of a list request.
///
/// `limit == 0` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor: Option<i64>,
}

/// One page of results plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` once the traversal is exhausted.
    pub next_cursor: Option<i64>,
}

impl<T> Page<T> {
    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }
}

impl PageRequest {
    pub fn new(limit: u32, cursor: Option<i64>) -> Self {
        Self { limit, cursor }
    }

    /// Number of rows to fetch: one past the limit, so the presence of a
    /// further page can be detected without a second query.
    pub(crate) fn fetch_limit(&self) -> Option<i64> {
        if self.limit == 0 {
            None
        } else {
            Some(i64::from(self.limit) + 1)
        }
    }

    /// Cuts an over-fetched, ID-ascending row set down to a page.
    pub(crate) fn finish<T>(&self, mut rows: Vec<T>, id_of: impl Fn(&T) -> i64) -> Page<T> {
        let limit = self.limit as usize;
        if self.limit == 0 || rows.len() <= limit {
            return Page {
                items: rows,
                next_cursor: None,
            };
        }

        rows.truncate(limit);
        let next_cursor = rows.iter().map(&id_of).max().map(|id| id + 1);
        Page {
            items: rows,
            next_cursor,
        }
    }
}

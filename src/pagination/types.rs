//! Page and cursor types

use crate::error::{Error, Result};
use crate::result::Row;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Page size used when none is given
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Validate a caller-supplied page size. Zero and negative sizes are rejected.
pub fn checked_page_size(page_size: i64) -> Result<usize> {
    let size = usize::try_from(page_size).map_err(|_| Error::InvalidPageSize { page_size })?;
    validate_page_size(size)
}

/// The lookahead limit `page_size + 1` has to fit in an `i64`. Sizes beyond
/// `i64::MAX` are reported as `i64::MAX`.
pub(crate) fn validate_page_size(page_size: usize) -> Result<usize> {
    match i64::try_from(page_size) {
        Ok(size) if size > 0 && size < i64::MAX => Ok(page_size),
        Ok(size) => Err(Error::InvalidPageSize { page_size: size }),
        Err(_) => Err(Error::InvalidPageSize {
            page_size: i64::MAX,
        }),
    }
}

/// Position to resume a paged query from.
///
/// Resuming starts *at* this row: the key is sent as `startkey` and, for map
/// views, the document id as `startkey_docid` to break ties between rows
/// sharing the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCursor {
    /// Key of the first row of the next page
    pub start_key: Value,
    /// Document id of the first row of the next page (map views only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_key_doc_id: Option<String>,
}

impl PageCursor {
    /// Create a cursor from a key and optional document id
    pub fn new(start_key: Value, start_key_doc_id: Option<String>) -> Self {
        Self {
            start_key,
            start_key_doc_id,
        }
    }
}

/// One page of view rows
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub(crate) target_page_size: usize,
    pub(crate) rows: Vec<Row>,
    pub(crate) is_last_page: bool,
    pub(crate) next_start_row: Option<Row>,
    pub(crate) next_start_key: Option<Value>,
    pub(crate) next_start_key_doc_id: Option<String>,
    pub(crate) total_rows: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) query_duration: Duration,
}

impl Page {
    /// The requested maximum number of rows
    pub fn target_page_size(&self) -> usize {
        self.target_page_size
    }

    /// Rows of this page, in view order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Take ownership of the rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows on this page
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the page holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the query returned no lookahead row
    pub fn is_last_page(&self) -> bool {
        self.is_last_page
    }

    /// The final row returned by the server: the lookahead row, or the last
    /// row of the last page
    pub fn next_start_row(&self) -> Option<&Row> {
        self.next_start_row.as_ref()
    }

    /// Key to resume from. Meaningless when this is the last page.
    pub fn next_start_key(&self) -> Option<&Value> {
        self.next_start_key.as_ref()
    }

    /// Document id to resume from. Never set for reduced views.
    pub fn next_start_key_doc_id(&self) -> Option<&str> {
        self.next_start_key_doc_id.as_deref()
    }

    /// Cursor for the page after this one, `None` on the last page
    pub fn cursor(&self) -> Option<PageCursor> {
        if self.is_last_page {
            return None;
        }
        self.next_start_key
            .clone()
            .map(|key| PageCursor::new(key, self.next_start_key_doc_id.clone()))
    }

    /// Total rows in the view, when the server reported it
    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    /// Offset of this page's first row, when the server reported it
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Wall-clock time spent fetching this page
    pub fn query_duration(&self) -> Duration {
        self.query_duration
    }

    /// [`Page::query_duration`] in whole milliseconds
    pub fn query_duration_ms(&self) -> u64 {
        self.query_duration.as_millis() as u64
    }

    /// Convert every row with a caller-supplied parser
    pub fn parse_rows<T, F>(&self, parser: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row) -> Result<T>,
    {
        self.rows.iter().map(parser).collect()
    }

    /// Deserialize every row's value
    pub fn values_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.parse_rows(Row::value_as::<T>)
    }

    /// Deserialize every row's document (requires `include_docs`)
    pub fn docs_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.parse_rows(Row::doc_as::<T>)
    }
}

//! Typed access to one raw view response

use super::row::Row;
use crate::error::{Error, Result};
use crate::query::QueryString;
use crate::types::JsonObject;
use serde_json::Value;

const PROP_ROWS: &str = "rows";
// Only present for map views that are not ad-hoc
const PROP_TOTAL_ROWS: &str = "total_rows";
const PROP_OFFSET: &str = "offset";
const PROP_UPDATE_SEQ: &str = "update_seq";

/// The response to a single view invocation.
///
/// Owns the raw response body and converts rows on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewResult {
    body: JsonObject,
    query: QueryString,
}

impl ViewResult {
    /// Wrap a response body, checking that it carries a `rows` array
    pub fn from_json(body: Value, query: QueryString) -> Result<Self> {
        let Value::Object(body) = body else {
            return Err(Error::decode(format!(
                "view response is not a JSON object: {body}"
            )));
        };
        if !body.get(PROP_ROWS).is_some_and(Value::is_array) {
            return Err(Error::decode("view response has no 'rows' array"));
        }
        Ok(Self { body, query })
    }

    fn raw_rows(&self) -> &[Value] {
        self.body
            .get(PROP_ROWS)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of rows in this response, not across all pages
    pub fn row_count(&self) -> usize {
        self.raw_rows().len()
    }

    /// Total rows in the view. Absent for reduced and ad-hoc views.
    pub fn total_rows(&self) -> Result<u64> {
        self.required_u64(PROP_TOTAL_ROWS)
    }

    /// Offset of the first returned row. Absent for reduced and ad-hoc views.
    pub fn offset(&self) -> Result<u64> {
        self.required_u64(PROP_OFFSET)
    }

    /// Index update sequence, when requested with `update_seq=true`
    pub fn update_seq(&self) -> Option<&Value> {
        self.body.get(PROP_UPDATE_SEQ)
    }

    /// Convert every raw row, in order
    pub fn rows(&self) -> Result<Vec<Row>> {
        self.raw_rows().iter().map(Row::from_json).collect()
    }

    /// The query string this result was produced from
    pub fn query_string(&self) -> &QueryString {
        &self.query
    }

    /// The raw response body
    pub fn raw(&self) -> &JsonObject {
        &self.body
    }

    fn required_u64(&self, field: &str) -> Result<u64> {
        match self.body.get(field) {
            None | Some(Value::Null) => Err(Error::missing_field(field)),
            Some(value) => value
                .as_u64()
                .ok_or_else(|| Error::decode(format!("'{field}' is not an unsigned integer: {value}"))),
        }
    }
}

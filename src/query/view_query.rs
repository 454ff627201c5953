//! The view query specification and its compiler
//!
//! A [`ViewQuery`] describes one invocation of a view: which view, and the
//! filter/paging options to send with it. It compiles deterministically to a
//! [`QueryString`] with parameters in a fixed order.

use super::key::KeyParam;
use super::types::{QueryString, Staleness, ViewName};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Filter and paging options for one view invocation
///
/// Clone-on-advance: the pagination engine never mutates a query it was
/// given, it clones and adjusts the clone for each page.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewQuery {
    view: ViewName,
    key: Option<KeyParam>,
    start_key: Option<KeyParam>,
    start_key_doc_id: Option<String>,
    end_key: Option<KeyParam>,
    end_key_doc_id: Option<String>,
    limit: Option<u64>,
    stale: Option<Staleness>,
    descending: Option<bool>,
    skip: Option<u64>,
    group: Option<bool>,
    group_level: Option<u32>,
    reduce: Option<bool>,
    include_docs: Option<bool>,
    inclusive_end: Option<bool>,
    update_seq: Option<bool>,
}

impl ViewQuery {
    /// Create a query for a view. `reduce` defaults to `false`.
    pub fn new(view: ViewName) -> Self {
        Self {
            view,
            key: None,
            start_key: None,
            start_key_doc_id: None,
            end_key: None,
            end_key_doc_id: None,
            limit: None,
            stale: None,
            descending: None,
            skip: None,
            group: None,
            group_level: None,
            reduce: Some(false),
            include_docs: None,
            inclusive_end: None,
            update_seq: None,
        }
    }

    /// Query a view in a design document
    pub fn design(design_doc: impl Into<String>, view: impl Into<String>) -> Self {
        Self::new(ViewName::design(design_doc, view))
    }

    /// Query the `_all_docs` index
    pub fn all_docs() -> Self {
        Self::new(ViewName::AllDocs)
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    /// Only return rows whose key equals `key`
    #[must_use]
    pub fn with_key<K: Serialize + ?Sized>(mut self, key: &K) -> Self {
        self.key = Some(KeyParam::from_serialize(key));
        self
    }

    /// Start the range at `key`
    #[must_use]
    pub fn with_start_key<K: Serialize + ?Sized>(mut self, key: &K) -> Self {
        self.start_key = Some(KeyParam::from_serialize(key));
        self
    }

    /// Start the range at an already-structured JSON key
    #[must_use]
    pub fn with_start_key_json(mut self, key: Value) -> Self {
        self.start_key = Some(KeyParam::Json(key));
        self
    }

    /// Break ties on the start key by document id (map views only)
    #[must_use]
    pub fn with_start_key_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.start_key_doc_id = Some(doc_id.into());
        self
    }

    /// End the range at `key`
    #[must_use]
    pub fn with_end_key<K: Serialize + ?Sized>(mut self, key: &K) -> Self {
        self.end_key = Some(KeyParam::from_serialize(key));
        self
    }

    /// End the range at an already-structured JSON key
    #[must_use]
    pub fn with_end_key_json(mut self, key: Value) -> Self {
        self.end_key = Some(KeyParam::Json(key));
        self
    }

    /// Break ties on the end key by document id (map views only)
    #[must_use]
    pub fn with_end_key_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.end_key_doc_id = Some(doc_id.into());
        self
    }

    /// Cap the number of returned rows
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Allow a stale index
    #[must_use]
    pub fn with_stale(mut self, stale: Staleness) -> Self {
        self.stale = Some(stale);
        self
    }

    /// Reverse the row order
    #[must_use]
    pub fn with_descending(mut self, descending: bool) -> Self {
        self.descending = Some(descending);
        self
    }

    /// Skip this many rows before returning results
    #[must_use]
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Group reduced rows by their full key
    #[must_use]
    pub fn with_group(mut self, group: bool) -> Self {
        self.group = Some(group);
        self
    }

    /// Group reduced rows by the first `level` elements of an array key
    #[must_use]
    pub fn with_group_level(mut self, level: u32) -> Self {
        self.group_level = Some(level);
        self
    }

    /// Run the view's reduce function
    #[must_use]
    pub fn with_reduce(mut self, reduce: bool) -> Self {
        self.reduce = Some(reduce);
        self
    }

    /// Include each row's source document
    #[must_use]
    pub fn with_include_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = Some(include_docs);
        self
    }

    /// Whether rows matching the end key are included
    #[must_use]
    pub fn with_inclusive_end(mut self, inclusive_end: bool) -> Self {
        self.inclusive_end = Some(inclusive_end);
        self
    }

    /// Ask the server to report the index update sequence
    #[must_use]
    pub fn with_update_seq(mut self, update_seq: bool) -> Self {
        self.update_seq = Some(update_seq);
        self
    }

    /// Drop any `skip` setting
    #[must_use]
    pub fn without_skip(mut self) -> Self {
        self.skip = None;
        self
    }

    /// Drop any start key tie-breaker
    #[must_use]
    pub fn without_start_key_doc_id(mut self) -> Self {
        self.start_key_doc_id = None;
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The view this query runs against
    pub fn view(&self) -> &ViewName {
        &self.view
    }

    /// Exact-match key, if set and encodable
    pub fn key(&self) -> Option<&Value> {
        self.key.as_ref().and_then(KeyParam::json)
    }

    /// Start key, if set and encodable
    pub fn start_key(&self) -> Option<&Value> {
        self.start_key.as_ref().and_then(KeyParam::json)
    }

    /// Start key tie-breaker
    pub fn start_key_doc_id(&self) -> Option<&str> {
        self.start_key_doc_id.as_deref()
    }

    /// End key, if set and encodable
    pub fn end_key(&self) -> Option<&Value> {
        self.end_key.as_ref().and_then(KeyParam::json)
    }

    /// End key tie-breaker
    pub fn end_key_doc_id(&self) -> Option<&str> {
        self.end_key_doc_id.as_deref()
    }

    /// Row cap
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Accepted index staleness
    pub fn stale(&self) -> Option<Staleness> {
        self.stale
    }

    /// Whether rows come back in reverse order
    pub fn descending(&self) -> Option<bool> {
        self.descending
    }

    /// Rows skipped before the first result
    pub fn skip(&self) -> Option<u64> {
        self.skip
    }

    /// Whether reduced rows are grouped by full key
    pub fn group(&self) -> Option<bool> {
        self.group
    }

    /// Array key prefix length used for grouping
    pub fn group_level(&self) -> Option<u32> {
        self.group_level
    }

    /// Whether source documents are included
    pub fn include_docs(&self) -> Option<bool> {
        self.include_docs
    }

    /// Whether the end key itself is included
    pub fn inclusive_end(&self) -> Option<bool> {
        self.inclusive_end
    }

    /// Whether the update sequence is requested
    pub fn update_seq(&self) -> Option<bool> {
        self.update_seq
    }

    /// Whether the reduce function runs. An unset value counts as `false`.
    pub fn is_reduced(&self) -> bool {
        self.reduce.unwrap_or(false)
    }

    // ------------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------------

    /// Compile the options into a query string.
    ///
    /// Parameters are emitted in a fixed order (`key`, `startkey`,
    /// `startkey_docid`, `endkey`, `endkey_docid`, `limit`, `stale`,
    /// `descending`, `skip`, `group`, `group_level`, `reduce`,
    /// `include_docs`, `inclusive_end`, `update_seq`), unset options are
    /// omitted. Structured keys are JSON encoded. Nothing is returned if any
    /// key fails to encode.
    pub fn compile(&self) -> Result<QueryString> {
        if self.is_reduced() && (self.start_key_doc_id.is_some() || self.end_key_doc_id.is_some())
        {
            return Err(Error::invalid_query(
                "startkey_docid/endkey_docid cannot be combined with reduce=true",
            ));
        }

        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(key) = &self.key {
            params.push(("key", key.encode("key")?));
        }
        if let Some(start_key) = &self.start_key {
            params.push(("startkey", start_key.encode("startkey")?));
        }
        if let Some(doc_id) = &self.start_key_doc_id {
            params.push(("startkey_docid", doc_id.clone()));
        }
        if let Some(end_key) = &self.end_key {
            params.push(("endkey", end_key.encode("endkey")?));
        }
        if let Some(doc_id) = &self.end_key_doc_id {
            params.push(("endkey_docid", doc_id.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(stale) = self.stale {
            params.push(("stale", stale.as_str().to_string()));
        }
        if let Some(descending) = self.descending {
            params.push(("descending", descending.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("skip", skip.to_string()));
        }
        if let Some(group) = self.group {
            params.push(("group", group.to_string()));
        }
        if let Some(level) = self.group_level {
            params.push(("group_level", level.to_string()));
        }
        if let Some(reduce) = self.reduce {
            params.push(("reduce", reduce.to_string()));
        }
        if let Some(include_docs) = self.include_docs {
            params.push(("include_docs", include_docs.to_string()));
        }
        if let Some(inclusive_end) = self.inclusive_end {
            params.push(("inclusive_end", inclusive_end.to_string()));
        }
        if let Some(update_seq) = self.update_seq {
            params.push(("update_seq", update_seq.to_string()));
        }

        let compiled = QueryString::from_params(&params);
        debug!(view = %self.view, query = %compiled, "Compiled view query");
        Ok(compiled)
    }
}

//! View identity, staleness and compiled query string types

use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

/// Identifies which view of a database a query runs against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewName {
    /// A view defined in a design document
    Design {
        /// Design document name, without the `_design/` prefix
        design_doc: String,
        /// View name within the design document
        view: String,
    },

    /// The built-in index over every document (`_all_docs`)
    AllDocs,

    /// The built-in index over design documents (`_design_docs`)
    DesignDocs,

    /// A temporary view defined inline by its functions (`_temp_view`)
    AdHoc {
        /// Map function source
        map: String,
        /// Optional reduce function source
        reduce: Option<String>,
    },
}

impl ViewName {
    /// Create a design document view name
    pub fn design(design_doc: impl Into<String>, view: impl Into<String>) -> Self {
        Self::Design {
            design_doc: design_doc.into(),
            view: view.into(),
        }
    }

    /// Create an ad-hoc view from a map function
    pub fn ad_hoc(map: impl Into<String>) -> Self {
        Self::AdHoc {
            map: map.into(),
            reduce: None,
        }
    }

    /// Path segments below the database, unescaped
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Design { design_doc, view } => {
                vec!["_design", design_doc.as_str(), "_view", view.as_str()]
            }
            Self::AllDocs => vec!["_all_docs"],
            Self::DesignDocs => vec!["_design_docs"],
            Self::AdHoc { .. } => vec!["_temp_view"],
        }
    }

    /// Is this a temporary (ad-hoc) view?
    pub fn is_ad_hoc(&self) -> bool {
        matches!(self, Self::AdHoc { .. })
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdHoc { .. } => f.write_str("_temp_view"),
            _ => f.write_str(&self.segments().join("/")),
        }
    }
}

/// Whether the server may answer from an index that is not up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Staleness {
    /// Never refresh the index for this request (`stale=ok`)
    AllowStale,
    /// Answer from the stale index, then refresh it (`stale=update_after`)
    UpdateAfter,
}

impl Staleness {
    /// Value used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllowStale => "ok",
            Self::UpdateAfter => "update_after",
        }
    }
}

/// A compiled, URL-escaped query string (without the leading `?`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryString(String);

impl QueryString {
    /// Join `name=value` pairs with `&`, escaping each value
    pub(crate) fn from_params(params: &[(&str, String)]) -> Self {
        let joined = params
            .iter()
            .map(|(name, value)| {
                let escaped: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
                format!("{name}={escaped}")
            })
            .collect::<Vec<_>>()
            .join("&");
        Self(joined)
    }

    /// Borrow the query string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no parameter was set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the parameters back into `(name, value)` pairs, in order
    pub fn params(&self) -> Vec<(String, String)> {
        form_urlencoded::parse(self.0.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Look up a decoded parameter by name
    pub fn get(&self, name: &str) -> Option<String> {
        self.params()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Consume into the underlying string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueryString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

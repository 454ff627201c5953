//! Query specification module
//!
//! # Overview
//!
//! A [`ViewQuery`] holds the filter and paging intent for one view
//! invocation and compiles it to a canonical [`QueryString`]:
//!
//! ```rust
//! use couchview::query::ViewQuery;
//!
//! let compiled = ViewQuery::design("music", "by_artist")
//!     .with_start_key("foo")
//!     .with_limit(10)
//!     .compile()
//!     .unwrap();
//! assert_eq!(compiled.as_str(), "startkey=%22foo%22&limit=10&reduce=false");
//! ```

mod key;
mod types;
mod view_query;

pub use types::{QueryString, Staleness, ViewName};
pub use view_query::ViewQuery;

#[cfg(test)]
mod tests;

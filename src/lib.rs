//! # couchview
//!
//! Cursor-based pagination over CouchDB-style sorted view indexes.
//!
//! ## Features
//!
//! - **View queries**: Build and compile view query strings with JSON keys
//! - **Result parsing**: Typed access to rows, totals and offsets
//! - **Lookahead paging**: Gap-free, duplicate-free pages over non-unique keys
//! - **HTTP transport**: Retries, backoff, rate limiting and auth
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use couchview::config::ClientConfig;
//! use couchview::pagination::PageableView;
//! use couchview::query::ViewQuery;
//!
//! #[tokio::main]
//! async fn main() -> couchview::Result<()> {
//!     let config = ClientConfig::new("http://localhost:5984", "music");
//!     let query = ViewQuery::design("app", "by_artist").with_start_key("B");
//!     let view = PageableView::with_page_size(config.executor()?, query, 100)?;
//!
//!     let mut pages = view.pages();
//!     while let Some(page) = pages.try_next_page().await? {
//!         for row in page.rows() {
//!             println!("{} {}", row.key(), row.value());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  PageableView ── pages() ──> Pages ── next_page() ──> Page │
//! └───────────────────────────────────────────────────────────┘
//!          │ ViewQuery::compile()          ▲ ViewResult::rows()
//!          ▼                               │
//! ┌───────────────────────────────────────────────────────────┐
//! │  ViewExecutor (HttpViewExecutor: HttpClient + auth)        │
//! └───────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// View query specification and compiler
pub mod query;

/// View result and row parsing
pub mod result;

/// Lookahead pagination engine
pub mod pagination;

/// View executors
pub mod executor;

/// HTTP client with retry and rate limiting
pub mod http;

/// Authentication
pub mod auth;

/// Client configuration
pub mod config;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use executor::{HttpViewExecutor, ViewExecutor};
pub use pagination::{Page, PageCursor, PageableView, Pages};
pub use query::{QueryString, Staleness, ViewName, ViewQuery};
pub use result::{Row, ViewResult};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

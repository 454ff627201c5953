//! Pagination module
//!
//! # Overview
//!
//! [`PageableView`] walks a view index one page at a time. It asks for one
//! row more than the page size; that lookahead row tells it whether another
//! page exists and where it starts. The next request resumes *at* the
//! lookahead row using `startkey` plus, for map views, `startkey_docid`, so
//! rows sharing a key are never skipped or repeated across pages.
//!
//! ```rust,ignore
//! use couchview::pagination::PageableView;
//! use couchview::query::ViewQuery;
//!
//! let view = PageableView::with_page_size(executor, ViewQuery::design("app", "by_date"), 100)?;
//! let mut pages = view.pages();
//! while let Some(page) = pages.try_next_page().await? {
//!     for row in page.rows() {
//!         println!("{} => {}", row.key(), row.value());
//!     }
//! }
//! ```

mod pager;
mod types;

pub use pager::{PageableView, Pages};
pub use types::{checked_page_size, Page, PageCursor, DEFAULT_PAGE_SIZE};

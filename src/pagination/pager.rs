//! The lookahead pagination engine
//!
//! Each page is fetched with `limit = page_size + 1`. The extra (lookahead)
//! row proves that more data exists and supplies the cursor for the next
//! request; it is withheld from the current page and comes back as the
//! first row of the next one.

use super::types::{validate_page_size, Page, PageCursor, DEFAULT_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::executor::ViewExecutor;
use crate::query::ViewQuery;
use crate::result::Row;
use futures::Stream;
use std::time::Instant;
use tracing::debug;

/// Pages through every row a view query matches.
///
/// The view itself is reusable: each call to [`PageableView::pages`] starts
/// a fresh, forward-only iteration from the beginning.
#[derive(Debug, Clone)]
pub struct PageableView<E> {
    executor: E,
    query: ViewQuery,
    page_size: usize,
}

impl<E: ViewExecutor> PageableView<E> {
    /// Page through `query` with the default page size
    pub fn new(executor: E, query: ViewQuery) -> Self {
        Self {
            executor,
            query,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page through `query` with `page_size` rows per page.
    ///
    /// Zero is rejected, as is any size whose lookahead limit would not fit
    /// in an `i64`.
    pub fn with_page_size(executor: E, query: ViewQuery, page_size: usize) -> Result<Self> {
        Ok(Self {
            executor,
            query,
            page_size: validate_page_size(page_size)?,
        })
    }

    /// Rows per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The caller's query, never modified by paging
    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    /// The executor running each page query
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Start iterating from the first row
    pub fn pages(&self) -> Pages<'_, E> {
        Pages::new(self, None)
    }

    /// Start iterating at a saved cursor
    pub fn pages_from(&self, cursor: PageCursor) -> Pages<'_, E> {
        Pages::new(self, Some(cursor))
    }

    /// Fetch every page and concatenate the rows
    pub async fn all_rows(&self) -> Result<Vec<Row>> {
        let mut pages = self.pages();
        let mut rows = Vec::new();
        while let Some(page) = pages.try_next_page().await? {
            rows.extend(page.into_rows());
        }
        Ok(rows)
    }

    /// The query sent for the page starting at `cursor`.
    ///
    /// The caller's query is cloned; the limit becomes `page_size + 1`. With
    /// a cursor, `skip` is dropped and the cursor key becomes `startkey`. The
    /// cursor doc id becomes `startkey_docid` for map views only, since
    /// reduced rows have no source document.
    fn page_query(&self, cursor: Option<&PageCursor>) -> ViewQuery {
        let mut query = self.query.clone().with_limit(self.lookahead_limit() as u64);

        if let Some(cursor) = cursor {
            query = query
                .with_start_key_json(cursor.start_key.clone())
                .without_start_key_doc_id()
                .without_skip();

            if let Some(doc_id) = &cursor.start_key_doc_id {
                if !query.is_reduced() {
                    query = query.with_start_key_doc_id(doc_id.clone());
                }
            }
        }

        query
    }

    /// `page_size + 1`; cannot overflow once the size has been validated
    fn lookahead_limit(&self) -> usize {
        self.page_size.saturating_add(1)
    }

    /// Fetch one page. Nothing is modified on failure.
    async fn fetch(&self, cursor: Option<&PageCursor>) -> Result<Page> {
        let started = Instant::now();
        let limit = self.lookahead_limit();
        let query = self.page_query(cursor);
        let compiled = query.compile()?;

        let result = self.executor.query_view(query.view(), &compiled).await?;
        let mut rows = result.rows()?;
        rows.truncate(limit);

        let is_last_page = rows.len() < limit;
        let next_start_row = rows.last().cloned();
        let next_start_key = next_start_row.as_ref().map(|row| row.key().clone());
        let next_start_key_doc_id = if query.is_reduced() {
            None
        } else {
            next_start_row
                .as_ref()
                .and_then(|row| row.id().map(str::to_owned))
        };

        if !is_last_page {
            rows.pop();
        }

        let page = Page {
            target_page_size: self.page_size,
            rows,
            is_last_page,
            next_start_row,
            next_start_key,
            next_start_key_doc_id,
            total_rows: optional_field(result.total_rows())?,
            offset: optional_field(result.offset())?,
            query_duration: started.elapsed(),
        };

        debug!(
            view = %query.view(),
            rows = page.len(),
            last = page.is_last_page(),
            duration_ms = page.query_duration_ms(),
            "Fetched page"
        );

        Ok(page)
    }
}

/// Absent metadata (reduced and ad-hoc views) becomes `None`; a malformed
/// value is still an error.
fn optional_field(value: Result<u64>) -> Result<Option<u64>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(Error::MissingField { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[derive(Debug)]
enum PagerState {
    /// Nothing buffered; the next fetch starts at `cursor` (or the beginning)
    Ready { cursor: Option<PageCursor> },
    /// Fetched by `has_next` but not yet handed out
    Buffered(Page),
    /// The last page has been handed out
    Exhausted,
}

/// A single forward-only pass over a [`PageableView`].
///
/// Pages are fetched on demand, one at a time. A failed fetch leaves the
/// cursor where it was, so calling again retries the same page.
#[derive(Debug)]
pub struct Pages<'a, E> {
    view: &'a PageableView<E>,
    state: PagerState,
    pages_fetched: usize,
}

impl<'a, E: ViewExecutor> Pages<'a, E> {
    fn new(view: &'a PageableView<E>, cursor: Option<PageCursor>) -> Self {
        Self {
            view,
            state: PagerState::Ready { cursor },
            pages_fetched: 0,
        }
    }

    /// Number of pages fetched from the server so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// True once the last page has been handed out
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, PagerState::Exhausted)
    }

    /// Whether another page is available, fetching it if needed.
    ///
    /// Never fetches after the last page has been handed out.
    pub async fn has_next(&mut self) -> Result<bool> {
        let cursor = match &self.state {
            PagerState::Buffered(_) => return Ok(true),
            PagerState::Exhausted => return Ok(false),
            PagerState::Ready { cursor } => cursor.clone(),
        };

        let page = self.view.fetch(cursor.as_ref()).await?;
        self.pages_fetched += 1;
        self.state = PagerState::Buffered(page);
        Ok(true)
    }

    /// The next page, or `None` once the view is exhausted
    pub async fn try_next_page(&mut self) -> Result<Option<Page>> {
        if !self.has_next().await? {
            return Ok(None);
        }

        match std::mem::replace(&mut self.state, PagerState::Exhausted) {
            PagerState::Buffered(page) => {
                if let Some(cursor) = page.cursor() {
                    self.state = PagerState::Ready {
                        cursor: Some(cursor),
                    };
                }
                Ok(Some(page))
            }
            other => {
                self.state = other;
                Ok(None)
            }
        }
    }

    /// The next page; asking past the last page is an error
    pub async fn next_page(&mut self) -> Result<Page> {
        self.try_next_page().await?.ok_or(Error::PagesExhausted)
    }

    /// Turn this pass into a stream of pages.
    ///
    /// The stream ends after the last page, or right after yielding an error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Page>> + 'a {
        futures::stream::unfold(Some(self), |pages| async move {
            let mut pages = pages?;
            match pages.try_next_page().await {
                Ok(Some(page)) => Some((Ok(page), Some(pages))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

//! View executor module
//!
//! # Overview
//!
//! The pagination engine never talks to the network itself. It hands a view
//! name and a compiled query string to a [`ViewExecutor`] and gets back a
//! [`ViewResult`] or an error. [`HttpViewExecutor`] is the production
//! implementation; tests inject their own.

mod http;

pub use http::HttpViewExecutor;

use crate::error::Result;
use crate::query::{QueryString, ViewName};
use crate::result::ViewResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs one view query against a database
#[async_trait]
pub trait ViewExecutor: Send + Sync {
    /// Execute `query` against `view`.
    ///
    /// Non-success responses must be returned as errors carrying the
    /// server's error code and reason when available.
    async fn query_view(&self, view: &ViewName, query: &QueryString) -> Result<ViewResult>;
}

#[async_trait]
impl<E: ViewExecutor + ?Sized> ViewExecutor for &E {
    async fn query_view(&self, view: &ViewName, query: &QueryString) -> Result<ViewResult> {
        (**self).query_view(view, query).await
    }
}

#[async_trait]
impl<E: ViewExecutor + ?Sized> ViewExecutor for Arc<E> {
    async fn query_view(&self, view: &ViewName, query: &QueryString) -> Result<ViewResult> {
        (**self).query_view(view, query).await
    }
}

#[async_trait]
impl<E: ViewExecutor + ?Sized> ViewExecutor for Box<E> {
    async fn query_view(&self, view: &ViewName, query: &QueryString) -> Result<ViewResult> {
        (**self).query_view(view, query).await
    }
}

#[cfg(test)]
mod tests;

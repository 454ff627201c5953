//! HTTP view executor
//!
//! Maps a view name onto `/{database}/{view path}` below the server URL and
//! runs the query with [`HttpClient`]. Ad-hoc views are POSTed to
//! `_temp_view` with their functions in the body.

use super::ViewExecutor;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::query::{QueryString, ViewName};
use crate::result::ViewResult;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

/// Executes view queries over HTTP against one database
#[derive(Debug)]
pub struct HttpViewExecutor {
    client: HttpClient,
    server: Url,
    database: String,
}

impl HttpViewExecutor {
    /// Create an executor for `database` on the server at `server_url`
    pub fn new(client: HttpClient, server_url: &str, database: impl Into<String>) -> Result<Self> {
        let server = Url::parse(server_url)?;
        if server.cannot_be_a_base() {
            return Err(Error::config(format!(
                "server URL '{server_url}' cannot have a path"
            )));
        }
        let database = database.into();
        if database.is_empty() {
            return Err(Error::config("database name must not be empty"));
        }
        Ok(Self {
            client,
            server,
            database,
        })
    }

    /// The database this executor queries
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Full URL of a view, without query string
    pub fn view_url(&self, view: &ViewName) -> Result<Url> {
        let mut url = self.server.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config("server URL cannot have a path"))?
            .pop_if_empty()
            .push(&self.database)
            .extend(view.segments());
        Ok(url)
    }
}

#[async_trait]
impl ViewExecutor for HttpViewExecutor {
    async fn query_view(&self, view: &ViewName, query: &QueryString) -> Result<ViewResult> {
        let url = self.view_url(view)?;
        let request = RequestConfig::new().query(query.as_str());
        debug!(%url, query = %query, "Querying view");

        let body: Value = match view {
            ViewName::AdHoc { map, reduce } => {
                let mut functions = json!({ "map": map });
                if let Some(reduce) = reduce {
                    functions["reduce"] = json!(reduce);
                }
                self.client
                    .request_json(Method::POST, url, request.json(functions))
                    .await?
            }
            _ => self.client.request_json(Method::GET, url, request).await?,
        };

        ViewResult::from_json(body, query.clone())
    }
}

//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ViewArgs};
use crate::config::{load_config, ClientConfig};
use crate::error::{Error, Result, ResultExt};
use crate::pagination::{checked_page_size, Page, PageableView};
use crate::types::OutputFormat;
use serde_json::json;
use std::io::Write;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, writing to stdout
    pub async fn run(&self) -> Result<()> {
        let mut out = std::io::stdout();
        self.run_to(&mut out).await?;
        out.flush().context("Failed to flush stdout")
    }

    /// Run the CLI command, writing to `out`
    pub async fn run_to<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.cli.command {
            Commands::Query {
                view,
                page_size,
                max_pages,
            } => self.query(view, *page_size, *max_pages, out).await,
            Commands::Compile { view } => self.compile(view, out),
        }
    }

    fn load_config(&self) -> Result<ClientConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;
        load_config(path)
    }

    async fn query<W: Write>(
        &self,
        args: &ViewArgs,
        page_size: Option<i64>,
        max_pages: Option<usize>,
        out: &mut W,
    ) -> Result<()> {
        let query = args.to_query()?;
        let config = self.load_config()?;
        let page_size = match page_size {
            Some(size) => checked_page_size(size)?,
            None => config.page_size()?,
        };

        let view = PageableView::with_page_size(config.executor()?, query, page_size)?;
        let mut pages = view.pages();
        let started = Instant::now();
        let mut total_rows = 0;

        while max_pages.map_or(true, |max| pages.pages_fetched() < max) {
            let Some(page) = pages.try_next_page().await? else {
                break;
            };
            total_rows += page.len();
            self.output_page(pages.pages_fetched(), &page, out)?;
        }

        info!(
            view = %view.query().view(),
            pages = pages.pages_fetched(),
            rows = total_rows,
            duration_ms = started.elapsed().as_millis() as u64,
            "Finished paging"
        );
        Ok(())
    }

    fn compile<W: Write>(&self, args: &ViewArgs, out: &mut W) -> Result<()> {
        let query = args.to_query()?;
        let compiled = query.compile()?;

        match self.cli.format {
            OutputFormat::Json => {
                let msg = json!({
                    "view": query.view(),
                    "query": compiled.as_str(),
                });
                writeln!(out, "{}", serde_json::to_string(&msg)?)?;
            }
            OutputFormat::Pretty => {
                writeln!(out, "view:  {}", query.view())?;
                writeln!(out, "query: ?{compiled}")?;
            }
        }
        Ok(())
    }

    /// Output one page
    fn output_page<W: Write>(&self, number: usize, page: &Page, out: &mut W) -> Result<()> {
        match self.cli.format {
            OutputFormat::Json => {
                for row in page.rows() {
                    writeln!(out, "{}", serde_json::to_string(row)?)?;
                }
            }
            OutputFormat::Pretty => {
                let total = page
                    .total_rows()
                    .map_or_else(|| "?".to_string(), |n| n.to_string());
                writeln!(
                    out,
                    "--- page {number}: {} rows of {total} ({} ms){}",
                    page.len(),
                    page.query_duration_ms(),
                    if page.is_last_page() { ", last" } else { "" }
                )?;
                for row in page.rows() {
                    writeln!(out, "{}", serde_json::to_string_pretty(row)?)?;
                }
            }
        }
        Ok(())
    }
}

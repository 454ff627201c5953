//! CLI commands and argument parsing

use crate::error::{Error, Result};
use crate::query::{Staleness, ViewName, ViewQuery};
use crate::types::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Page through CouchDB views
#[derive(Parser, Debug)]
#[command(name = "couchview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a view
    Query {
        #[command(flatten)]
        view: ViewArgs,

        /// Rows per page (defaults to the config file's page_size)
        #[arg(long, allow_negative_numbers = true)]
        page_size: Option<i64>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Print the compiled query string
    Compile {
        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Stale index mode accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StaleArg {
    /// `stale=ok`
    Ok,
    /// `stale=update_after`
    UpdateAfter,
}

impl From<StaleArg> for Staleness {
    fn from(arg: StaleArg) -> Self {
        match arg {
            StaleArg::Ok => Staleness::AllowStale,
            StaleArg::UpdateAfter => Staleness::UpdateAfter,
        }
    }
}

/// Which view to query and how to filter it
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Design document name (without `_design/`)
    #[arg(long, requires = "view", conflicts_with = "all_docs")]
    pub design: Option<String>,

    /// View name within the design document
    #[arg(long, requires = "design")]
    pub view: Option<String>,

    /// Query `_all_docs` instead of a design view
    #[arg(long)]
    pub all_docs: bool,

    /// Exact key (JSON)
    #[arg(long)]
    pub key: Option<String>,

    /// First key of the range (JSON)
    #[arg(long)]
    pub start_key: Option<String>,

    /// Last key of the range (JSON)
    #[arg(long)]
    pub end_key: Option<String>,

    /// Run the reduce function
    #[arg(long)]
    pub reduce: bool,

    /// Group reduced rows by key
    #[arg(long)]
    pub group: bool,

    /// Group reduced rows by a key prefix
    #[arg(long)]
    pub group_level: Option<u32>,

    /// Reverse the row order
    #[arg(long)]
    pub descending: bool,

    /// Include each row's document
    #[arg(long)]
    pub include_docs: bool,

    /// Skip rows before the first page
    #[arg(long)]
    pub skip: Option<u64>,

    /// Accept a stale index
    #[arg(long, value_enum)]
    pub stale: Option<StaleArg>,
}

impl ViewArgs {
    /// The view these arguments name
    pub fn view_name(&self) -> Result<ViewName> {
        match (&self.design, &self.view, self.all_docs) {
            (_, _, true) => Ok(ViewName::AllDocs),
            (Some(design), Some(view), false) => Ok(ViewName::design(design, view)),
            _ => Err(Error::config(
                "Specify a view with --design and --view, or use --all-docs",
            )),
        }
    }

    /// Build the query these arguments describe
    pub fn to_query(&self) -> Result<ViewQuery> {
        let mut query = ViewQuery::new(self.view_name()?).with_reduce(self.reduce);

        if let Some(key) = &self.key {
            query = query.with_key(&parse_key("--key", key)?);
        }
        if let Some(key) = &self.start_key {
            query = query.with_start_key_json(parse_key("--start-key", key)?);
        }
        if let Some(key) = &self.end_key {
            query = query.with_end_key_json(parse_key("--end-key", key)?);
        }
        if self.group {
            query = query.with_group(true);
        }
        if let Some(level) = self.group_level {
            query = query.with_group_level(level);
        }
        if self.descending {
            query = query.with_descending(true);
        }
        if self.include_docs {
            query = query.with_include_docs(true);
        }
        if let Some(skip) = self.skip {
            query = query.with_skip(skip);
        }
        if let Some(stale) = self.stale {
            query = query.with_stale(stale.into());
        }
        Ok(query)
    }
}

/// Keys are JSON text; a bare word that is not valid JSON is taken as a string
fn parse_key(flag: &str, raw: &str) -> Result<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(_) if !raw.trim().is_empty() && !raw.trim_start().starts_with(['[', '{', '"']) => {
            Ok(Value::String(raw.to_string()))
        }
        Err(e) => Err(Error::config(format!("{flag} is not valid JSON: {e}"))),
    }
}

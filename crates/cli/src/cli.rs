use clap::{Parser, Subcommand};

use dbquery_core::ExportFormat;

/// Terminal client for the db-query service.
///
/// Registers database connections, browses their schema, runs SQL and
/// turns natural-language questions into SQL. With no subcommand an
/// interactive shell is started.
#[derive(Parser, Debug)]
#[command(name = "dbquery", version, about = "Terminal client for the db-query service")]
pub struct CliArgs {
    /// API base URL, e.g. http://localhost:8000/api/v1 (overrides env and config file)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Path to config file (default: ~/.config/dbquery/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List registered connections
    List,
    /// Register a connection, or replace one with the same name
    Add { name: String, url: String },
    /// Show a connection's tables and fields
    Show { name: String },
    /// Delete a connection
    Remove { name: String },
    /// Re-read a connection's schema from the database
    Refresh { name: String },
    /// Run a SQL statement
    Query { db: String, sql: String },
    /// Translate a question into SQL
    Ask {
        db: String,
        prompt: String,
        /// Model id to use instead of the configured default
        #[arg(long)]
        model: Option<String>,
        /// Execute the generated SQL as well
        #[arg(long)]
        run: bool,
    },
    /// Run a SQL statement and save the result as a file
    Export {
        db: String,
        sql: String,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Output path (default: query_result.<format>)
        #[arg(long)]
        output: Option<String>,
    },
    /// List available LLM models
    Models,
    /// Set a field's display name
    Annotate {
        db: String,
        table: String,
        field: String,
        name: String,
    },
    /// Interactive shell (default)
    Shell,
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Shell)
    }
}

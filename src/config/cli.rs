use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_DEDUP_WINDOW_MS, DEFAULT_TIMEOUT_SECONDS};
use crate::core::export::Delimiter;
use crate::domain::model::EntityKind;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "sge-admin")]
#[command(about = "Administrative client for the SGE academic records API")]
pub struct CliConfig {
    /// API base URL (overrides the config file)
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every record of a collection as JSON
    List { entity: EntityKind },

    /// Fetch one record; composite keys take two values
    Get {
        entity: EntityKind,
        #[arg(required = true, num_args = 1..=2)]
        key: Vec<String>,
    },

    /// Create a record from a JSON payload
    Create {
        entity: EntityKind,
        #[arg(long)]
        data: String,
    },

    /// Replace a record with a JSON payload
    Update {
        entity: EntityKind,
        #[arg(required = true, num_args = 1..=2)]
        key: Vec<String>,
        #[arg(long)]
        data: String,
    },

    /// Delete a record
    Delete {
        entity: EntityKind,
        #[arg(required = true, num_args = 1..=2)]
        key: Vec<String>,
    },

    /// Render a collection as CSV or TSV with localized dates
    Export {
        entity: EntityKind,
        #[arg(long, value_enum, default_value = "csv")]
        format: Delimiter,
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Collection counts and the backend dashboard report
    Dashboard,

    /// Backend reports
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
    },

    /// Convert between ISO and localized date text
    Date {
        #[command(subcommand)]
        command: DateCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    CourseStatistics,
    OffersComplete,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DateCommand {
    /// DD/MM/YYYY (or month-first when unambiguous) to YYYY-MM-DD
    ToIso { text: String },
    /// YYYY-MM-DD to DD/MM/YYYY
    ToLocalized { text: String },
}

impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn default_headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    fn dedup_window(&self) -> Duration {
        Duration::from_millis(DEFAULT_DEDUP_WINDOW_MS)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("--api-base-url", self.api_base_url())?;
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("--timeout-seconds", timeout, 1)?;
        }
        Ok(())
    }
}

//! Command line arguments.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crm_api::{DateRange, MarkRange};
use sendout::history::DEFAULT_GROUP_THRESHOLD_SECS;

#[derive(Debug, Parser)]
#[command(name = "clientiq")]
#[command(about = "ClientIQ dashboard data and WhatsApp template sendouts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the access token
    Login {
        #[arg(long, env = "CLIENTIQ_USERNAME")]
        username: String,

        #[arg(long, env = "CLIENTIQ_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Remove the stored access token
    Logout,

    /// Check messaging API readiness
    Health,

    /// List message templates
    Templates,

    /// Send a template to a list of phone numbers
    Send(SendArgs),

    /// Message history with filters, grouping and export
    Stats(StatsArgs),

    /// Dashboard KPI summary and mark distributions
    Summary(RangeArgs),

    /// List clients filtered by their marks
    Clients(ClientsArgs),
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Template name (defaults to the first template in the catalog)
    #[arg(long)]
    pub template: Option<String>,

    /// Phone numbers separated by newlines, commas or semicolons
    #[arg(long)]
    pub numbers: Option<String>,

    /// Single-column CSV file with one phone number per row
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Concurrent workers (overrides SENDOUT_WORKERS)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log what would be sent without calling the messaging API
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn default_file(self) -> &'static str {
        match self {
            ExportFormat::Csv => "whatsapp_statistics.csv",
            ExportFormat::Json => "whatsapp_statistics.json",
        }
    }
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Only messages with this status (case-insensitive)
    #[arg(long)]
    pub status: Option<String>,

    /// Only messages using this template
    #[arg(long)]
    pub template: Option<String>,

    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Gap in seconds that separates two sendouts
    #[arg(long, default_value_t = DEFAULT_GROUP_THRESHOLD_SECS)]
    pub group_secs: i64,

    /// List individual messages instead of sendout groups
    #[arg(long)]
    pub no_group: bool,

    /// Maximum number of messages to fetch
    #[arg(long)]
    pub limit: Option<u32>,

    /// Write the filtered messages to a file
    #[arg(long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Export destination
    #[arg(long, requires = "export")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Range start (YYYY-MM-DD, default: six months before the end)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn resolve(&self) -> crm_api::Result<DateRange> {
        self.resolve_at(Utc::now().date_naive())
    }

    fn resolve_at(&self, today: NaiveDate) -> crm_api::Result<DateRange> {
        let end = self.end.unwrap_or(today);
        match self.start {
            Some(start) => DateRange::new(start, end),
            None => Ok(DateRange::last_months(end, 6)),
        }
    }
}

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    #[arg(long)]
    pub min_engage: Option<f64>,
    #[arg(long)]
    pub max_engage: Option<f64>,
    #[arg(long)]
    pub min_purchase: Option<f64>,
    #[arg(long)]
    pub max_purchase: Option<f64>,
    #[arg(long)]
    pub min_churn: Option<f64>,
    #[arg(long)]
    pub max_churn: Option<f64>,
    #[arg(long)]
    pub min_ltv: Option<f64>,
    #[arg(long)]
    pub max_ltv: Option<f64>,

    /// Maximum rows to print
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

/// Narrow `base` with optional bounds.
pub fn narrow(base: MarkRange, min: Option<f64>, max: Option<f64>) -> MarkRange {
    MarkRange::new(min.unwrap_or(base.min), max.unwrap_or(base.max))
}

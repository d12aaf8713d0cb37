#![forbid(unsafe_code)]

//! `enrolldesk` — front-desk CLI for the school CRM data layer.
//!
//! Bootstraps configuration and the HTTP backend client, then drives the
//! directory, conversion, analytics, or visitor-token flows from the
//! command line.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use enrolldesk::analytics::{self, Dimension};
use enrolldesk::client::http::HttpBackendClient;
use enrolldesk::client::{BackendClient, CustomerQuery};
use enrolldesk::convert::ConversionOrchestrator;
use enrolldesk::counter::{DailyCounterTokenizer, FileCounterStore};
use enrolldesk::directory::{CustomerDirectory, RefreshMode};
use enrolldesk::models::entity::EntityId;
use enrolldesk::models::page::Exactness;
use enrolldesk::{AppError, GlobalConfig, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// CLI-side mirror of [`Dimension`], kept local so the library enum does
/// not carry a clap derive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum CliDimension {
    Kind,
    Type,
    Priority,
    Status,
    Source,
}

impl From<CliDimension> for Dimension {
    fn from(d: CliDimension) -> Self {
        match d {
            CliDimension::Kind => Self::Kind,
            CliDimension::Type => Self::Type,
            CliDimension::Priority => Self::Priority,
            CliDimension::Status => Self::Status,
            CliDimension::Source => Self::Source,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "enrolldesk", about = "School CRM front-desk tooling", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List customers with optional filters.
    Customers {
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Filter by status tag.
        #[arg(long)]
        status: Option<String>,
        /// Filter by customer type.
        #[arg(long = "type")]
        customer_type: Option<String>,
        /// Filter by priority tag.
        #[arg(long)]
        priority: Option<String>,
        /// Free-text search term.
        #[arg(long)]
        search: Option<String>,
    },

    /// List customers not yet converted to students.
    Unconverted {
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// List students that originated from conversions.
    Converted {
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Convert a customer into a student.
    Convert {
        /// Customer id.
        id: String,
        /// Reason recorded with the conversion.
        #[arg(long, default_value = "front desk conversion")]
        reason: String,
        /// Admission number; generated when omitted.
        #[arg(long)]
        admission_no: Option<String>,
        /// Override the given name derived from the customer record.
        #[arg(long)]
        first_name: Option<String>,
        /// Override the family name derived from the customer record.
        #[arg(long)]
        last_name: Option<String>,
        /// Override the email derived from the customer record.
        #[arg(long)]
        email: Option<String>,
    },

    /// Conversion analytics for a reporting period.
    Analytics {
        /// Reporting period, for example `30d`.
        #[arg(long)]
        period: Option<String>,
    },

    /// Breakdown of the current customer list by a dimension.
    Breakdown {
        /// Field to group by.
        #[arg(long, value_enum, default_value_t = CliDimension::Type)]
        by: CliDimension,
        /// 1-based page number to aggregate over.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Issue a front-desk visitor token for a customer.
    Token {
        /// Customer id.
        id: String,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("enrolldesk bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials();
    info!("configuration loaded");

    let client: Arc<dyn BackendClient> = Arc::new(HttpBackendClient::new(&config.backend)?);
    let mut directory = CustomerDirectory::new(Arc::clone(&client), config.page_size);

    match args.command {
        Command::Customers {
            page,
            status,
            customer_type,
            priority,
            search,
        } => {
            let query = CustomerQuery {
                page,
                limit: config.page_size,
                status,
                customer_type,
                priority,
                search,
            };
            let result = directory.fetch_customers(query).await?;
            print_meta(result.meta);
            for entity in &result.items {
                println!(
                    "{}  {}  [{}]",
                    entity.id,
                    entity.display_name,
                    entity.status.as_deref().unwrap_or("-")
                );
            }
        }

        Command::Unconverted { page } => {
            let meta = directory.load_unconverted(page, RefreshMode::Replace).await?;
            print_meta(meta);
            for entity in directory.unconverted() {
                println!("{}  {}", entity.id, entity.display_name);
            }
        }

        Command::Converted { page } => {
            let meta = directory.load_converted(page, RefreshMode::Replace).await?;
            print_meta(meta);
            for entity in directory.converted() {
                println!(
                    "{}  {}  {}",
                    entity.id,
                    entity.display_name,
                    entity.admission_no.as_deref().unwrap_or("-")
                );
            }
        }

        Command::Convert {
            id,
            reason,
            admission_no,
            first_name,
            last_name,
            email,
        } => {
            let customer = directory.fetch_customer(EntityId::from(id.as_str())).await?;
            let mut orchestrator = ConversionOrchestrator::new(Arc::clone(&client));
            orchestrator.select(customer)?;

            let form = orchestrator.form_mut();
            form.conversion_reason = reason;
            if let Some(value) = admission_no {
                form.admission_no = value;
            }
            if let Some(value) = first_name {
                form.first_name = value;
            }
            if let Some(value) = last_name {
                form.last_name = value;
            }
            if let Some(value) = email {
                form.email = value;
            }

            let student = orchestrator.submit(&mut directory).await?;
            println!(
                "converted: {} -> student {} ({})",
                id,
                student.id,
                student.admission_no.as_deref().unwrap_or("-")
            );
        }

        Command::Analytics { period } => {
            let period = period.unwrap_or_else(|| config.analytics_period.clone());
            let report = directory.conversion_analytics(&period).await?;
            println!(
                "period {period}: {} customers, {} converted ({:.1}%), {} recent",
                report.total_customers,
                report.converted_customers,
                report.conversion_rate,
                report.recent_conversions
            );
            for point in &report.conversion_trend {
                println!("  {}  {}", point.date, point.conversions);
            }
        }

        Command::Breakdown { by, page } => {
            let query = CustomerQuery::page(page, config.page_size);
            let result = directory.fetch_customers(query).await?;
            for row in analytics::aggregate(&result.items, by.into()) {
                println!("{:<16} {:>5}  {:.1}%", row.key, row.count, row.percentage);
            }
        }

        Command::Token { id } => {
            let customer = directory.fetch_customer(EntityId::from(id.as_str())).await?;
            let tokenizer =
                DailyCounterTokenizer::new(FileCounterStore::new(config.storage_dir.clone()));
            let token = tokenizer.issue(&customer)?;
            println!(
                "token #{} for {} at {} {}",
                token.number, token.customer_name, token.date, token.time
            );
        }
    }

    Ok(())
}

fn print_meta(meta: enrolldesk::models::page::PageMeta) {
    match meta.exactness {
        Exactness::Reported => println!(
            "page {}/{} ({} total)",
            meta.page, meta.total_pages, meta.total
        ),
        // Estimated totals are a guess; show only what is justified.
        Exactness::Estimated => println!(
            "page {}{}",
            meta.page,
            if meta.has_more { " (more available)" } else { "" }
        ),
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}

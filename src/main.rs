use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sds_console::client::{ExportFormat, SdsBackend, SdsClient};
use sds_console::config::Config;
use sds_console::legacy::LegacySdsClient;
use sds_console::app;
use sds_console::sections::SectionView;

#[derive(Parser)]
#[command(name = "sdsc", version, about = "Terminal client for the SDS generation service")]
struct Cli {
    /// Override the service origin from config
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Use the legacy GET/query-string integration
    #[arg(long, global = true)]
    legacy: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the backend and print its liveness state
    Health,
    /// Validate a SMILES string
    Validate { smiles: String },
    /// Generate a Safety Data Sheet and print it
    Report {
        smiles: String,
        /// Print the raw JSON payload instead of the rendered sections
        #[arg(long)]
        json: bool,
    },
    /// Export a Safety Data Sheet to a file
    Export {
        smiles: String,
        #[arg(long, value_enum, default_value = "docx")]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Interactive viewer (the default)
    Tui,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Docx,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Docx => ExportFormat::Docx,
            Format::Json => ExportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = &cli.base_url {
        if cli.legacy {
            config.service.legacy_base_url = url.clone();
        } else {
            config.service.base_url = url.clone();
        }
        config.validate()?;
    }

    let command = cli.command.unwrap_or(Command::Tui);
    let interactive = matches!(command, Command::Tui);
    init_tracing(&config, interactive)?;

    match command {
        Command::Health => {
            if cli.legacy {
                anyhow::bail!("the legacy integration has no health endpoint");
            }
            let client = primary_client(&config)?;
            println!("{}", client.health().await.label());
        }
        Command::Validate { smiles } => {
            if cli.legacy {
                anyhow::bail!("the legacy integration has no validation endpoint");
            }
            let client = primary_client(&config)?;
            let validation = client.validate(&smiles).await?;
            for line in validation.summary_lines() {
                println!("{line}");
            }
            if !validation.valid {
                std::process::exit(1);
            }
        }
        Command::Report { smiles, json } => {
            let backend = backend(&config, cli.legacy)?;
            let report = backend.generate(&smiles).await?;
            if json {
                println!("{}", report_json(&report)?);
            } else {
                if let Some(meta) = &report.metadata {
                    if let Some(canonical) = &meta.canonical_smiles {
                        println!("Canonical: {canonical}");
                    }
                }
                for line in SectionView::plain_report(&report) {
                    println!("{line}");
                }
            }
        }
        Command::Export { smiles, format, out } => {
            let backend = backend(&config, cli.legacy)?;
            let format: ExportFormat = format.into();
            let bytes = backend.export(&smiles, format).await?;
            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "sds_{}.{}",
                    chrono::Local::now().format("%Y%m%d_%H%M%S"),
                    format.extension()
                ))
            });
            tokio::fs::write(&path, bytes).await?;
            info!(path = %path.display(), "export written");
            println!("saved {}", path.display());
        }
        Command::Tui => {
            if cli.legacy {
                anyhow::bail!("the interactive mode requires the primary integration");
            }
            let client = Arc::new(primary_client(&config)?);
            app::run(config, client).await?;
        }
    }
    Ok(())
}

fn primary_client(config: &Config) -> Result<SdsClient> {
    Ok(SdsClient::new(
        &config.service.base_url,
        config.service.timeout_ms,
    )?)
}

fn backend(config: &Config, legacy: bool) -> Result<Box<dyn SdsBackend>> {
    if legacy {
        Ok(Box::new(LegacySdsClient::new(
            &config.service.legacy_base_url,
            config.service.timeout_ms,
        )?))
    } else {
        Ok(Box::new(primary_client(config)?))
    }
}

/// In interactive mode the terminal belongs to ratatui, so tracing goes to a
/// log file (or nowhere); one-shot commands log to stderr.
fn init_tracing(config: &Config, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("SDSC_LOG")
        .unwrap_or_else(|_| EnvFilter::new("sds_console=info"));
    if interactive {
        if let Some(path) = &config.ui.log_file {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn report_json(report: &sds_console::report::ReportDocument) -> Result<String> {
    use serde_json::{Map, Value, json};
    use sds_console::report::Value as ReportValue;

    fn value_to_json(value: &ReportValue) -> Value {
        use sds_console::report::Scalar;
        match value {
            ReportValue::Scalar(Scalar::Missing) => Value::Null,
            ReportValue::Scalar(Scalar::Text(s)) => json!(s),
            ReportValue::Scalar(Scalar::Number(n)) => json!(n),
            ReportValue::Scalar(Scalar::Bool(b)) => json!(b),
            ReportValue::List(items) => Value::Array(items.iter().map(value_to_json).collect()),
            ReportValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), value_to_json(v)))
                    .collect(),
            ),
        }
    }

    let mut sections = Map::new();
    for section in &report.sections {
        let data: Map<String, Value> = section
            .data
            .iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect();
        sections.insert(
            section.key.clone(),
            json!({
                "title": section.title,
                "data": data,
                "data_sources": section.data_sources,
                "notes": section.notes,
            }),
        );
    }
    Ok(serde_json::to_string_pretty(&json!({ "sds": sections }))?)
}

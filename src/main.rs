//! svcbind CLI - inspect and resolve service binding catalogs

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

use svcbind::output::{failures_json, records_text, resolution_json};
use svcbind::snapshot::{self, CatalogSnapshot};
use svcbind::{
    BindingError, ErrorKind, FixSuggestion, OutputFormat, ResolverConfig, Selection,
    ServiceSchema,
};

#[derive(Parser)]
#[command(name = "svcbind")]
#[command(about = "Resolve service binding credentials from the platform catalog (VCAP_SERVICES)")]
#[command(version)]
struct Cli {
    /// Read the catalog from a file instead of the environment
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Config file (default: $SVCBIND_CONFIG or ./svcbind.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List service labels and their entry counts
    Labels,

    /// Resolve the credentials bound under a service label
    Resolve {
        /// Service label (e.g. csb-aws-postgresql)
        label: String,

        /// Required field (repeatable); defaults to the known schema
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Which records to return (first, exactly-one, all)
        #[arg(short, long)]
        select: Option<Selection>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Print secret values unmasked in text output
        #[arg(long)]
        show_secrets: bool,
    },

    /// Validate every bound service that has a known schema
    Check {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// List entries carrying a tag, across all labels
    Tagged {
        /// Tag to look for (e.g. mysql)
        tag: String,
    },

    /// Show the known service schemas
    Schemas,
}

fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            let binding_err = e.downcast_ref::<BindingError>();
            if let Some(suggestion) = binding_err.and_then(|err| err.fix_suggestion()) {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(binding_err.map_or(1, |err| err.kind().exit_code()));
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = match &cli.config {
        Some(path) => ResolverConfig::load_from(path)?,
        None => ResolverConfig::load()?,
    }
    .with_env();
    debug!(catalog_var = %config.catalog_var, "Configuration loaded");

    let file = cli.file.as_deref();
    match cli.command {
        Commands::Labels => list_labels(install_catalog(file, &config)?, file, &config),
        Commands::Resolve {
            label,
            fields,
            select,
            format,
            show_secrets,
        } => {
            let schema = if fields.is_empty() {
                config.schema_for(&label)?
            } else {
                ServiceSchema::new(label, fields)
            };
            let selection = select.unwrap_or(config.selection);
            let catalog = install_catalog(file, &config)?;
            resolve_label(catalog, &schema, selection, format, show_secrets)
        }
        Commands::Check { format } => check_all(install_catalog(file, &config)?, &config, format),
        Commands::Tagged { tag } => list_tagged(install_catalog(file, &config)?, &tag),
        Commands::Schemas => show_schemas(&config),
    }
}

/// Parse the catalog once and publish it as the process-wide snapshot
fn install_catalog(
    file: Option<&Path>,
    config: &ResolverConfig,
) -> anyhow::Result<&'static CatalogSnapshot> {
    snapshot::install(load_catalog(file, config)?)?;
    snapshot::global().context("binding catalog snapshot missing after install")
}

fn load_catalog(file: Option<&Path>, config: &ResolverConfig) -> anyhow::Result<CatalogSnapshot> {
    match file {
        Some(path) => CatalogSnapshot::from_file(path)
            .with_context(|| format!("Loading catalog from {}", path.display())),
        None => Ok(CatalogSnapshot::from_env(&config.catalog_var)?),
    }
}

fn list_labels(
    snapshot: &CatalogSnapshot,
    file: Option<&Path>,
    config: &ResolverConfig,
) -> anyhow::Result<i32> {
    if snapshot.is_empty() {
        let source = match file {
            Some(path) => format!("{} is empty", path.display()),
            None => format!("${} is unset or empty", config.catalog_var),
        };
        println!("{} No bindings configured ({})", "→".cyan(), source);
        return Ok(0);
    }

    for label in snapshot.labels() {
        let count = snapshot.count(label);
        let known = config.schema_for(label).is_ok();
        println!(
            "{} {} ({} {}){}",
            "•".cyan(),
            label.bold(),
            count,
            if count == 1 { "entry" } else { "entries" },
            if known { "" } else { " [no schema]" }
        );
    }
    Ok(0)
}

fn resolve_label(
    snapshot: &CatalogSnapshot,
    schema: &ServiceSchema,
    selection: Selection,
    format: OutputFormat,
    show_secrets: bool,
) -> anyhow::Result<i32> {
    let resolution = snapshot.resolve_schema(schema);
    let failures = failures_json(&resolution.failures);
    let warnings: Vec<String> = resolution.failures.iter().map(ToString::to_string).collect();

    // Rejected entries are still reported when none is usable
    let (records, rejected) = match resolution.select(&schema.label, selection) {
        Ok(records) => (records, None),
        Err(err @ BindingError::IncompleteBinding { .. }) => (Vec::new(), Some(err)),
        Err(err) => return Err(err.into()),
    };

    match format {
        OutputFormat::Json => {
            let doc = resolution_json(&schema.label, &records, failures);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            for warning in &warnings {
                eprintln!("{} {}", "warning:".yellow().bold(), warning);
            }
            print!("{}", records_text(&records, show_secrets));
        }
    }

    match rejected {
        Some(err) => Err(err.into()),
        None => Ok(0),
    }
}

fn check_all(
    snapshot: &CatalogSnapshot,
    config: &ResolverConfig,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    let mut reports = Vec::new();
    let mut any_failed = false;

    for schema in config.all_schemas() {
        if snapshot.count(&schema.label) == 0 {
            continue;
        }
        let resolution = snapshot.resolve_schema(&schema);
        any_failed |= !resolution.is_complete();
        reports.push((schema.label, resolution));
    }

    match format {
        OutputFormat::Json => {
            let docs: Vec<_> = reports
                .iter()
                .map(|(label, r)| resolution_json(label, &r.records, failures_json(&r.failures)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
        OutputFormat::Text => {
            if reports.is_empty() {
                println!("{} No bound service has a known schema", "→".cyan());
            }
            for (label, resolution) in &reports {
                if resolution.is_complete() {
                    println!(
                        "{} {}: {} valid",
                        "✓".green(),
                        label.bold(),
                        resolution.records.len()
                    );
                } else {
                    println!(
                        "{} {}: {} valid, {} incomplete",
                        "✗".red(),
                        label.bold(),
                        resolution.records.len(),
                        resolution.failures.len()
                    );
                    for failure in &resolution.failures {
                        println!("    {}", failure);
                    }
                }
            }
        }
    }

    Ok(if any_failed {
        ErrorKind::IncompleteBinding.exit_code()
    } else {
        0
    })
}

fn list_tagged(snapshot: &CatalogSnapshot, tag: &str) -> anyhow::Result<i32> {
    let found = snapshot.tagged(tag);
    if found.is_empty() {
        println!("{} No entries tagged '{}'", "→".cyan(), tag);
        return Ok(0);
    }

    for (label, index, entry) in found {
        println!(
            "{} {}[{}] {}",
            "•".cyan(),
            label.bold(),
            index,
            entry.name().unwrap_or("(unnamed)")
        );
    }
    Ok(0)
}

fn show_schemas(config: &ResolverConfig) -> anyhow::Result<i32> {
    for schema in config.all_schemas() {
        println!("{}", schema.label.bold());
        println!("  {}", schema.required.join(", "));
    }
    Ok(0)
}

//! Atlan CLI
//!
//! Command-line access to an Atlan tenant: read, search, archive, restore,
//! tag and certify assets.

use anyhow::{bail, Context, Result};
use atlan_client::assets::{ops, super_types_of};
use atlan_client::model::{Asset, CertificateStatus, DeleteType, MutationResponse};
use atlan_client::search::{fields, tagged, FluentSearch};
use atlan_client::{AtlanConnector, CatalogConnector, Connector, ConnectorHealth};
use atlan_observability::logging::{init_logging_with_config, LoggingConfig};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, warn};

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "atlan")]
#[command(version)]
#[command(about = "Command-line access to the Atlan metadata catalog", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Config {
        /// Show secrets (redacted by default)
        #[arg(long)]
        show_secrets: bool,
    },

    /// Check connectivity and credentials
    Health,

    /// Show an asset by GUID or qualified name
    Get {
        /// Asset type, e.g. Table
        type_name: String,

        /// GUID or qualified name
        id: String,

        /// Include relationship attributes
        #[arg(long)]
        relationships: bool,
    },

    /// Search for assets
    Search {
        /// Only assets of this type
        #[arg(short, long = "type")]
        type_name: Option<String>,

        /// Only assets whose qualified name starts with this prefix
        #[arg(short, long)]
        prefix: Option<String>,

        /// Only assets carrying this tag (repeatable)
        #[arg(long)]
        tag: Vec<String>,

        /// Include archived assets
        #[arg(long)]
        include_archived: bool,

        /// Maximum number of assets to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Archive (soft-delete) assets
    Archive {
        /// Asset GUIDs
        #[arg(required = true)]
        guids: Vec<String>,
    },

    /// Permanently delete assets
    Purge {
        /// Asset GUIDs
        #[arg(required = true)]
        guids: Vec<String>,
    },

    /// Restore an archived asset
    Restore {
        /// Asset type
        type_name: String,

        /// Qualified name
        qualified_name: String,
    },

    /// Manage Atlan tags on an asset
    Tag {
        #[command(subcommand)]
        action: TagCommands,
    },

    /// Set the certificate on an asset
    Certify {
        /// Asset type
        type_name: String,

        /// Qualified name
        qualified_name: String,

        /// Asset name
        name: String,

        /// VERIFIED, DRAFT or DEPRECATED
        status: CertificateStatus,

        /// Certificate message
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Add tags to an asset
    Add {
        /// Asset type
        type_name: String,

        /// Qualified name
        qualified_name: String,

        /// Tag names
        #[arg(required = true)]
        tags: Vec<String>,

        /// Propagate the tags to child and downstream assets
        #[arg(long)]
        propagate: bool,
    },

    /// Remove a tag from an asset
    Remove {
        /// Asset type
        type_name: String,

        /// Qualified name
        qualified_name: String,

        /// Tag name
        tag: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e),
        Err(_) => {
            if cli.verbose {
                eprintln!("Using environment configuration (no config file found)");
            }
            AppConfig::default()
        }
    }
    .with_env_fallback(|key| std::env::var(key).ok());

    // Initialize logging
    let logging = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig {
            level: config.logging.level.parse().unwrap_or(tracing::Level::WARN),
            ..LoggingConfig::default()
        }
    };
    init_logging_with_config(LoggingConfig {
        json_format: cli.format == OutputFormat::Json || config.logging.json_format,
        ..logging
    });
    debug!(path = %config_path.display(), "Configuration loaded");

    // Execute command
    match cli.command {
        Commands::Config { show_secrets } => cmd_config(config, show_secrets, cli.format),
        command => {
            let connector = connect(&config)?;
            run(command, &connector, cli.format).await
        }
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("com", "atlan", "atlan") {
        dirs.config_dir().join("config.yaml")
    } else {
        PathBuf::from("atlan.yaml")
    }
}

fn connect(config: &AppConfig) -> Result<AtlanConnector> {
    let atlan_config = config.to_atlan_config()?;
    AtlanConnector::new(atlan_config).context("Failed to create Atlan connector")
}

async fn run(command: Commands, connector: &AtlanConnector, format: OutputFormat) -> Result<()> {
    match command {
        // Shown before connecting.
        Commands::Config { .. } => Ok(()),
        Commands::Health => cmd_health(connector, format).await,
        Commands::Get {
            type_name,
            id,
            relationships,
        } => cmd_get(connector, &type_name, &id, relationships, format).await,
        Commands::Search {
            type_name,
            prefix,
            tag,
            include_archived,
            limit,
        } => {
            let search = SearchArgs {
                type_name,
                prefix,
                tags: tag,
                include_archived,
                limit,
            };
            cmd_search(connector, search, format).await
        }
        Commands::Archive { guids } => cmd_delete(connector, &guids, DeleteType::Soft, format).await,
        Commands::Purge { guids } => cmd_delete(connector, &guids, DeleteType::Hard, format).await,
        Commands::Restore {
            type_name,
            qualified_name,
        } => cmd_restore(connector, &type_name, &qualified_name, format).await,
        Commands::Tag { action } => cmd_tag(connector, action, format).await,
        Commands::Certify {
            type_name,
            qualified_name,
            name,
            status,
            message,
        } => {
            check_type(&type_name);
            let updated = ops::update_certificate(
                connector,
                &type_name,
                &qualified_name,
                &name,
                status,
                message.as_deref(),
            )
            .await
            .with_context(|| format!("Failed to certify {} {}", type_name, qualified_name))?;
            print_update(updated, &qualified_name, format)
        }
    }
}

/// Warns about type names the client has no typed helpers for; the server
/// may still know them.
fn check_type(type_name: &str) {
    if super_types_of(type_name).is_empty() {
        warn!(type_name, "Unrecognized asset type");
    }
}

fn cmd_config(config: AppConfig, show_secrets: bool, format: OutputFormat) -> Result<()> {
    let display_config = if show_secrets {
        config
    } else {
        config.redact_secrets()
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&display_config)?);
    } else {
        println!("{}", "Current Configuration".bold());
        println!("─────────────────────────");
        println!("Base URL: {}", or_unset(&display_config.base_url));
        println!("API Key: {}", or_unset(&display_config.api_key));
        println!("Timeout: {}s", display_config.timeout_secs);
        println!("Max Retries: {}", display_config.max_retries);
        println!("Page Size: {}", display_config.page_size);
        println!("Tag Cache TTL: {}s", display_config.tag_cache_ttl_secs);
        if let Some(limit) = &display_config.rate_limit {
            println!(
                "Rate Limit: {} requests / {}s (burst {})",
                limit.max_requests,
                limit.period.as_secs(),
                limit.burst_size
            );
        }
    }

    Ok(())
}

fn or_unset(value: &str) -> colored::ColoredString {
    if value.is_empty() {
        "(not set)".dimmed()
    } else {
        value.normal()
    }
}

async fn cmd_health(connector: &AtlanConnector, format: OutputFormat) -> Result<()> {
    let health = connector.health_check().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        let status = match &health {
            ConnectorHealth::Healthy => "healthy".green(),
            ConnectorHealth::Degraded(reason) => format!("degraded ({})", reason).yellow(),
            ConnectorHealth::Unhealthy(reason) => format!("unhealthy ({})", reason).red(),
            ConnectorHealth::Unknown => "unknown".dimmed(),
        };
        println!("{} {}", "Atlan:".bold(), status);
    }

    if let ConnectorHealth::Unhealthy(reason) = health {
        bail!("Atlan is unreachable: {}", reason);
    }
    Ok(())
}

async fn cmd_get(
    connector: &AtlanConnector,
    type_name: &str,
    id: &str,
    relationships: bool,
    format: OutputFormat,
) -> Result<()> {
    check_type(type_name);
    let asset = ops::get(connector, type_name, id, relationships)
        .await
        .with_context(|| format!("Failed to read {} {}", type_name, id))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&asset)?);
    } else {
        print_asset(&asset);
    }
    Ok(())
}

struct SearchArgs {
    type_name: Option<String>,
    prefix: Option<String>,
    tags: Vec<String>,
    include_archived: bool,
    limit: usize,
}

async fn cmd_search(
    connector: &AtlanConnector,
    args: SearchArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut search = match &args.type_name {
        Some(type_name) => {
            check_type(type_name);
            ops::select(type_name, args.include_archived)
        }
        None if args.include_archived => FluentSearch::new(),
        None => FluentSearch::new().active(),
    };
    if let Some(prefix) = &args.prefix {
        search = search.filter(fields::QUALIFIED_NAME.starts_with(prefix.as_str()));
    }
    if !args.tags.is_empty() {
        let names: Vec<&str> = args.tags.iter().map(String::as_str).collect();
        let query = tagged(connector, &names)
            .await
            .context("Failed to resolve tag names")?;
        search = search.filter(query);
    }

    let response = search
        .page_size(args.limit)
        .execute(connector)
        .await
        .context("Search failed")?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", "Assets".bold());
    println!("──────");
    if response.entities.is_empty() {
        println!("No assets found");
        return Ok(());
    }
    for asset in &response.entities {
        println!(
            "  {} {} {}",
            asset.type_name.cyan(),
            asset.qualified_name().unwrap_or("-"),
            status_marker(asset)
        );
    }
    println!();
    println!(
        "Showing {} of {} assets",
        response.entities.len(),
        response.approximate_count
    );
    Ok(())
}

async fn cmd_delete(
    connector: &AtlanConnector,
    guids: &[String],
    delete_type: DeleteType,
    format: OutputFormat,
) -> Result<()> {
    let response = connector
        .delete(guids, delete_type)
        .await
        .with_context(|| format!("Failed to {} assets", verb(delete_type)))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_deleted(&response, delete_type);
    }
    Ok(())
}

fn verb(delete_type: DeleteType) -> &'static str {
    match delete_type {
        DeleteType::Soft => "archive",
        DeleteType::Hard => "purge",
    }
}

fn print_deleted(response: &MutationResponse, delete_type: DeleteType) {
    let deleted = response.deleted_assets();
    if deleted.is_empty() {
        println!("{}", "Nothing to delete".yellow());
        return;
    }
    let label = match delete_type {
        DeleteType::Soft => "Archived",
        DeleteType::Hard => "Purged",
    };
    for asset in deleted {
        println!(
            "{} {} {}",
            label.green(),
            asset.type_name.cyan(),
            asset
                .qualified_name()
                .or(asset.guid.as_deref())
                .unwrap_or("-")
        );
    }
}

async fn cmd_restore(
    connector: &AtlanConnector,
    type_name: &str,
    qualified_name: &str,
    format: OutputFormat,
) -> Result<()> {
    check_type(type_name);
    let restored = ops::restore(connector, type_name, qualified_name)
        .await
        .with_context(|| format!("Failed to restore {} {}", type_name, qualified_name))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::json!({ "restored": restored }));
    } else if restored {
        println!("{} {}", "Restored".green(), qualified_name);
    } else {
        println!("{} {}", "No such asset:".yellow(), qualified_name);
    }
    Ok(())
}

async fn cmd_tag(
    connector: &AtlanConnector,
    action: TagCommands,
    format: OutputFormat,
) -> Result<()> {
    match action {
        TagCommands::Add {
            type_name,
            qualified_name,
            tags,
            propagate,
        } => {
            check_type(&type_name);
            let names: Vec<&str> = tags.iter().map(String::as_str).collect();
            let updated = ops::append_atlan_tags(
                connector,
                &type_name,
                &qualified_name,
                &names,
                propagate,
                propagate,
                false,
            )
            .await
            .with_context(|| format!("Failed to tag {} {}", type_name, qualified_name))?;
            print_update(updated, &qualified_name, format)
        }
        TagCommands::Remove {
            type_name,
            qualified_name,
            tag,
        } => {
            check_type(&type_name);
            let updated = ops::remove_atlan_tag(connector, &type_name, &qualified_name, &tag)
                .await
                .with_context(|| {
                    format!("Failed to remove {} from {} {}", tag, type_name, qualified_name)
                })?;
            print_update(updated, &qualified_name, format)
        }
    }
}

fn print_update(updated: Option<Asset>, qualified_name: &str, format: OutputFormat) -> Result<()> {
    match (updated, format) {
        (Some(asset), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(&asset)?)
        }
        (Some(asset), OutputFormat::Text) => {
            println!("{} {}", "Updated".green(), qualified_name);
            print_asset(&asset);
        }
        (None, OutputFormat::Json) => println!("null"),
        (None, OutputFormat::Text) => {
            println!("{} {}", "No change:".yellow(), qualified_name)
        }
    }
    Ok(())
}

fn status_marker(asset: &Asset) -> colored::ColoredString {
    if asset.is_archived() {
        "[archived]".red()
    } else {
        "".normal()
    }
}

fn print_asset(asset: &Asset) {
    println!(
        "{} {} {}",
        format!("{}:", asset.type_name).bold(),
        asset.name().unwrap_or("-"),
        status_marker(asset)
    );
    println!("─────────────────────────────────────────");
    println!(
        "  {} {}",
        "Qualified name:".cyan(),
        asset.qualified_name().unwrap_or("-")
    );
    println!("  {} {}", "GUID:".cyan(), asset.guid.as_deref().unwrap_or("-"));
    if let Some(description) = asset.user_description().or(asset.description()) {
        println!("  {} {}", "Description:".cyan(), description);
    }
    if let Some(status) = asset.certificate_status() {
        let message = asset.certificate_status_message().unwrap_or_default();
        println!("  {} {} {}", "Certificate:".cyan(), status.as_str(), message);
    }
    if let (Some(kind), Some(title)) = (asset.announcement_type(), asset.announcement_title()) {
        println!("  {} [{}] {}", "Announcement:".cyan(), kind.as_str(), title);
    }
    let owners = asset.owner_users();
    if !owners.is_empty() {
        println!("  {} {}", "Owners:".cyan(), owners.join(", "));
    }
    let tags = asset.atlan_tag_names();
    if !tags.is_empty() {
        println!("  {} {}", "Tags:".cyan(), tags.join(", "));
    }
    let assigned = asset.assigned_terms();
    let terms: Vec<&str> = assigned.iter().filter_map(|t| t.qualified_name()).collect();
    if !terms.is_empty() {
        println!("  {} {}", "Terms:".cyan(), terms.join(", "));
    }
}

//! CLI administration tool for snaplink.
//!
//! Creates and inspects short links and checks backing services without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a link (prompts for the URL when omitted)
//! cargo run --bin admin -- link create https://example.com --alias promo --days 7
//!
//! # Show counters of a link
//! cargo run --bin admin -- link show promo
//!
//! # Check database and cache connections
//! cargo run --bin admin -- db check
//! ```
//!
//! Reads the same environment variables as the server. Without
//! `DATABASE_URL` it operates on a throwaway in-memory store.

use snaplink::application::services::ResolutionService;
use snaplink::config::{self, Config};
use snaplink::domain::entities::ExpiryPolicy;
use snaplink::server::build_resolution_service;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a new short link
    Create {
        /// Target URL
        url: Option<String>,

        /// Custom alias instead of a generated code
        #[arg(short, long)]
        alias: Option<String>,

        /// Expire after this many days (default: DEFAULT_EXPIRY_DAYS)
        #[arg(short, long, conflicts_with = "never")]
        days: Option<u32>,

        /// Never expire
        #[arg(long)]
        never: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show statistics of a short link
    Show {
        /// Short code or alias
        code: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database and cache connections
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    if config.database_url.is_none() {
        println!(
            "{}",
            "⚠️  DATABASE_URL is not set, using a temporary in-memory store".yellow()
        );
    }

    let service = build_resolution_service(&config).await?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &service).await?,
        Commands::Db { action } => handle_db_action(action, &service, &config).await?,
    }

    Ok(())
}

async fn handle_link_action(action: LinkAction, service: &ResolutionService) -> Result<()> {
    match action {
        LinkAction::Create {
            url,
            alias,
            days,
            never,
            yes,
        } => {
            let expiry = match (days, never) {
                (_, true) => ExpiryPolicy::Never,
                (Some(n), false) => ExpiryPolicy::Days(n),
                (None, false) => ExpiryPolicy::Default,
            };
            create_link(service, url, alias, expiry, yes).await?;
        }
        LinkAction::Show { code } => show_link(service, &code).await?,
    }

    Ok(())
}

/// Creates a short link with interactive prompts.
async fn create_link(
    service: &ResolutionService,
    url: Option<String>,
    alias: Option<String>,
    expiry: ExpiryPolicy,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    let url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Target URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    let expiry_label = match expiry {
        ExpiryPolicy::Default => "default".to_string(),
        ExpiryPolicy::Never => "never".to_string(),
        ExpiryPolicy::Days(n) => format!("{} days", n),
    };

    println!("{}", "Link details:".bright_white().bold());
    println!("  URL:    {}", url.cyan());
    println!(
        "  Alias:  {}",
        alias.as_deref().unwrap_or("(generated)").cyan()
    );
    println!("  Expiry: {}", expiry_label.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this link?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let link = service
        .create(url, alias, expiry)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!();
    println!("{}", "✅ Link created successfully!".green().bold());
    println!(
        "  {}",
        service.short_url(&link.code).bright_yellow().bold()
    );
    match link.expires_at {
        Some(expires_at) => println!(
            "  Expires: {}",
            expires_at.format("%Y-%m-%d %H:%M UTC").to_string().bright_black()
        ),
        None => println!("  Expires: {}", "never".bright_black()),
    }
    println!();

    Ok(())
}

/// Prints the counters and timestamps of one link.
///
/// # Output Format
///
/// ```text
/// 📊 promo
///
///   URL:          https://example.com
///   Clicks:       42
///   Created:      2025-01-15 10:30
///   Last click:   2025-01-16 14:20
///   Expires:      2025-01-22 10:30 (6 days left)
/// ```
async fn show_link(service: &ResolutionService, code: &str) -> Result<()> {
    let link = service
        .get_stats(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let now = service.now();

    println!("{}", format!("📊 {}", link.code).bright_blue().bold());
    println!();
    println!("  {:<13} {}", "URL:", link.target_url.cyan());
    println!("  {:<13} {}", "Short URL:", service.short_url(&link.code).cyan());
    println!(
        "  {:<13} {}",
        "Clicks:",
        link.click_count.to_string().bright_white().bold()
    );
    println!(
        "  {:<13} {}",
        "Created:",
        link.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!(
        "  {:<13} {}",
        "Last click:",
        link.last_clicked_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_black()
    );

    match (link.expires_at, link.days_left(now)) {
        (Some(expires_at), Some(days_left)) => {
            let when = expires_at.format("%Y-%m-%d %H:%M").to_string();
            if link.is_expired_at(now) {
                println!("  {:<13} {} {}", "Expires:", when.bright_black(), "EXPIRED".red());
            } else {
                println!(
                    "  {:<13} {} ({} days left)",
                    "Expires:",
                    when.bright_black(),
                    days_left
                );
            }
        }
        _ => println!("  {:<13} {}", "Expires:", "never".green()),
    }
    println!();

    Ok(())
}

async fn handle_db_action(
    action: DbAction,
    service: &ResolutionService,
    config: &Config,
) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking connections...".bright_blue());

            let store = if config.database_url.is_some() {
                "PostgreSQL"
            } else {
                "in-memory"
            };

            match service.check_store().await {
                Ok(()) => println!("{} Store ({}) is reachable", "✅".green(), store),
                Err(e) => {
                    println!("{} Store ({}) check failed: {}", "❌".red(), store, e);
                    anyhow::bail!("store check failed");
                }
            }

            if service.check_cache().await {
                println!(
                    "{} Cache ({}) is reachable",
                    "✅".green(),
                    service.cache_backend()
                );
            } else {
                println!(
                    "{} Cache ({}) is not reachable; redirects will use the store",
                    "⚠️ ".yellow(),
                    service.cache_backend()
                );
            }
        }
    }

    Ok(())
}

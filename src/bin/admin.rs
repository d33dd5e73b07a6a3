//! CLI administration tool for linkgate.
//!
//! Provides commands for managing API tokens, link passwords, statistics,
//! and database checks without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a new API token
//! cargo run --bin admin -- token create
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke "Production API"
//!
//! # Protect a link with a password, or remove it
//! cargo run --bin admin -- link password abc123
//! cargo run --bin admin -- link password abc123 --clear
//!
//! # View statistics for a link
//! cargo run --bin admin -- stats abc123
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): HMAC key for API tokens
//! - `REDIS_URL` (optional): cache entries are invalidated after password changes

use linkgate::application::services::{StatsService, hash_token};
use linkgate::domain::repositories::{LinkRepository, TokenRepository};
use linkgate::infrastructure::cache::{CacheService, RedisCache};
use linkgate::infrastructure::persistence::{
    PgAbTestRepository, PgClickRepository, PgLinkRepository, PgTokenRepository,
};
use linkgate::utils::api_token::generate_api_token;
use linkgate::utils::password::hash_password;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkgate.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show click and A/B test statistics for a link
    Stats {
        /// Short code or custom alias
        code: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "Production API", "Reporting")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name
        name: String,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Set or clear the password of a link
    Password {
        /// Short code of the link
        code: String,

        /// Remove the password instead of setting one
        #[arg(long)]
        clear: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let pool = Arc::new(pool);

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Link { action } => handle_link_action(action, &pool).await?,
        Commands::Stats { code } => handle_stats(&code, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &Arc<PgPool>) -> Result<()> {
    let repo = PgTokenRepository::new(pool.clone());

    match action {
        TokenAction::Create { name, yes } => create_token(&repo, name, yes).await,
        TokenAction::List => list_tokens(&repo).await,
        TokenAction::Revoke { name } => revoke_token(&repo, name).await,
    }
}

/// Creates a new API token with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for token name (or use provided)
/// 2. Generate a random token
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Store the HMAC-SHA256 of the token
/// 5. Print the raw token once
async fn create_token(
    repo: &PgTokenRepository,
    name: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Create token '{}'?", token_name))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_value = generate_api_token().context("Failed to generate random token")?;
    let token_hash = hash_token(&secret, &token_value);

    repo.create_token(&token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/stats/abc123",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
async fn list_tokens(repo: &PgTokenRepository) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<30} {:<18} {:<18} {:<8}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(82).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<30} {:<18} {:<18} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", tokens.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Revokes an active token by name after confirmation.
async fn revoke_token(repo: &PgTokenRepository, name: String) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let confirmed = Confirm::new()
        .with_prompt(format!("Revoke token '{}'?", name))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    let revoked = repo
        .revoke_by_name(&name)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    if revoked {
        println!("{}", "✅ Token revoked successfully!".green().bold());
    } else {
        println!("{}", "⚠️  No active token with that name".yellow());
    }
    println!();

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, pool: &Arc<PgPool>) -> Result<()> {
    match action {
        LinkAction::Password { code, clear } => set_link_password(pool, &code, clear).await,
    }
}

/// Stores an Argon2 hash of a prompted password, or clears it.
///
/// `code` may also be a custom alias. When `REDIS_URL` is set, cached copies
/// of the link are dropped so the change applies to the next redirect.
async fn set_link_password(pool: &Arc<PgPool>, code: &str, clear: bool) -> Result<()> {
    let repo = PgLinkRepository::new(pool.clone());

    let link = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Link '{}' not found", code))?;

    let password_hash = if clear {
        None
    } else {
        let password = Password::new()
            .with_prompt(format!("Password for '{}'", link.code))
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?;
        if password.is_empty() {
            anyhow::bail!("Password must not be empty; use --clear to remove it");
        }
        Some(hash_password(&password).context("Failed to hash password")?)
    };

    repo.set_password(&link.code, password_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update link: {}", e))?;

    // Cache entries are keyed by whatever the visitor requested: code or alias.
    if let Ok(redis_url) = std::env::var("REDIS_URL") {
        match RedisCache::connect(&redis_url, 0).await {
            Ok(cache) => {
                for key in std::iter::once(&link.code).chain(link.custom_alias.as_ref()) {
                    if let Err(e) = cache.invalidate(key).await {
                        println!("{} {}", "⚠️  Cache invalidation failed:".yellow(), e);
                    }
                }
            }
            Err(e) => println!("{} {}", "⚠️  Redis unavailable:".yellow(), e),
        }
    }

    let message = if clear {
        "✅ Password removed"
    } else {
        "✅ Password set"
    };
    println!("{}", message.green().bold());

    Ok(())
}

/// Displays click totals and A/B test results for one link.
async fn handle_stats(code: &str, pool: &Arc<PgPool>) -> Result<()> {
    let service = StatsService::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgClickRepository::new(pool.clone())),
        Arc::new(PgAbTestRepository::new(pool.clone())),
    );

    let report = service
        .link_report(code, None, None)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();
    println!("  Code:     {}", report.code.cyan());
    println!("  URL:      {}", report.original_url);
    println!(
        "  Status:   {}",
        if report.is_active {
            "ACTIVE".green()
        } else {
            "INACTIVE".red()
        }
    );
    println!(
        "  Clicks:   {}",
        report.total_clicks.to_string().bright_green().bold()
    );

    if let Some(test) = report.ab_test {
        println!();
        println!(
            "  A/B test: {} ({})",
            test.name.cyan(),
            test.status.as_str().bright_black()
        );
        for variant in test.variants {
            println!(
                "    {:<20} weight {:<4} assigned {:<8} impressions {}",
                variant.name.bright_white(),
                variant.weight,
                variant.assignments,
                variant.impressions
            );
        }
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &Arc<PgPool>) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            PgLinkRepository::new(pool.clone())
                .ping()
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
    }

    Ok(())
}

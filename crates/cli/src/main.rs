//! Turnstile CLI - database and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations (including the session table)
//! turnstile migrate
//!
//! # Insert the default catalog if it is empty
//! turnstile seed
//!
//! # Toggle the admin flag on a member
//! turnstile admin grant coach
//! turnstile admin revoke coach
//!
//! # Show the catalog with stock
//! turnstile products list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "turnstile")]
#[command(author, version, about = "Turnstile operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert the default catalog if the products table is empty
    Seed,
    /// Manage admin flags
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give a member admin rights
    Grant {
        /// Member username
        username: String,
    },
    /// Remove a member's admin rights
    Revoke {
        /// Member username
        username: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List all products with price and stock
    List,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "turnstile_cli=info,turnstile_storefront=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { username } => commands::admin::set_admin(&username, true).await?,
            AdminAction::Revoke { username } => {
                commands::admin::set_admin(&username, false).await?;
            }
        },
        Commands::Products { action } => match action {
            ProductsAction::List => commands::products::list().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_admin_grant() {
        let cli = Cli::try_parse_from(["turnstile", "admin", "grant", "coach"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Grant { ref username }
            }) if username == "coach"
        ));
    }
}

//! StoreRate CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! storerate migrate
//!
//! # Create the first admin account
//! STORERATE_ADMIN_PASSWORD='Secret#123' storerate admin create \
//!     -e admin@example.com -n "Platform Administrator Account" -a "1 Main Street"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create an admin account (the API refuses admin self-registration)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "storerate")]
#[command(author, version, about = "StoreRate CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name (20-60 characters)
        #[arg(short, long)]
        name: String,

        /// Admin postal address
        #[arg(short, long)]
        address: String,

        /// Admin password (8-16 characters, one uppercase, one of !@#$%^&*)
        #[arg(short, long, env = "STORERATE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                address,
                password,
            } => {
                commands::admin::create_admin(&name, &email, &address, &password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_create_parses_short_flags() {
        let cli = Cli::try_parse_from([
            "storerate",
            "admin",
            "create",
            "-e",
            "admin@example.com",
            "-n",
            "Platform Administrator Account",
            "-a",
            "1 Main Street",
            "-p",
            "Secret#123",
        ])
        .unwrap();

        let Commands::Admin {
            action: AdminAction::Create { email, password, .. },
        } = cli.command
        else {
            panic!("expected admin create");
        };
        assert_eq!(email, "admin@example.com");
        assert_eq!(password, "Secret#123");
    }
}

//! Driftwell CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (orders, coupons, users, admin_users)
//! driftwell-cli migrate
//!
//! # Grant the welcome coupon to a shopper
//! driftwell-cli seed --email shopper@example.com
//!
//! # Create an operator account for the admin console
//! driftwell-cli admin create -e ops@driftwell.shop -n "Ops" -r operator
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Grant the welcome coupon
//! - `admin create` - Create operator accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "driftwell-cli")]
#[command(author, version, about = "Driftwell CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Grant the welcome coupon to a shopper
    Seed {
        /// Shopper email address
        #[arg(short, long)]
        email: String,
    },
    /// Manage operator accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new operator account
    Create {
        /// Operator email address
        #[arg(short, long)]
        email: String,

        /// Operator display name
        #[arg(short, long)]
        name: String,

        /// Operator role (`operator`, `super_admin`)
        #[arg(short, long, default_value = "operator")]
        role: String,

        /// Password; a random one is generated and printed when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { email } => commands::seed::welcome_coupon(&email).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::admin::create_user(&email, &name, &role, password.as_deref()).await?;
            }
        },
    }
    Ok(())
}

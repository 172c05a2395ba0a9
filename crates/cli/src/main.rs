//! Contact Desk CLI - database migrations and admin provisioning.
//!
//! # Usage
//!
//! ```bash
//! # Create the desk schema and tables
//! cdesk migrate
//!
//! # Create an admin user (prompts for username and password)
//! cdesk admin create
//!
//! # Prefill the username, still prompting for the password
//! cdesk admin create -u alice
//! ```
//!
//! # Environment Variables
//!
//! - `DESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cdesk")]
#[command(author, version, about = "Contact Desk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin username (prompted for when omitted)
        #[arg(short, long)]
        username: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Admin { action } => match action {
            AdminAction::Create { username } => {
                commands::admin::create_user(username).await?;
            }
        },
    }
    Ok(())
}

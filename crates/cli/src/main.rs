//! BEE-Commerce CLI - storefront client for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and log in
//! bee register -u bee -e bee@example.com
//! bee login -u bee
//!
//! # Browse the catalog
//! bee categories
//! bee products --search honey --page 2
//!
//! # Place an order (product-id:quantity pairs)
//! bee checkout 7:2 12:1
//!
//! # Account
//! bee orders
//! bee profile show
//! bee profile set --first-name Bea
//! bee logout
//! ```
//!
//! Credentials persist between invocations in the token file configured by
//! `BEE_TOKEN_PATH`; expired access tokens are renewed transparently.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

use bee_commerce_client::{ClientConfig, Storefront};

mod commands;

#[derive(Parser)]
#[command(name = "bee")]
#[command(author, version, about = "BEE-Commerce storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Create a new account and log in
    Register {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List product categories
    Categories,
    /// Browse the product catalog
    Products {
        /// Restrict to one category id
        #[arg(short, long)]
        category: Option<i64>,

        /// Search term matched against name and description
        #[arg(short, long)]
        search: Option<String>,

        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Items per page (10, 20, or 50)
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Place an order from product-id:quantity pairs
    Checkout {
        /// Items as `product_id:quantity`, e.g. `7:2`
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Show order history
    Orders,
    /// Show or update the account profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile
    Show,
    /// Update profile fields
    Set {
        /// New username
        #[arg(long)]
        username: Option<String>,

        /// New email address
        #[arg(long)]
        email: Option<String>,

        /// New first name (empty string clears it)
        #[arg(long)]
        first_name: Option<String>,

        /// New last name (empty string clears it)
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let mut shop = Storefront::new(config)?;
    shop.restore();

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&mut shop, &username, password).await?;
        }
        Commands::Logout => commands::auth::logout(&mut shop)?,
        Commands::Register {
            username,
            email,
            password,
        } => {
            commands::auth::register(&mut shop, &username, &email, password).await?;
        }
        Commands::Categories => commands::catalog::categories(&shop).await?,
        Commands::Products {
            category,
            search,
            page,
            page_size,
        } => {
            commands::catalog::products(&mut shop, category, search, page, page_size).await?;
        }
        Commands::Checkout { items } => commands::checkout::place_order(&mut shop, &items).await?,
        Commands::Orders => commands::orders::list(&shop).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&shop).await?,
            ProfileAction::Set {
                username,
                email,
                first_name,
                last_name,
            } => {
                commands::profile::update(&shop, username, email, first_name, last_name).await?;
            }
        },
    }
    Ok(())
}

//! Storefront CLI - catalog browsing, cart management and checkout.
//!
//! # Usage
//!
//! ```bash
//! # Load the sample catalog into an empty store
//! webstore seed
//!
//! # Browse
//! webstore products --category Electronics
//! webstore products --search mouse
//!
//! # Cart and checkout for one user
//! webstore add --user alice --product PRD-1A2B3C4D --quantity 2
//! webstore cart --user alice
//! webstore checkout --user alice
//!
//! # Same against the CSV store
//! webstore --backend csv --data-dir ./data_csv products
//! ```
//!
//! Every invocation is a fresh process; carts are persisted by the cart
//! engine and picked up again on the next run.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use webstore_core::{ProductId, UserId};
use webstore_infra::config::{BACKEND_ENV, DATA_DIR_ENV};
use webstore_infra::storage::StorageBackend;
use webstore_infra::{BackendKind, CartEngine, StoreConfig};

mod commands;

pub(crate) type Engine = CartEngine<Arc<dyn StorageBackend>>;

#[derive(Debug, Parser)]
#[command(name = "webstore")]
#[command(author, version, about = "Storefront catalog, cart and checkout")]
struct Cli {
    /// Storage backend (`json` or `csv`); defaults to $WEBSTORE_BACKEND, then json
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Data directory; defaults to $WEBSTORE_DATA_DIR, then `data` / `data_csv`
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct UserArg {
    /// User whose cart to act on
    #[arg(short, long)]
    user: UserId,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the sample catalog if the store has no products
    Seed,
    /// List products
    Products {
        /// Only products in this category (exact match)
        #[arg(short, long)]
        category: Option<String>,

        /// Only products whose name or description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List product categories
    Categories,
    /// Show a user's cart
    Cart(UserArg),
    /// Add a product to a cart
    Add {
        #[command(flatten)]
        user: UserArg,

        #[arg(short, long)]
        product: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from a cart
    Remove {
        #[command(flatten)]
        user: UserArg,

        #[arg(short, long)]
        product: ProductId,
    },
    /// Set the quantity of a cart line (0 removes it)
    Update {
        #[command(flatten)]
        user: UserArg,

        #[arg(short, long)]
        product: ProductId,

        #[arg(short, long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty a cart
    Clear(UserArg),
    /// Check a cart against current stock
    Validate(UserArg),
    /// Turn a cart into an order and take the stock
    Checkout(UserArg),
}

impl Cli {
    /// Flags win over environment variables, which win over defaults.
    fn store_config(&self) -> StoreConfig {
        let backend = self.backend.map(|b| b.to_string());
        let data_dir = self.data_dir.clone();
        StoreConfig::from_lookup(|key| {
            let flag = match key {
                BACKEND_ENV => backend.clone(),
                DATA_DIR_ENV => data_dir.clone(),
                _ => None,
            };
            flag.or_else(|| std::env::var(key).ok())
        })
    }
}

fn main() -> ExitCode {
    webstore_observability::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.store_config();
    let store = config.open_backend().with_context(|| {
        format!(
            "opening {} store at {}",
            config.backend,
            config.data_dir.display()
        )
    })?;
    let mut engine: Engine = CartEngine::new(store);
    let json = cli.json;

    match cli.command {
        Commands::Seed => commands::seed::sample_catalog(&engine, json)?,
        Commands::Products { category, search } => {
            commands::catalog::list(&engine, category.as_deref(), search.as_deref(), json)?
        }
        Commands::Categories => commands::catalog::categories(&engine, json)?,
        Commands::Cart(UserArg { user }) => commands::cart::show(&mut engine, &user, json)?,
        Commands::Add {
            user: UserArg { user },
            product,
            quantity,
        } => commands::cart::add(&mut engine, &user, &product, quantity, json)?,
        Commands::Remove {
            user: UserArg { user },
            product,
        } => commands::cart::remove(&mut engine, &user, &product, json)?,
        Commands::Update {
            user: UserArg { user },
            product,
            quantity,
        } => commands::cart::update(&mut engine, &user, &product, quantity, json)?,
        Commands::Clear(UserArg { user }) => commands::cart::clear(&mut engine, &user, json)?,
        Commands::Validate(UserArg { user }) => commands::cart::validate(&mut engine, &user, json)?,
        Commands::Checkout(UserArg { user }) => commands::cart::checkout(&mut engine, &user, json)?,
    }
    Ok(())
}

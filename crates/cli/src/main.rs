//! Drovo CLI - Browse shops, check out, and run a shop from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! drovo shops
//! drovo menu 66f1c2 --category Paneer
//!
//! # Log in and order
//! drovo login -e asha@example.com
//! drovo checkout 66f1c2 -i 6701ab=3 -i 6701ac --first-name Asha --last-name Rao \
//!     --phone 9876543210 --street "MG Road, Pune" --lat 18.52 --lng 73.85 --flat 4B \
//!     --distance 1800
//! drovo orders
//!
//! # Shop owners
//! drovo dashboard
//! drovo manage orders
//! drovo manage status 6702ff "Out for delivery"
//! ```
//!
//! # Environment Variables
//!
//! - `DROVO_API_URL` - Base URL of the marketplace API (required)
//! - `DROVO_SESSION_FILE` - Where the login is remembered
//! - `DROVO_PASSWORD` - Password for `login`/`register` when not passed inline
//! - `RUST_LOG` - Log filter (default `drovo_cli=info,drovo_client=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use drovo_client::{ClientConfig, Store};
use drovo_core::UserType;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::checkout::CheckoutArgs;
use commands::subscription::SubscribeAction;

#[derive(Parser)]
#[command(name = "drovo")]
#[command(author, version, about = "Drovo marketplace CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all shops
    Shops,
    /// Show a shop's menu
    Menu {
        /// Shop id
        shop: String,

        /// Only show one category (`ALL` shows everything)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DROVO_PASSWORD", hide_env_values = true)]
        password: String,

        /// Log in to a shop account
        #[arg(long)]
        shop: bool,
    },
    /// Create a customer account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DROVO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Start a shop sign-up; a one-time password is mailed
    SignupShop {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DROVO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Finish a shop sign-up with the mailed one-time password
    VerifyShop {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DROVO_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        otp: String,
    },
    /// Forget the saved login
    Logout,
    /// Show who is logged in
    Whoami,
    /// Put items in a shop's cart and place the order
    Checkout(CheckoutArgs),
    /// List my orders
    Orders,
    /// Show one order
    Order {
        /// Order id
        id: String,
    },
    /// Send feedback about an order to its shop
    Feedback {
        /// Order id
        order: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// 1 to 5 stars
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,

        #[arg(short, long)]
        message: String,
    },
    /// Show my shop (shop accounts)
    Dashboard,
    /// Manage my shop's items (shop accounts)
    Food {
        #[command(subcommand)]
        action: FoodAction,
    },
    /// Manage incoming orders (shop accounts)
    Manage {
        #[command(subcommand)]
        action: ManageAction,
    },
    /// List subscription plans
    Plans,
    /// Pay for or renew a shop subscription (shop accounts)
    Subscribe {
        #[command(subcommand)]
        action: SubscribeAction,
    },
}

#[derive(Subcommand)]
enum FoodAction {
    /// List my items
    List,
    /// Add an item
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Price per package in rupees
        #[arg(short, long)]
        price: String,

        #[arg(short, long)]
        category: String,

        /// `grams`, `Kg`, `ml`, `liter`, `item`, `dozen`
        #[arg(short, long)]
        unit: String,

        /// Amount per package, in `unit`
        #[arg(short, long)]
        quantity: u32,

        /// Image file to upload
        #[arg(short, long)]
        image: std::path::PathBuf,
    },
    /// Remove an item
    Remove {
        /// Item id
        id: String,
    },
}

#[derive(Subcommand)]
enum ManageAction {
    /// List orders received, newest first
    Orders,
    /// Change an order's status
    Status {
        /// Order id
        id: String,

        /// `Food Processing`, `Out for delivery` or `Delivered`
        status: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "drovo_cli=info,drovo_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = Store::open(config)?;

    let result = dispatch(cli.command, &mut store).await;

    // Let queued cart changes reach the server before exiting
    store.shutdown().await;
    result
}

async fn dispatch(command: Commands, store: &mut Store) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Shops => commands::shops::list(store).await?,
        Commands::Menu { shop, category } => {
            commands::shops::menu(store, &shop, category.as_deref()).await?;
        }
        Commands::Login {
            email,
            password,
            shop,
        } => {
            let role = if shop { UserType::Shop } else { UserType::User };
            commands::account::login(store, &email, &password, role).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(store, &name, &email, &password).await?,
        Commands::SignupShop { email, password } => {
            commands::account::signup_shop(store, &email, &password).await?;
        }
        Commands::VerifyShop {
            name,
            email,
            password,
            otp,
        } => commands::account::verify_shop(store, &name, &email, &password, &otp).await?,
        Commands::Logout => commands::account::logout(store)?,
        Commands::Whoami => commands::account::whoami(store),
        Commands::Checkout(args) => commands::checkout::run(store, args).await?,
        Commands::Orders => commands::orders::mine(store).await?,
        Commands::Order { id } => commands::orders::show(store, &id).await?,
        Commands::Feedback {
            order,
            name,
            email,
            rating,
            message,
        } => commands::orders::feedback(store, &order, &name, &email, rating, &message).await?,
        Commands::Dashboard => commands::owner::dashboard(store).await?,
        Commands::Food { action } => match action {
            FoodAction::List => commands::owner::list_food(store).await?,
            FoodAction::Add {
                name,
                description,
                price,
                category,
                unit,
                quantity,
                image,
            } => {
                let item = commands::owner::NewItemArgs {
                    name,
                    description,
                    price,
                    category,
                    unit,
                    quantity,
                    image,
                };
                commands::owner::add_food(store, item).await?;
            }
            FoodAction::Remove { id } => commands::owner::remove_food(store, &id).await?,
        },
        Commands::Manage { action } => match action {
            ManageAction::Orders => commands::owner::orders(store).await?,
            ManageAction::Status { id, status } => {
                commands::owner::set_status(store, &id, &status).await?;
            }
        },
        Commands::Plans => commands::subscription::plans(),
        Commands::Subscribe { action } => commands::subscription::run(store, action).await?,
    }
    Ok(())
}

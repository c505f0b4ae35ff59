//! Comanda CLI - terminal front end for the order-management dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Log in (persists the session under COMANDA_SESSION_DIR)
//! comanda login -e admin@example.com -p secret
//!
//! # Who am I?
//! comanda whoami
//!
//! # Resource screens
//! comanda clients list
//! comanda products categories
//! comanda orders create -c 4 -l 1:2 -l 3:1
//!
//! # Kitchen workflow
//! comanda orders advance 11
//! comanda orders cancel 11
//!
//! # Log out
//! comanda logout
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` - Session lifecycle
//! - `clients` - Client records
//! - `products` - Product catalog
//! - `orders` - Orders and the status workflow

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use comanda_core::{ClientId, OrderId, OrderStatus, ProductId};

mod commands;

use commands::orders::LineSpec;

#[derive(Parser)]
#[command(name = "comanda")]
#[command(author, version, about = "Comanda dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        /// Email or username
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Clear the session locally and server-side
    Logout,
    /// Show the logged-in user and verify the session with the backend
    Whoami,
    /// Client records
    Clients {
        #[command(subcommand)]
        action: ClientsAction,
    },
    /// Product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Orders and the status workflow
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum ClientsAction {
    /// List all clients
    List,
    /// Search clients by free text
    Search { query: String },
    /// Create a client (admin)
    Create {
        #[arg(short, long)]
        first_name: String,
        #[arg(short, long)]
        last_name: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Update a client (admin)
    Update {
        id: i64,
        #[arg(short, long)]
        first_name: String,
        #[arg(short, long)]
        last_name: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Delete a client (admin)
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List active products
    List,
    /// List every product including inactive ones (admin)
    All,
    /// List category constants
    Categories,
    /// Search products by free text
    Search { query: String },
    /// List products in one category
    ByCategory { category: String },
    /// Create a product (admin)
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        price: rust_decimal::Decimal,
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value_t = 0)]
        stock: u32,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Update a product (admin)
    Update {
        id: i64,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        price: rust_decimal::Decimal,
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value_t = 0)]
        stock: u32,
        #[arg(short, long)]
        description: Option<String>,
        /// Mark the product inactive instead of active
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a product (admin)
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List all orders
    List,
    /// Create a pending order (admin)
    Create {
        /// Client ID
        #[arg(short, long)]
        client: i64,

        /// Order line as `product_id:quantity`; repeatable
        #[arg(short, long = "line", required = true)]
        lines: Vec<LineSpec>,
    },
    /// Advance an order one step along the workflow (admin)
    Advance { id: i64 },
    /// Cancel an open order (admin)
    Cancel { id: i64 },
    /// Move an order to an explicit status (admin)
    SetStatus { id: i64, status: OrderStatus },
    /// Delete an order (admin)
    Delete { id: i64 },
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
    let ctx = commands::Context::from_env().await?;

    let result = dispatch(&ctx, cli.command).await;

    // Surface whatever the command left on the notification channels.
    commands::report_notices(&ctx);

    match result {
        Ok(()) => Ok(()),
        // A 401 from any endpoint tears the session down here, once. The
        // guard also lands here when no session was present to begin with;
        // then there is nothing to tear down.
        Err(e) if e.is_unauthorized() => {
            if ctx.session.is_authenticated().await {
                ctx.session.force_logout().await;
                commands::report_notices(&ctx);
            }
            tracing::warn!(
                "Redirected to {}",
                comanda_dashboard::guard::Route::Login.path()
            );
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn dispatch(
    ctx: &commands::Context,
    command: Commands,
) -> comanda_dashboard::error::Result<()> {
    match command {
        Commands::Login { email, password } => commands::auth::login(ctx, &email, &password).await,
        Commands::Logout => commands::auth::logout(ctx).await,
        Commands::Whoami => commands::auth::whoami(ctx).await,
        Commands::Clients { action } => {
            commands::guard_dashboard(ctx, "/dashboard/clients").await?;
            match action {
                ClientsAction::List => commands::clients::list(ctx).await,
                ClientsAction::Search { query } => commands::clients::search(ctx, &query).await,
                ClientsAction::Create {
                    first_name,
                    last_name,
                    email,
                    phone,
                    address,
                } => {
                    commands::clients::create(ctx, first_name, last_name, email, phone, address)
                        .await
                }
                ClientsAction::Update {
                    id,
                    first_name,
                    last_name,
                    email,
                    phone,
                    address,
                } => {
                    commands::clients::update(
                        ctx,
                        ClientId::new(id),
                        first_name,
                        last_name,
                        email,
                        phone,
                        address,
                    )
                    .await
                }
                ClientsAction::Delete { id } => {
                    commands::clients::delete(ctx, ClientId::new(id)).await
                }
            }
        }
        Commands::Products { action } => {
            commands::guard_dashboard(ctx, "/dashboard/products").await?;
            match action {
                ProductsAction::List => commands::products::list(ctx).await,
                ProductsAction::All => commands::products::all(ctx).await,
                ProductsAction::Categories => commands::products::categories(ctx).await,
                ProductsAction::Search { query } => commands::products::search(ctx, &query).await,
                ProductsAction::ByCategory { category } => {
                    commands::products::by_category(ctx, &category).await
                }
                ProductsAction::Create {
                    name,
                    price,
                    category,
                    stock,
                    description,
                } => {
                    commands::products::create(ctx, name, price, category, stock, description)
                        .await
                }
                ProductsAction::Update {
                    id,
                    name,
                    price,
                    category,
                    stock,
                    description,
                    inactive,
                } => {
                    commands::products::update(
                        ctx,
                        ProductId::new(id),
                        name,
                        price,
                        category,
                        stock,
                        description,
                        !inactive,
                    )
                    .await
                }
                ProductsAction::Delete { id } => {
                    commands::products::delete(ctx, ProductId::new(id)).await
                }
            }
        }
        Commands::Orders { action } => {
            commands::guard_dashboard(ctx, "/dashboard/orders").await?;
            match action {
                OrdersAction::List => commands::orders::list(ctx).await,
                OrdersAction::Create { client, lines } => {
                    commands::orders::create(ctx, ClientId::new(client), &lines).await
                }
                OrdersAction::Advance { id } => {
                    commands::orders::advance(ctx, OrderId::new(id)).await
                }
                OrdersAction::Cancel { id } => {
                    commands::orders::cancel(ctx, OrderId::new(id)).await
                }
                OrdersAction::SetStatus { id, status } => {
                    commands::orders::set_status(ctx, OrderId::new(id), status).await
                }
                OrdersAction::Delete { id } => {
                    commands::orders::delete(ctx, OrderId::new(id)).await
                }
            }
        }
    }
}

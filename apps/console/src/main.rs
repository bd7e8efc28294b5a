//! # Pantry Console
//!
//! Headless front end of the admin console.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Console Startup                                 │
//! │                                                                         │
//! │  1. init_tracing()          RUST_LOG or the built-in filter             │
//! │  2. ConsoleConfig::load()   console.toml + PANTRY_* overrides           │
//! │  3. Session::open()         restores the token, PANTRY_TOKEN wins       │
//! │  4. Gateway                 HttpGateway, or InMemoryGateway (--demo)    │
//! │  5. Auth::login()           only with --email and --password            │
//! │  6. Console::refresh_all()  categories, inventory, companies at once    │
//! │  7. Render                  category tree, inventory page, company      │
//! │                             branches, pending notifications             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use pantry_client::{Console, ConsoleConfig, InMemoryGateway, Session};
use pantry_core::tree::flatten;
use pantry_core::validation::{validate_page_size, validate_search_query};
use pantry_core::{build_forest, project, Category, Credentials, EntityId, InventoryItem, SortDirection, ViewParams};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Pantry retail admin console.
#[derive(Parser, Debug)]
#[command(name = "pantry-console", version)]
struct Args {
    /// Serve built-in bakery data instead of calling the API
    #[arg(long)]
    demo: bool,

    /// Path to console.toml
    #[arg(long, short, env = "PANTRY_CONFIG")]
    config: Option<PathBuf>,

    /// Inventory search query
    #[arg(long, short, default_value = "")]
    search: String,

    /// Inventory column to sort by
    #[arg(long)]
    sort: Option<String>,

    /// Sort direction: asc or desc
    #[arg(long, default_value = "asc")]
    direction: String,

    /// Inventory rows per page (10, 25 or 100)
    #[arg(long)]
    page_size: Option<usize>,

    /// Zero-based inventory page
    #[arg(long, default_value_t = 0)]
    page: usize,

    /// Company whose branches to show
    #[arg(long)]
    company: Option<EntityId>,

    /// Sign in with this email before loading
    #[arg(long, requires = "password")]
    email: Option<String>,

    /// Password for --email
    #[arg(long, env = "PANTRY_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = ConsoleConfig::load(args.config.clone())?;

    let console = if args.demo {
        info!("Using demo data");
        Console::new(Arc::new(InMemoryGateway::demo()), &config.store)
    } else {
        let session = Arc::new(Session::open(&config.session)?);
        if let Some(token) = ConsoleConfig::env_token() {
            session.start(token)?;
        }
        if !session.is_authenticated() && args.email.is_none() {
            warn!("No session token, the API will likely answer 401");
        }
        Console::connect(&config, session)?
    };

    if let (Some(email), Some(password)) = (&args.email, &args.password) {
        let user = console
            .auth
            .login(&Credentials::new(email.as_str(), password.as_str()))
            .await?;
        println!("Signed in as {} ({})", user.display_name(), user.email);
        println!();
    }

    for (kind, result) in console.refresh_all().await {
        match result {
            Ok(count) => info!(resource = %kind, count, "Loaded"),
            Err(e) => warn!(resource = %kind, error = %e, "Load failed"),
        }
    }

    print_categories(&console);
    print_inventory(&console, &args, config.view.default_page_size)?;

    let company_id = args
        .company
        .or_else(|| console.companies.read(|companies| companies.first().map(|c| c.id)));
    if let Some(id) = company_id {
        if console.company.select(id).settled().await.is_ok() {
            print_branches(&console);
        }
    }

    print_notifications(&console);
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - Set via `RUST_LOG` environment variable
/// - Default: INFO, pantry crates at DEBUG
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pantry=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_categories(console: &Console) {
    println!("Categories");
    let forest = console.categories.read(build_forest::<Category>);
    if forest.is_empty() {
        println!("  (none)");
    }
    for (category, depth) in flatten(&forest) {
        println!("  {}{} [{}]", "  ".repeat(depth), category.name, category.id);
    }
    println!();
}

fn print_inventory(console: &Console, args: &Args, default_page_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let page_size = args.page_size.unwrap_or(default_page_size);
    validate_page_size(page_size)?;

    let mut params = ViewParams::for_table::<InventoryItem>();
    params.set_search(validate_search_query(&args.search)?);
    params.set_page_size(page_size);
    if let Some(key) = &args.sort {
        let direction: SortDirection = args.direction.parse()?;
        params.sort_by::<InventoryItem>(key, direction)?;
    }
    params.set_page(args.page);

    console.inventory.read(|items| {
        let view = project(items, &params);
        println!(
            "Inventory (page {} of {}, {} matching)",
            params.page_index + 1,
            view.page_count(params.page_size).max(1),
            view.total_matched
        );
        for item in &view.page {
            let flag = if item.needs_reorder() { "  reorder" } else { "" };
            println!(
                "  {:<8} {:<20} {:>8.2} {:<3} {:>8.2}{}",
                item.code, item.name, item.quantity, item.unit, item.unit_price, flag
            );
        }
    });
    println!();
    Ok(())
}

fn print_branches(console: &Console) {
    let Some(company) = console.company.current() else {
        return;
    };
    println!("Branches of {}", company.name);
    for (store, depth) in flatten(&console.company.store_forest()) {
        let status = if store.is_active { "" } else { " (inactive)" };
        println!("  {}{} [{}]{}", "  ".repeat(depth), store.name, store.code, status);
    }
    println!();
}

fn print_notifications(console: &Console) {
    let notes = console.notifications.list();
    if notes.is_empty() {
        return;
    }
    println!("Notifications");
    for note in notes {
        println!("  [{}] {}", note.kind, note.message);
    }
}

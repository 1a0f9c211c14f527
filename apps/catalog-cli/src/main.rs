//! # Catalog CLI
//!
//! Command-line front end over [`CatalogHandle`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          catalog <command>                              │
//! │                                                                         │
//! │  CatalogConfig::load ───► CatalogEngineBuilder ───► CatalogHandle       │
//! │                                   │                       │             │
//! │                                   ▼                       ▼             │
//! │                           ConsoleEmitter          list / show / add /   │
//! │                           (stderr notices)        update / delete       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info,catalog_sync=info`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use catalog_core::{CatalogState, Product, ProductDraft, ProductId};
use catalog_sync::{
    CatalogConfig, CatalogEngineBuilder, CatalogEventEmitter, CatalogHandle, Notice, UpdateReport,
};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Command Line
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "catalog", version, about = "Browse and edit a remote product catalog")]
struct Cli {
    /// Path to a catalog.toml (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print products as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products, optionally filtered by category or search text
    List {
        /// Category identifier (e.g. "smartphones")
        #[arg(long, conflicts_with = "search")]
        category: Option<String>,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// List category identifiers
    Categories,

    /// Show one product and related products
    Show { id: ProductId },

    /// Add a product
    Add(DraftArgs),

    /// Edit a product; omitted fields keep their current value
    Update {
        id: ProductId,

        #[command(flatten)]
        fields: DraftArgs,
    },

    /// Delete a product
    Delete { id: ProductId },

    /// Write the effective configuration to disk
    InitConfig,
}

#[derive(Args, Debug, Default)]
struct DraftArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    stock: Option<i64>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

impl DraftArgs {
    /// Overlays the given fields onto `draft`.
    fn apply_to(self, mut draft: ProductDraft) -> ProductDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(stock) = self.stock {
            draft.stock = stock;
        }
        if let Some(brand) = self.brand {
            draft.brand = brand;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        draft
    }
}

// =============================================================================
// Console Notices
// =============================================================================

/// Prints notices and fetch errors to stderr.
struct ConsoleEmitter;

impl CatalogEventEmitter for ConsoleEmitter {
    fn emit_notice(&self, notice: &Notice) {
        let marker = if notice.is_failure() { "✗" } else { "✓" };
        eprintln!("{} {}", marker, notice.message());
    }

    fn emit_fetch_error(&self, message: &str, retryable: bool) {
        if retryable {
            eprintln!("✗ {} (retry with the same command)", message);
        } else {
            eprintln!("✗ {}", message);
        }
    }
}

// =============================================================================
// Entry Point
// =============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,catalog_sync=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = CatalogConfig::load(cli.config.clone()).context("loading configuration")?;
    info!(base_url = %config.base_url(), "Configuration loaded");

    if let Command::InitConfig = cli.command {
        config.save(cli.config).context("saving configuration")?;
        println!("Configuration written");
        return Ok(());
    }

    let catalog = CatalogEngineBuilder::new(config)
        .with_emitter(Arc::new(ConsoleEmitter))
        .spawn()
        .context("starting catalog engine")?;

    let result = run(&catalog, cli.command, cli.json).await;
    catalog.shutdown().await?;
    result
}

async fn run(catalog: &CatalogHandle, command: Command, json: bool) -> anyhow::Result<()> {
    match command {
        Command::List {
            category,
            search,
            pages,
        } => {
            if let Some(category) = category {
                catalog.set_category(category).await?;
            } else if let Some(search) = search {
                catalog.set_search_text(search).await?;
            }

            catalog.refresh().await?;
            let mut state = catalog.wait_until_settled().await?;

            for page in 1..pages {
                if !catalog.request_next_page().await? {
                    debug!(page, "No further page requested");
                    break;
                }
                state = catalog.wait_until_settled().await?;
            }

            if let Some(error) = &state.error {
                bail!("listing failed: {}", error);
            }
            print_listing(&state, json)?;
        }
        Command::Categories => {
            for category in catalog.categories().await? {
                println!("{}", category);
            }
        }
        Command::Show { id } => {
            let product = catalog.get_product(id).await?;
            let related = catalog.related_products(&product).await?;

            if json {
                let value = serde_json::json!({ "product": product, "related": related });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_product(&product);
                if !related.is_empty() {
                    println!();
                    println!("Related:");
                    for product in &related {
                        print_row(product);
                    }
                }
            }
        }
        Command::Add(fields) => {
            let draft = fields.apply_to(ProductDraft::default());
            let created = catalog.create_product(draft).await?;
            print_product(&created);
        }
        Command::Update { id, fields } => {
            let report = update(catalog, id, fields).await?;
            print_product(&report.product);
        }
        Command::Delete { id } => {
            catalog.delete_product(id).await?;
        }
        Command::InitConfig => bail!("init-config runs without the engine"),
    }
    Ok(())
}

/// Edits `id` with the given fields overlaid on its current values.
///
/// The edit is committed locally even when the server rejects it; that case
/// is reported by the `UpdateRemoteFailed` notice, not as an error.
async fn update(catalog: &CatalogHandle, id: ProductId, fields: DraftArgs) -> anyhow::Result<UpdateReport> {
    let base = catalog.edit_base(id).await;
    let draft = fields.apply_to(ProductDraft::from(&base));
    let report = catalog.update_product_from(&base, draft).await?;

    if let Some(reason) = &report.remote_error {
        warn!(product_id = id, error = %reason, "Server kept its copy; local edit applied");
    }
    Ok(report)
}

// =============================================================================
// Output
// =============================================================================

fn print_listing(state: &CatalogState, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&state.items)?);
        return Ok(());
    }

    for product in &state.items {
        print_row(product);
    }
    println!(
        "-- {} products ({}){}",
        state.items.len(),
        state.mode,
        if state.has_more { ", more available" } else { "" }
    );
    Ok(())
}

fn print_row(product: &Product) {
    println!(
        "{:>5}  {:<40}  {:>10.2}  {:>5}  {}",
        product.id, product.title, product.price, product.stock, product.category
    );
}

fn print_product(product: &Product) {
    println!("#{} {}", product.id, product.title);
    println!("  brand:    {}", product.brand);
    println!("  category: {}", product.category);
    println!("  price:    {:.2}", product.price);
    println!("  stock:    {}", product.stock);
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog_sync::{CatalogError, CatalogResult, CatalogTransport};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Serves one product and rejects every write with 404.
    #[derive(Default)]
    struct ReadOnlyRemote {
        requests: Mutex<Vec<String>>,
    }

    impl ReadOnlyRemote {
        fn log(&self, method: &str, path: &[&str]) {
            self.requests
                .lock()
                .unwrap()
                .push(format!("{} {}", method, path.join("/")));
        }
    }

    #[async_trait]
    impl CatalogTransport for ReadOnlyRemote {
        async fn get(&self, path: &[&str], _query: &[(String, String)]) -> CatalogResult<Value> {
            self.log("GET", path);
            Ok(json!({
                "id": 7,
                "title": "Lamp",
                "description": "Desk lamp",
                "price": 20.0,
                "stock": 4,
                "brand": "Acme",
                "category": "home-decoration"
            }))
        }

        async fn post(&self, path: &[&str], _body: Value) -> CatalogResult<Value> {
            self.log("POST", path);
            Err(CatalogError::NotFound(path.join("/")))
        }

        async fn patch(&self, path: &[&str], _body: Value) -> CatalogResult<Value> {
            self.log("PATCH", path);
            Err(CatalogError::NotFound(path.join("/")))
        }

        async fn delete(&self, path: &[&str]) -> CatalogResult<Value> {
            self.log("DELETE", path);
            Err(CatalogError::NotFound(path.join("/")))
        }
    }

    #[tokio::test]
    async fn test_update_succeeds_when_server_rejects_patch() {
        let remote = Arc::new(ReadOnlyRemote::default());
        let catalog = CatalogEngineBuilder::new(CatalogConfig::default())
            .with_transport(remote.clone())
            .spawn()
            .unwrap();

        let fields = DraftArgs {
            price: Some(25.5),
            ..Default::default()
        };
        let report = update(&catalog, 7, fields).await.unwrap();

        assert_eq!(report.product.price, 25.5);
        assert_eq!(report.product.title, "Lamp");
        assert!(!report.remote_confirmed());
        assert_eq!(
            *remote.requests.lock().unwrap(),
            vec!["GET products/7".to_string(), "PATCH products/7".to_string()]
        );

        catalog.shutdown().await.unwrap();
    }

    #[test]
    fn test_cli_parses_list_flags() {
        let cli = Cli::parse_from(["catalog", "list", "--category", "laptops", "--pages", "3"]);
        match cli.command {
            Command::List {
                category, pages, ..
            } => {
                assert_eq!(category.as_deref(), Some("laptops"));
                assert_eq!(pages, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_category_and_search_conflict() {
        let parsed = Cli::try_parse_from(["catalog", "list", "--category", "a", "--search", "b"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_draft_args_overlay_only_given_fields() {
        let current = ProductDraft {
            title: "Lamp".into(),
            description: "Desk lamp".into(),
            price: 20.0,
            stock: 4,
            brand: "Acme".into(),
            category: "home-decoration".into(),
        };
        let fields = DraftArgs {
            price: Some(25.5),
            ..Default::default()
        };

        let draft = fields.apply_to(current.clone());
        assert_eq!(draft.price, 25.5);
        assert_eq!(draft.title, current.title);
        assert_eq!(draft.category, current.category);
    }
}

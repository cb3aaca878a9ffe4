//! # Promotion Seeder
//!
//! Installs the built-in promotion codes into the store.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by COMANDA_DB_PATH (default ./comanda.db)
//! cargo run -p comanda-db --bin seed
//!
//! # Specify database path
//! cargo run -p comanda-db --bin seed -- --db ./data/comanda.db
//!
//! # Show what is active afterwards
//! RUST_LOG=debug cargo run -p comanda-db --bin seed -- --list
//! ```
//!
//! Existing codes are never overwritten, so re-running is safe.

use std::env;

use comanda_db::{Database, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = StoreConfig::from_env()?;
    let mut list = false;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--list" | "-l" => list = true,
            "--help" | "-h" => {
                println!("Comanda Promotion Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $COMANDA_DB_PATH or ./comanda.db)");
                println!("  -l, --list         List active promotions after seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), "Seeding promotions");

    // Seeding always needs the schema
    let db = Database::new(config.db_config().run_migrations(true)).await?;
    let repo = db.promotions();

    let inserted = repo.seed_defaults().await?;
    let total = repo.count().await?;
    println!("✓ Inserted {} promotions ({} stored)", inserted, total);

    if list {
        for promotion in repo.list_active().await? {
            println!(
                "  {:<14} {:<28} {}",
                promotion.code,
                promotion.description,
                promotion.discount_label()
            );
        }
    }

    db.close().await;
    Ok(())
}

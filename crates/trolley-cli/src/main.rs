//! Command-line front end for the trolley crate.
//!
//! ```text
//! trolley migrate                  run pending schema migrations
//! trolley status                   show which migrations have been applied
//! trolley seed                     load demo data into the database
//! trolley savings <item>...        rank stores for a basket of items
//! trolley switch <list-id>         recommend a store for a shopping list
//! trolley prices <query>           compare prices for matching products
//! trolley priorities [limit]       show the pending crawl queue
//! ```

mod render;
mod seed;

use tokio_postgres::NoTls;
use tracing_subscriber::EnvFilter;
use trolley::{MigrationRunner, SubstringMatcher, analyze_savings, recommend_store_switch};
use trolley::{price, signal};

fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((cmd, rest)) = args.split_first() else {
        print_usage();
        std::process::exit(2);
    };

    if let Err(err) = dispatch(cmd, rest) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn dispatch(cmd: &str, rest: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    match cmd {
        "migrate" => rt.block_on(run_migrate()),
        "status" => rt.block_on(run_status()),
        "seed" => rt.block_on(seed::seed()),
        "savings" => {
            let (store, items) = store_flag(rest);
            if items.is_empty() {
                print_usage();
                std::process::exit(2);
            }
            rt.block_on(run_savings(&items, store.as_deref()))
        }
        "switch" => {
            let (store, positional) = store_flag(rest);
            let Some(list_id) = positional.first().and_then(|s| s.parse::<i64>().ok()) else {
                print_usage();
                std::process::exit(2);
            };
            rt.block_on(run_switch(list_id, store.as_deref()))
        }
        "prices" => {
            let query = rest.join(" ");
            if query.is_empty() {
                print_usage();
                std::process::exit(2);
            }
            rt.block_on(run_prices(&query))
        }
        "priorities" => {
            let limit = rest
                .first()
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(20);
            rt.block_on(run_priorities(limit))
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    }
}

fn print_usage() {
    println!("trolley - grocery price comparison toolkit");
    println!();
    println!("Usage:");
    println!("  trolley migrate                  run pending schema migrations");
    println!("  trolley status                   show which migrations have been applied");
    println!("  trolley seed                     load demo data into the database");
    println!("  trolley savings <item>...        rank stores for a basket of items");
    println!("  trolley switch <list-id>         recommend a store for a shopping list");
    println!("  trolley prices <query>           compare prices for matching products");
    println!("  trolley priorities [limit]       show the pending crawl queue");
    println!();
    println!("Options:");
    println!("  --store=NAME    restrict savings/switch to a single store");
    println!();
    println!("Environment:");
    println!("  DATABASE_URL    Postgres connection string");
    println!("                  (default: postgres://localhost/trolley)");
}

fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/trolley".to_string())
}

/// Pull `--store=NAME` out of the argument list.
fn store_flag(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut store = None;
    let mut positional = Vec::new();
    for arg in args {
        if let Some(name) = arg.strip_prefix("--store=") {
            store = Some(name.to_string());
        } else {
            positional.push(arg.clone());
        }
    }
    (store, positional)
}

// Migration commands need exclusive access to the client, so they skip the
// shared connection helper.
async fn migration_client() -> Result<tokio_postgres::Client, Box<dyn std::error::Error>> {
    let (client, connection) = tokio_postgres::connect(&database_url(), NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("Connection error: {}", e);
        }
    });
    Ok(client)
}

async fn run_migrate() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = migration_client().await?;
    let ran = MigrationRunner::new(&mut client).migrate().await?;
    if ran.is_empty() {
        println!("Database is up to date.");
    } else {
        for version in &ran {
            println!("  ✓ {}", version);
        }
        println!("Applied {} migration(s).", ran.len());
    }
    Ok(())
}

async fn run_status() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = migration_client().await?;
    let status = MigrationRunner::new(&mut client).status().await?;
    print!("{}", render::render_status(&status));
    Ok(())
}

async fn run_savings(
    items: &[String],
    store: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = trolley::connect(&database_url()).await?;
    let rows = analyze_savings(&provider, &SubstringMatcher, items, store).await?;
    if rows.is_empty() {
        println!("No store carries any of those items.");
    } else {
        print!("{}", render::render_savings(&rows));
    }
    Ok(())
}

async fn run_switch(list_id: i64, store: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let provider = trolley::connect(&database_url()).await?;
    let rows = recommend_store_switch(&provider, &SubstringMatcher, list_id, store).await?;
    if rows.is_empty() {
        println!("No store can fulfil any item on that list.");
    } else {
        print!("{}", render::render_switches(&rows));
    }
    Ok(())
}

async fn run_prices(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let provider = trolley::connect(&database_url()).await?;
    let rows = price::compare_product_prices(&provider, query, 50).await?;

    // A search is a crawl-priority signal too, but never a reason to fail.
    if let Err(e) = signal::record_search(&provider, query, None).await {
        tracing::warn!(error = %e, "failed to record search signal");
    }

    if rows.is_empty() {
        println!("No prices found for \"{}\".", query);
    } else {
        print!("{}", render::render_prices(&rows));
    }
    Ok(())
}

async fn run_priorities(limit: i64) -> Result<(), Box<dyn std::error::Error>> {
    let provider = trolley::connect(&database_url()).await?;
    let rows = signal::top_pending(&provider, limit).await?;
    if rows.is_empty() {
        println!("Crawl queue is empty.");
    } else {
        print!("{}", render::render_priorities(&rows));
    }
    Ok(())
}

//! Recipe Researcher
//!
//! Works out the total raw materials needed to craft a list of items from a
//! multi-level recipe table.

mod calculator;
mod catalog;
mod config;
mod db;
mod error;
mod logging;
mod models;
mod report;
mod request;
mod suggest;
mod table;

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::config::{Snapshot, SnapshotStore};
use crate::error::CalcError;
use crate::models::{Ingredient, RecipeRow};
use crate::report::{MaterialsReport, SuggestionReport};

#[derive(Parser)]
#[command(name = "recipe-researcher")]
#[command(about = "Calculate the total raw materials needed to craft items")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Recipe table to use instead of the configured one (csv, xlsx, directory or .db)
    #[arg(short, long, global = true)]
    table: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate materials for a request like "Iron Sword:2,Shield:1"
    Materials {
        /// Comma separated Item:Quantity pairs
        request: String,

        /// Also list intermediate materials crafted along the way
        #[arg(short, long)]
        intermediate: bool,
    },

    /// Read one request per line from stdin, reloading the table each time
    Repl {
        /// Also list intermediate materials crafted along the way
        #[arg(short, long)]
        intermediate: bool,
    },

    /// List all craftable items
    Items,

    /// Show every recipe variant for an item
    Recipe {
        /// Item name
        item: String,
    },

    /// Import recipe sheets (file or directory) into a SQLite database
    Import {
        /// CSV/Excel file or directory of them
        source: PathBuf,

        /// Path to the SQLite database
        #[arg(short, long, default_value = "recipes.db")]
        database: PathBuf,

        /// Clear existing recipes before import
        #[arg(long)]
        clear: bool,
    },

    /// Initialize empty database with schema
    Init {
        /// Path to the SQLite database
        #[arg(short, long, default_value = "recipes.db")]
        database: PathBuf,
    },

    /// Load a small sample recipe table for testing
    LoadSample {
        /// Path to the SQLite database
        #[arg(short, long, default_value = "recipes.db")]
        database: PathBuf,
    },
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Materials {
            request,
            intermediate,
        } => {
            let snapshot = Snapshot::load(&cli.config, cli.table.as_deref())?;
            println!("{}", answer(&snapshot, &request, intermediate)?);
        }

        Commands::Repl { intermediate } => {
            let store = SnapshotStore::new(cli.config, cli.table);
            run_repl(&store, intermediate)?;
        }

        Commands::Items => {
            let snapshot = Snapshot::load(&cli.config, cli.table.as_deref())?;
            if snapshot.catalog.is_empty() {
                bail!("No recipes loaded from {}", snapshot.config.table.display());
            }
            println!(
                "Craftable items ({} items, {} recipe rows):",
                snapshot.catalog.craftable_count(),
                snapshot.catalog.len()
            );
            for item in snapshot.catalog.craftable_items() {
                println!("  {}", item);
            }
        }

        Commands::Recipe { item } => {
            let snapshot = Snapshot::load(&cli.config, cli.table.as_deref())?;
            let rows = snapshot.catalog.lookup(&item);
            if rows.is_empty() {
                println!("No recipe for '{}'", item);
            }
            for (idx, row) in rows.iter().enumerate() {
                println!(
                    "{} (variant {}, makes {} per batch)",
                    row.output_item,
                    idx + 1,
                    row.yield_per_batch
                );
                for ingredient in &row.ingredients {
                    let kind = if snapshot.catalog.is_craftable(&ingredient.material) {
                        "craftable"
                    } else {
                        "raw"
                    };
                    println!("    {} x {} ({})", ingredient.material, ingredient.quantity, kind);
                }
            }
        }

        Commands::Import {
            source,
            database,
            clear,
        } => {
            let (rows, stats) = table::read_rows(&source)
                .with_context(|| format!("Failed to read recipe table {}", source.display()))?;

            let mut conn = Connection::open(&database)?;
            db::init_schema(&conn)?;
            if clear {
                println!("Clearing existing recipes...");
                db::clear_recipes(&conn)?;
            }
            db::insert_recipes(&mut conn, &rows)?;
            println!("{}", stats);
            let craftable = db::list_craftable_items(&conn)?.len();
            println!("Craftable items in database: {}", craftable);
            println!("Database: {}", database.display());
        }

        Commands::Init { database } => {
            let conn = Connection::open(&database)?;
            db::init_schema(&conn)?;
            println!("Database initialized at: {}", database.display());
        }

        Commands::LoadSample { database } => {
            let mut conn = Connection::open(&database)?;
            db::init_schema(&conn)?;
            let count = load_sample_data(&mut conn)?;
            println!("Loaded {} sample recipes into {}", count, database.display());
        }
    }

    Ok(())
}

/// Answer one request against a snapshot
///
/// Errors carry a message meant for the user: bad syntax, unknown items
/// (with suggestions), or a table that failed to load.
fn answer(snapshot: &Snapshot, input: &str, show_intermediate: bool) -> Result<String> {
    let config = &snapshot.config;
    let catalog = &snapshot.catalog;

    let request = request::parse_request(input)
        .with_context(|| format!("Invalid request. Example: {}", request::USAGE_EXAMPLE))?;

    if catalog.is_empty() {
        return Err(CalcError::EmptyCatalog)
            .with_context(|| format!("Recipe table: {}", config.table.display()));
    }

    let suggestions = &config.suggestions;
    match calculator::validate_request(catalog, &request, suggestions.limit, suggestions.cutoff) {
        Err(CalcError::UnknownRootItems(unknown)) => {
            bail!("{}", SuggestionReport { unknown: &unknown });
        }
        other => other?,
    }

    let expansion = calculator::expand(catalog, &request)?;
    if expansion.leaf_totals.is_empty() {
        bail!("No materials found for the requested items");
    }
    tracing::debug!(
        materials = expansion.leaf_totals.len(),
        intermediates = expansion.intermediate_totals.len(),
        "request expanded"
    );

    let classification = calculator::classify(&expansion.leaf_totals, &config.special_items);
    let report = MaterialsReport {
        request: &request,
        classification: &classification,
        special_label: &config.special_label,
        intermediate: show_intermediate.then_some(&expansion.intermediate_totals),
    };
    Ok(report.to_string())
}

fn run_repl(store: &SnapshotStore, show_intermediate: bool) -> Result<()> {
    eprintln!("Enter requests as Item:Quantity,Item:Quantity (empty line or 'quit' to exit)");

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line == "quit" || line == "exit" {
            break;
        }

        // Fresh table per request so edits to the sheet show up immediately
        let snapshot = match store.reload() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "reload failed, keeping previous snapshot");
                store.current()
            }
        };

        match answer(&snapshot, line, show_intermediate) {
            Ok(text) => println!("{}", text),
            Err(e) => println!("Error: {:#}\n", e),
        }
    }

    Ok(())
}

fn sample_rows() -> Vec<RecipeRow> {
    vec![
        RecipeRow::new("Iron Sword", 1, vec![
            Ingredient::new("Iron Ingot", 3.0),
            Ingredient::new("Leather Strip", 1.0),
            Ingredient::new("Crystal", 5.0),
        ]),
        RecipeRow::new("Iron Shield", 1, vec![
            Ingredient::new("Iron Ingot", 4.0),
            Ingredient::new("Plank", 2.0),
            Ingredient::new("Crystal", 8.0),
        ]),
        RecipeRow::new("Iron Ingot", 2, vec![
            Ingredient::new("Iron Ore", 5.0),
            Ingredient::new("Coal", 1.0),
        ]),
        // Alternative ingot recipe from scrap
        RecipeRow::new("Iron Ingot", 1, vec![Ingredient::new("Scrap Metal", 2.0)]),
        RecipeRow::new("Leather Strip", 4, vec![Ingredient::new("Hide", 1.0)]),
        RecipeRow::new("Plank", 3, vec![Ingredient::new("Log", 1.0)]),
        RecipeRow::new("Healing Potion", 3, vec![
            Ingredient::new("Herb", 2.0),
            Ingredient::new("Water Flask", 1.0),
            Ingredient::new("Mana Crystal", 1.0),
        ]),
    ]
}

/// Replace the database contents with the sample table
fn load_sample_data(conn: &mut Connection) -> Result<usize> {
    db::clear_recipes(conn)?;
    Ok(db::insert_recipes(conn, &sample_rows())?)
}

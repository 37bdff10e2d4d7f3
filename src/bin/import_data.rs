#![warn(clippy::all)]

mod database;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::{info, trace_span, warn};
use tracing_subscriber::EnvFilter;

use crate::database::{
    connection::establish_pooled_connection,
    models::{ingredient::NewIngredient, tag::NewTag},
    pg_store::PgStore,
    store::Store,
};

/// Loads catalog reference data (ingredients and tags) into the database.
///
/// Rows that already exist are skipped, so the import can be run repeatedly.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding ingredients.json and, optionally, tags.json
    #[arg(short, long, default_value = "data")]
    path: PathBuf,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = dotenvy::dotenv() {
        info!("No .env file loaded: {e}");
    }
    let args = Args::parse();

    let pool = establish_pooled_connection(&args.database_url, 1)
        .context("Unable to connect to the database")?;
    let store = PgStore::new(pool);

    let ingredients: Vec<NewIngredient> = read_rows(&args.path.join("ingredients.json"))?;
    fill_table("ingredients", ingredients, |rows| store.insert_ingredients(rows))?;

    let tags_file = args.path.join("tags.json");
    if tags_file.exists() {
        let tags: Vec<NewTag> = read_rows(&tags_file)?;
        fill_table("tags", tags, |rows| store.insert_tags(rows))?;
    } else {
        warn!("{} not found, skipping tags", tags_file.display());
    }

    Ok(())
}

fn fill_table<T, F, E>(table: &str, rows: Vec<T>, insert: F) -> anyhow::Result<()>
where
    F: FnOnce(Vec<T>) -> Result<usize, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let span = trace_span!("filling table", table);
    let _guard = span.enter();

    let total = rows.len();
    let inserted = insert(rows).with_context(|| format!("Unable to fill {table}"))?;

    info!("{table}: {inserted} inserted, {} already present", total.saturating_sub(inserted));
    Ok(())
}

fn read_rows<T: DeserializeOwned>(file: &Path) -> anyhow::Result<Vec<T>> {
    let json = fs::read_to_string(file).with_context(|| format!("Can't read {}", file.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Can't parse {}", file.display()))
}

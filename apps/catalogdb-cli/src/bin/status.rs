//! Read-only inspection of the seeded collection: row counts, vector
//! coverage, active indices, and the last run's metadata.

use tracing_subscriber::EnvFilter;

use catalogdb_core::config::{expand_path, Config};
use catalogdb_store::provision::list_indices;
use catalogdb_store::table::{
    collection_exists, collection_stats, get_meta, open_db, META_TABLE,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let db_dir: String = config.get("store.db_dir")?;
    let db_uri = expand_path(&db_dir).to_string_lossy().to_string();
    let collection: String = config.get_or("store.collection", "catalog_items".to_string());

    let conn = open_db(&db_uri).await?;
    if !collection_exists(&conn, &collection).await? {
        println!("collection '{}' does not exist at {}", collection, db_uri);
        return Ok(());
    }

    let (total, with_vector) = collection_stats(&conn, &collection).await?;
    println!("{}: total={} with_vector={}", collection, total, with_vector);

    let indices = list_indices(&conn, &collection).await?;
    if indices.is_empty() {
        println!("indices: none (queries use exact scans)");
    } else {
        for (name, columns) in indices {
            println!("index: {} on {:?}", name, columns);
        }
    }

    for key in [
        "last_seed_records",
        "last_seed_batches",
        "active_index",
        "embedder_id",
    ] {
        if let Some(value) = get_meta(&conn, META_TABLE, key).await? {
            println!("{}: {}", key, value);
        }
    }
    Ok(())
}

//! Standalone batch job that reseeds the catalog collection: generate
//! records, embed their summaries, load them behind a vector index. Exits 0
//! on success (including degraded runs), 1 on startup failure, 2 on a load
//! failure.

use std::env;
use std::time::Duration;

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use catalogdb_core::config::{expand_path, Config};
use catalogdb_core::error::Error;
use catalogdb_core::types::VectorIndexDescriptor;
use catalogdb_embed::provider_for;
use catalogdb_gen::generator::DEFAULT_TARGET_RECORDS;
use catalogdb_gen::ollama::{DEFAULT_BASE_URL, DEFAULT_GEN_MODEL};
use catalogdb_gen::{OllamaTextModel, RecordGenerator};
use catalogdb_store::loader::DEFAULT_BATCH_SIZE;
use catalogdb_store::schema::{EMBEDDING_DIM, VECTOR_COLUMN};
use catalogdb_store::{LoadOptions, SeedOptions, SeedOutcome, Seeder};

#[tokio::main]
async fn main() {
    init_tracing();

    match run().await {
        Ok(outcome) => {
            println!("\n✅ Seeding completed");
            println!(
                "📊 Loaded {} records in {} batches",
                outcome.records, outcome.batches
            );
            if outcome.cancelled {
                println!("⚠️  Run was cancelled at a batch boundary");
            }
            if !outcome.index_ready {
                println!("⚠️  No vector index built; queries fall back to exact scans");
            }
            println!("\n💡 Inspect the collection with: cargo run --bin catalogdb-status");
        }
        Err(err) => {
            error!(error = %err, "seeding run failed");
            std::process::exit(err.exit_code());
        }
    }
}

struct Flags {
    batch_size: Option<usize>,
    records: Option<usize>,
    pause_ms: Option<u64>,
    fake_embeddings: bool,
}

fn parse_flags() -> Result<Flags, Error> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut flags = Flags {
        batch_size: None,
        records: None,
        pause_ms: None,
        fake_embeddings: false,
    };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--fake-embeddings" => flags.fake_embeddings = true,
            "--batch-size" => {
                flags.batch_size = Some(numeric_flag(&args, i)?);
                i += 1;
            }
            "--records" => {
                flags.records = Some(numeric_flag(&args, i)?);
                i += 1;
            }
            "--pause-ms" => {
                flags.pause_ms = Some(numeric_flag(&args, i)?);
                i += 1;
            }
            other => {
                return Err(Error::Startup(format!("unexpected argument '{}'", other)));
            }
        }
        i += 1;
    }
    Ok(flags)
}

fn numeric_flag<T: std::str::FromStr>(args: &[String], i: usize) -> Result<T, Error> {
    args.get(i + 1)
        .and_then(|v| v.parse::<T>().ok())
        .ok_or_else(|| Error::Startup(format!("{} requires a number", args[i])))
}

async fn run() -> Result<SeedOutcome, Error> {
    let flags = parse_flags()?;
    let config = Config::load().map_err(|e| Error::Startup(e.to_string()))?;

    // The store path is the one value with no default.
    let db_dir: String = config
        .get("store.db_dir")
        .map_err(|e| Error::Startup(e.to_string()))?;
    let db_uri = expand_path(&db_dir).to_string_lossy().to_string();
    let collection: String = config.get_or("store.collection", "catalog_items".to_string());
    let index_name: String = config.get_or("index.name", format!("{}_vec_idx", collection));

    let gen_url: String = config.get_or("generation.base_url", DEFAULT_BASE_URL.to_string());
    let gen_model: String = config.get_or("generation.model", DEFAULT_GEN_MODEL.to_string());
    let target_records = flags
        .records
        .unwrap_or_else(|| config.get_or("generation.records", DEFAULT_TARGET_RECORDS));

    let embed_url: String = config.get_or(
        "embedding.base_url",
        catalogdb_embed::DEFAULT_BASE_URL.to_string(),
    );
    let embed_model: String = config.get_or(
        "embedding.model",
        catalogdb_embed::DEFAULT_EMBED_MODEL.to_string(),
    );
    let use_fake = flags.fake_embeddings || config.get_or("embedding.use_fake", false);

    let batch_size = flags
        .batch_size
        .unwrap_or_else(|| config.get_or("load.batch_size", DEFAULT_BATCH_SIZE));
    let pause_ms = flags
        .pause_ms
        .unwrap_or_else(|| config.get_or("load.pause_ms", 1000u64));

    let model = OllamaTextModel::new(&gen_url, &gen_model)
        .map_err(|e| Error::Startup(e.to_string()))?;
    let embedder =
        provider_for(use_fake, &embed_url, &embed_model).map_err(|e| Error::Startup(e.to_string()))?;

    let seeder = Seeder::new(
        Box::new(RecordGenerator::new(Box::new(model), target_records)),
        embedder,
        SeedOptions {
            db_uri,
            collection: collection.clone(),
            index: VectorIndexDescriptor::cosine(&index_name, VECTOR_COLUMN, EMBEDDING_DIM),
            load: LoadOptions {
                batch_size,
                pause: Duration::from_millis(pause_ms),
            },
        },
    );

    let token = seeder.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping at the next batch boundary");
            token.cancel();
        }
    });

    seeder.run().await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

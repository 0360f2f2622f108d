use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use catalogdb_core::error::Error;
use catalogdb_core::traits::{EmbedProvider, RecordSource, TextModel};
use catalogdb_core::types::{
    CatalogRecord, ManufacturerAddress, Prices, VectorIndexDescriptor,
};
use catalogdb_embed::FakeEmbedder;
use catalogdb_gen::RecordGenerator;
use catalogdb_store::loader::LoadOptions;
use catalogdb_store::schema::{EMBEDDING_DIM, VECTOR_COLUMN};
use catalogdb_store::table::{get_meta, open_db, META_TABLE};
use catalogdb_store::{SeedOptions, Seeder};

fn make_records(n: usize) -> Vec<CatalogRecord> {
    (0..n)
        .map(|i| CatalogRecord {
            id: format!("item-{:03}", i),
            name: format!("Garden Dibber {}", i),
            description: "A turned beech dibber with depth marks.".to_string(),
            brand: "Bellwether".to_string(),
            manufacturer_address: ManufacturerAddress {
                street: "2 Turnery Close".to_string(),
                city: "Ludlow".to_string(),
                state: "Shropshire".to_string(),
                postal_code: "SY8 1AA".to_string(),
                country: "United Kingdom".to_string(),
            },
            prices: Prices {
                full_price: 12.0,
                sale_price: 9.0,
            },
            categories: vec!["garden".to_string(), "hand tools".to_string()],
            reviews: Vec::new(),
            notes: "Oiled finish.".to_string(),
        })
        .collect()
}

struct StaticSource {
    records: Vec<CatalogRecord>,
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn generate(&self) -> anyhow::Result<Vec<CatalogRecord>> {
        Ok(self.records.clone())
    }
}

struct StaticModel {
    reply: String,
}

#[async_trait]
impl TextModel for StaticModel {
    async fn invoke(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.reply.clone())
    }
}

struct FlakyEmbedder {
    inner: FakeEmbedder,
    calls: AtomicUsize,
    fail_at: usize,
}

#[async_trait]
impl EmbedProvider for FlakyEmbedder {
    fn embedder_id(&self) -> &str {
        "fake:flaky"
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.fail_at {
            return Err(anyhow!("provider quota exhausted"));
        }
        self.inner.embed_batch(texts).await
    }
}

fn seed_options(db_uri: &str) -> SeedOptions {
    SeedOptions {
        db_uri: db_uri.to_string(),
        collection: "catalog_items".to_string(),
        index: VectorIndexDescriptor::cosine("catalog_items_vec_idx", VECTOR_COLUMN, EMBEDDING_DIM),
        load: LoadOptions {
            batch_size: 3,
            pause: Duration::ZERO,
        },
    }
}

#[tokio::test]
async fn full_run_loads_all_records_in_order_batches() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let uri = tmp.path().to_string_lossy().to_string();

    let seeder = Seeder::new(
        Box::new(StaticSource {
            records: make_records(10),
        }),
        Box::new(FakeEmbedder::default()),
        seed_options(&uri),
    );
    let outcome = seeder.run().await?;

    assert_eq!(outcome.records, 10);
    assert_eq!(outcome.batches, 4);
    assert!(!outcome.cancelled);

    let conn = open_db(&uri).await?;
    let table = conn.open_table("catalog_items").execute().await?;
    assert_eq!(table.count_rows(None).await?, 10);
    assert_eq!(
        get_meta(&conn, META_TABLE, "last_seed_records").await?,
        Some("10".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn rerun_replaces_rather_than_appends() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let uri = tmp.path().to_string_lossy().to_string();

    for _ in 0..2 {
        let seeder = Seeder::new(
            Box::new(StaticSource {
                records: make_records(10),
            }),
            Box::new(FakeEmbedder::default()),
            seed_options(&uri),
        );
        seeder.run().await?;
    }

    let conn = open_db(&uri).await?;
    let table = conn.open_table("catalog_items").execute().await?;
    assert_eq!(table.count_rows(None).await?, 10);
    Ok(())
}

#[tokio::test]
async fn unparsable_generation_seeds_fallback_set() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let uri = tmp.path().to_string_lossy().to_string();

    // The generator degrades to its built-in records (2 of them), which fit
    // in a single batch of 3.
    let generator = RecordGenerator::new(
        Box::new(StaticModel {
            reply: "I cannot help with that.".to_string(),
        }),
        10,
    );
    let seeder = Seeder::new(
        Box::new(generator),
        Box::new(FakeEmbedder::default()),
        seed_options(&uri),
    );
    let outcome = seeder.run().await?;

    assert_eq!(outcome.records, 2);
    assert_eq!(outcome.batches, 1);

    let conn = open_db(&uri).await?;
    let table = conn.open_table("catalog_items").execute().await?;
    assert_eq!(table.count_rows(None).await?, 2);
    Ok(())
}

#[tokio::test]
async fn embed_failure_midway_leaves_prior_batches_only() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let uri = tmp.path().to_string_lossy().to_string();

    let seeder = Seeder::new(
        Box::new(StaticSource {
            records: make_records(10),
        }),
        Box::new(FlakyEmbedder {
            inner: FakeEmbedder::default(),
            calls: AtomicUsize::new(0),
            fail_at: 2,
        }),
        seed_options(&uri),
    );
    let err = seeder.run().await.expect_err("batch 2 must fail");
    match err {
        Error::Load { batch, .. } => assert_eq!(batch, 2),
        other => panic!("unexpected error: {other}"),
    }

    let conn = open_db(&uri).await?;
    let table = conn.open_table("catalog_items").execute().await?;
    assert_eq!(table.count_rows(None).await?, 3);
    Ok(())
}

#[tokio::test]
async fn cancelled_run_reports_cancellation() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let uri = tmp.path().to_string_lossy().to_string();

    let seeder = Seeder::new(
        Box::new(StaticSource {
            records: make_records(10),
        }),
        Box::new(FakeEmbedder::default()),
        seed_options(&uri),
    );
    seeder.cancel_token().cancel();
    let outcome = seeder.run().await?;

    assert!(outcome.cancelled);
    assert_eq!(outcome.records, 0);

    let conn = open_db(&uri).await?;
    let table = conn.open_table("catalog_items").execute().await?;
    assert_eq!(table.count_rows(None).await?, 0);
    Ok(())
}

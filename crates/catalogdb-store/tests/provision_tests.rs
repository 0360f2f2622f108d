use std::time::Duration;

use catalogdb_core::cancel::CancelToken;
use catalogdb_core::types::{CatalogRecord, ManufacturerAddress, Prices, VectorIndexDescriptor};
use catalogdb_embed::FakeEmbedder;
use catalogdb_store::loader::{load, LoadOptions};
use catalogdb_store::provision::ensure_vector_index;
use catalogdb_store::schema::{EMBEDDING_DIM, VECTOR_COLUMN};
use catalogdb_store::table::{clear_collection, ensure_collection, open_db};

fn make_records(n: usize) -> Vec<CatalogRecord> {
    (0..n)
        .map(|i| CatalogRecord {
            id: format!("item-{:04}", i),
            name: format!("Orchard Ladder {}", i),
            description: format!("A tripod orchard ladder, size variant {}.", i),
            brand: "Tallis & Sons".to_string(),
            manufacturer_address: ManufacturerAddress {
                street: "3 Coppice Yard".to_string(),
                city: "Hereford".to_string(),
                state: "Herefordshire".to_string(),
                postal_code: "HR1 2AB".to_string(),
                country: "United Kingdom".to_string(),
            },
            prices: Prices {
                full_price: 100.0 + i as f64,
                sale_price: 90.0 + i as f64,
            },
            categories: vec!["garden".to_string(), "ladders".to_string()],
            reviews: Vec::new(),
            notes: format!("Rung count {}.", 6 + i % 4),
        })
        .collect()
}

#[tokio::test]
async fn ensure_collection_is_idempotent() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let conn = open_db(&tmp.path().to_string_lossy()).await?;

    ensure_collection(&conn, "items").await?;
    ensure_collection(&conn, "items").await?;

    let names = conn.table_names().execute().await?;
    assert_eq!(names.iter().filter(|n| n.as_str() == "items").count(), 1);
    let table = conn.open_table("items").execute().await?;
    assert_eq!(table.count_rows(None).await?, 0);
    Ok(())
}

#[tokio::test]
async fn clear_collection_removes_every_document() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let conn = open_db(&tmp.path().to_string_lossy()).await?;
    ensure_collection(&conn, "items").await?;
    let table = conn.open_table("items").execute().await?;

    let embedder = FakeEmbedder::default();
    let opts = LoadOptions {
        batch_size: 4,
        pause: Duration::ZERO,
    };
    load(&table, &embedder, &make_records(7), &opts, &CancelToken::new()).await?;
    assert_eq!(table.count_rows(None).await?, 7);

    clear_collection(&conn, "items").await?;
    assert_eq!(table.count_rows(None).await?, 0);
    Ok(())
}

#[tokio::test]
async fn index_on_small_collection_is_skipped_not_fatal() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let conn = open_db(&tmp.path().to_string_lossy()).await?;
    ensure_collection(&conn, "items").await?;
    let table = conn.open_table("items").execute().await?;

    let embedder = FakeEmbedder::default();
    let opts = LoadOptions {
        batch_size: 5,
        pause: Duration::ZERO,
    };
    load(&table, &embedder, &make_records(10), &opts, &CancelToken::new()).await?;

    let desc = VectorIndexDescriptor::cosine("items_vec_idx", VECTOR_COLUMN, EMBEDDING_DIM);
    let ready = ensure_vector_index(&conn, "items", &desc).await;
    assert!(!ready);
    assert!(table.list_indices().await?.is_empty());
    Ok(())
}

/// Slow test exercising IVF_PQ training and the destructive-reindex property.
/// Ignored by default to keep CI fast; run explicitly when needed:
/// `cargo test -p catalogdb-store --test provision_tests -- --ignored`
#[ignore]
#[tokio::test]
async fn reindex_leaves_exactly_one_index_matching_latest_descriptor() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let conn = open_db(&tmp.path().to_string_lossy()).await?;
    ensure_collection(&conn, "items").await?;
    let table = conn.open_table("items").execute().await?;

    let embedder = FakeEmbedder::default();
    let opts = LoadOptions {
        batch_size: 100,
        pause: Duration::ZERO,
    };
    load(&table, &embedder, &make_records(300), &opts, &CancelToken::new()).await?;

    let first = VectorIndexDescriptor::cosine("items_vec_v1", VECTOR_COLUMN, EMBEDDING_DIM);
    assert!(ensure_vector_index(&conn, "items", &first).await);
    let indices = table.list_indices().await?;
    assert_eq!(indices.len(), 1);
    assert_eq!(indices[0].name, "items_vec_v1");

    // Provisioning against a new descriptor drops the stale index and leaves
    // exactly one, matching the latest declaration.
    let second = VectorIndexDescriptor::cosine("items_vec_v2", VECTOR_COLUMN, EMBEDDING_DIM);
    assert!(ensure_vector_index(&conn, "items", &second).await);
    let indices = table.list_indices().await?;
    assert_eq!(indices.len(), 1);
    assert_eq!(indices[0].name, "items_vec_v2");

    // Re-declaring the active descriptor is a no-op.
    assert!(ensure_vector_index(&conn, "items", &second).await);
    assert_eq!(table.list_indices().await?.len(), 1);
    Ok(())
}

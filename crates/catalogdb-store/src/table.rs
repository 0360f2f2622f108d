//! LanceDB connection and collection housekeeping.
//!
//! Provides the database open function, the ensure/clear collection
//! operations, and a small key/value metadata table that records what the
//! last seeding run wrote.

use anyhow::Result;
use lancedb::{connect, Connection};

use arrow_array::{RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use chrono::Utc;
use lancedb::query::{ExecutableQuery, QueryBase};
use std::sync::Arc;

use crate::schema::build_items_schema;

pub const META_TABLE: &str = "seed_meta";

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<()> {
    let names = conn.table_names().execute().await?;
    if names.contains(&name.to_string()) {
        return Ok(());
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

/// Create the destination collection if absent; no-op otherwise.
pub async fn ensure_collection(conn: &Connection, name: &str) -> Result<()> {
    ensure_table(conn, name, build_items_schema()).await
}

pub async fn collection_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn
        .table_names()
        .execute()
        .await?
        .contains(&name.to_string()))
}

/// Row count plus how many rows carry a non-null embedding vector.
pub async fn collection_stats(conn: &Connection, name: &str) -> Result<(usize, usize)> {
    use arrow_array::Array;
    let table = conn.open_table(name).execute().await?;
    let mut total = 0usize;
    let mut with_vector = 0usize;
    let mut stream = table.query().execute().await?;
    while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await? {
        total += batch.num_rows();
        if let Some(col) = batch.column_by_name(crate::schema::VECTOR_COLUMN) {
            if let Some(fsl) = col
                .as_any()
                .downcast_ref::<arrow_array::FixedSizeListArray>()
            {
                for i in 0..batch.num_rows() {
                    if fsl.is_valid(i) {
                        with_vector += 1;
                    }
                }
            }
        }
    }
    Ok((total, with_vector))
}

/// Delete every document in the collection. Full-reseed semantics: each run
/// replaces the whole dataset, there is no incremental upsert.
pub async fn clear_collection(conn: &Connection, name: &str) -> Result<()> {
    let table = conn.open_table(name).execute().await?;
    let _ = table.delete("true").await?;
    Ok(())
}

fn build_meta_schema() -> Arc<arrow_schema::Schema> {
    Arc::new(arrow_schema::Schema::new(vec![
        arrow_schema::Field::new("key", arrow_schema::DataType::Utf8, false),
        arrow_schema::Field::new("value", arrow_schema::DataType::Utf8, false),
        arrow_schema::Field::new(
            "updated_at",
            arrow_schema::DataType::Timestamp(arrow_schema::TimeUnit::Millisecond, None),
            false,
        ),
    ]))
}

pub async fn ensure_meta_table(conn: &Connection, name: &str) -> Result<()> {
    ensure_table(conn, name, build_meta_schema()).await
}

pub async fn set_meta(conn: &Connection, table: &str, key: &str, value: &str) -> Result<()> {
    ensure_meta_table(conn, table).await?;
    let t = conn.open_table(table).execute().await?;
    let rb = RecordBatch::try_new(
        build_meta_schema(),
        vec![
            Arc::new(StringArray::from(vec![key.to_string()])),
            Arc::new(StringArray::from(vec![value.to_string()])),
            Arc::new(TimestampMillisecondArray::from(vec![Utc::now()
                .timestamp_millis()])),
        ],
    )?;
    let reader = Box::new(RecordBatchIterator::new(
        vec![Ok(rb)].into_iter(),
        build_meta_schema(),
    ));
    // Upsert behavior via merge_insert: key is unique
    let mut mi = t.merge_insert(&["key"]);
    mi.when_matched_update_all(None).when_not_matched_insert_all();
    let _ = mi.execute(reader).await?;
    Ok(())
}

pub async fn get_meta(conn: &Connection, table: &str, key: &str) -> Result<Option<String>> {
    let names = conn.table_names().execute().await?;
    if !names.contains(&table.to_string()) {
        return Ok(None);
    }
    let t = conn.open_table(table).execute().await?;
    let mut stream = t
        .query()
        .only_if(format!("key = '{}'", key.replace('\'', "''")))
        .execute()
        .await?;
    while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await? {
        if batch.num_rows() == 0 {
            continue;
        }
        let val = batch
            .column_by_name("value")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| anyhow::anyhow!("seed_meta.value column missing"))?;
        return Ok(Some(val.value(0).to_string()));
    }
    Ok(None)
}

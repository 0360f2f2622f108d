//! Vector-index provisioning.
//!
//! The index is declared as a descriptor and reconciled against the store's
//! observed state: a matching index is kept, stale vector indices on the same
//! column are dropped (the diff is logged), and the declared index is built
//! from the rows present. Every failure in here is absorbed: a seeding run
//! continues without semantic search rather than aborting.

use anyhow::Result;
use arrow_array::cast::AsArray;
use arrow_array::{Array, FixedSizeListArray};
use futures::TryStreamExt;
use lancedb::index::{vector::IvfPqIndexBuilder, Index};
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{Connection, DistanceType};
use tracing::{info, warn};

use catalogdb_core::types::{SimilarityMetric, VectorIndexDescriptor};

/// IVF_PQ training wants a reasonable corpus; below this the store answers
/// nearest-neighbor queries with an exact scan anyway.
pub const MIN_INDEX_ROWS: usize = 256;

pub struct IvfPqParams {
    pub nlist: usize,
    pub m: usize,
    pub nbits: usize,
}

pub fn compute_ivfpq_params(total_rows: usize, dim: usize) -> IvfPqParams {
    let sqrt_n = (total_rows as f64).sqrt() as usize;
    let mut nlist = std::cmp::max(2048, 2 * sqrt_n);
    nlist = std::cmp::min(nlist, 65536);
    // Clamp nlist to be less than total_rows for tiny datasets
    if total_rows > 1 {
        nlist = std::cmp::min(nlist, total_rows - 1);
    } else {
        nlist = 1;
    }
    let m = if dim >= 1024 { 32 } else { 16 };
    IvfPqParams { nlist, m, nbits: 8 }
}

fn distance_type(metric: SimilarityMetric) -> DistanceType {
    match metric {
        SimilarityMetric::Cosine => DistanceType::Cosine,
        SimilarityMetric::L2 => DistanceType::L2,
    }
}

/// Reconcile the collection's vector index with `desc`. Returns whether an
/// index matching the descriptor is active afterwards; never escalates.
pub async fn ensure_vector_index(
    conn: &Connection,
    table_name: &str,
    desc: &VectorIndexDescriptor,
) -> bool {
    match try_ensure_vector_index(conn, table_name, desc).await {
        Ok(ready) => ready,
        Err(e) => {
            warn!(
                error = %e,
                index = %desc.name,
                "vector index provisioning failed, continuing without semantic search"
            );
            false
        }
    }
}

async fn try_ensure_vector_index(
    conn: &Connection,
    table_name: &str,
    desc: &VectorIndexDescriptor,
) -> Result<bool> {
    let table = conn.open_table(table_name).execute().await?;
    let existing = table.list_indices().await?;

    let on_column: Vec<_> = existing
        .iter()
        .filter(|ix| ix.columns == vec![desc.column.clone()])
        .collect();
    if on_column.iter().any(|ix| ix.name == desc.name) {
        for stale in on_column.iter().filter(|ix| ix.name != desc.name) {
            info!(index = %stale.name, "dropping stale vector index");
            table.drop_index(&stale.name).await?;
        }
        info!(index = %desc.name, "vector index up to date");
        return Ok(true);
    }

    for stale in &on_column {
        info!(index = %stale.name, target = %desc.name, "dropping stale vector index");
        table.drop_index(&stale.name).await?;
    }

    let rows = table.count_rows(None).await?;
    if rows < MIN_INDEX_ROWS {
        warn!(
            rows,
            min = MIN_INDEX_ROWS,
            "collection too small to train a vector index; queries will use exact scans"
        );
        return Ok(false);
    }

    let params = compute_ivfpq_params(rows, desc.dim as usize);
    table
        .create_index(
            &[desc.column.as_str()],
            Index::IvfPq(
                IvfPqIndexBuilder::default()
                    .distance_type(distance_type(desc.metric))
                    .num_partitions(params.nlist as u32)
                    .num_sub_vectors(params.m as u32),
            ),
        )
        .name(desc.name.clone())
        .execute()
        .await?;
    info!(index = %desc.name, rows, "vector index created");
    Ok(true)
}

/// Index names with the columns they cover, for inspection tools.
pub async fn list_indices(conn: &Connection, table_name: &str) -> Result<Vec<(String, Vec<String>)>> {
    let table = conn.open_table(table_name).execute().await?;
    Ok(table
        .list_indices()
        .await?
        .into_iter()
        .map(|ix| (ix.name, ix.columns))
        .collect())
}

/// Best-effort smoke test: sample up to `sample` stored vectors and confirm
/// top-k search returns non-empty results for at least one of them.
pub async fn verify_search(
    conn: &Connection,
    table_name: &str,
    k: usize,
    sample: usize,
) -> Result<bool> {
    let table = conn.open_table(table_name).execute().await?;
    let mut stream = table
        .query()
        .select(Select::columns(&[crate::schema::VECTOR_COLUMN]))
        .limit(sample)
        .execute()
        .await?;
    let mut ok = 0usize;
    while let Some(batch) = stream.try_next().await? {
        if let Some(arr) = batch.column_by_name(crate::schema::VECTOR_COLUMN) {
            if let Some(fsl) = arr.as_any().downcast_ref::<FixedSizeListArray>() {
                for i in 0..batch.num_rows() {
                    if !fsl.is_valid(i) {
                        continue;
                    }
                    let inner = fsl.value(i);
                    let vals = inner.as_primitive::<arrow_array::types::Float32Type>();
                    let q = vals.values().to_vec();
                    let mut s = table
                        .vector_search(q)?
                        .distance_type(DistanceType::Cosine)
                        .limit(k)
                        .execute()
                        .await?;
                    if let Some(rb) = s.try_next().await? {
                        if rb.num_rows() > 0 {
                            ok += 1;
                        }
                    }
                }
            }
        }
    }
    Ok(ok > 0)
}

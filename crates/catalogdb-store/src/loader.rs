//! Batched summarize → embed → write pipeline.
//!
//! Batches run strictly one after another; a batch's store write completes
//! before the next batch starts. Inside a batch the per-record summaries are
//! independent pure computations and are joined before the embedding call.
//! The inter-batch pause paces calls against the embedding provider and the
//! store; the batch boundary is also where cancellation is honored.

use arrow_array::RecordBatchIterator;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::table::Table;
use std::time::Duration;
use tracing::{info, warn};

use catalogdb_core::cancel::CancelToken;
use catalogdb_core::error::{Error, Result};
use catalogdb_core::summary::summarize;
use catalogdb_core::traits::EmbedProvider;
use catalogdb_core::types::{CatalogRecord, IndexableRecord};

use crate::schema::{build_items_schema, items_to_record_batch};

pub const DEFAULT_BATCH_SIZE: usize = 3;

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub batch_size: usize,
    /// Pause between consecutive batches; zero disables. Not applied after
    /// the final batch.
    pub pause: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            pause: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    pub records: usize,
    pub batches: usize,
    pub total_batches: usize,
    pub cancelled: bool,
}

/// Load `records` into `table` in fixed-size batches, one write per batch.
///
/// A failure embedding or writing any batch aborts the remaining load with
/// `Error::Load`; documents from earlier batches remain. The store does not
/// guarantee atomic multi-document writes, so a crash mid-batch may leave a
/// partial batch behind. Recovery is a full reseed, not row-level repair.
pub async fn load(
    table: &Table,
    provider: &dyn EmbedProvider,
    records: &[CatalogRecord],
    opts: &LoadOptions,
    cancel: &CancelToken,
) -> Result<LoadReport> {
    let total_batches = records.len().div_ceil(opts.batch_size.max(1));
    let mut report = LoadReport {
        total_batches,
        ..LoadReport::default()
    };
    if records.is_empty() {
        info!("no records to load");
        return Ok(report);
    }

    let pb = ProgressBar::new(total_batches as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg}")
            .expect("valid progress template")
            .progress_chars("#>-"),
    );

    for (i, batch) in records.chunks(opts.batch_size.max(1)).enumerate() {
        let batch_no = i + 1;
        if cancel.is_cancelled() {
            warn!(batch = batch_no, total = total_batches, "load cancelled at batch boundary");
            report.cancelled = true;
            break;
        }

        // Summaries are pure and independent; fan out within the batch only.
        let summaries: Vec<String> =
            join_all(batch.iter().map(|r| async move { summarize(r) })).await;

        let vectors = provider
            .embed_batch(&summaries)
            .await
            .map_err(|e| load_err(batch_no, total_batches, e.to_string()))?;
        if vectors.len() != summaries.len() {
            return Err(load_err(
                batch_no,
                total_batches,
                format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    summaries.len()
                ),
            ));
        }
        let dim = provider.dim();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(load_err(
                batch_no,
                total_batches,
                format!("dim mismatch: got {} expected {}", bad.len(), dim),
            ));
        }

        let items: Vec<IndexableRecord> = batch
            .iter()
            .zip(summaries.into_iter().zip(vectors))
            .map(|(record, (summary_text, embedding_vector))| IndexableRecord {
                summary_text,
                embedding_vector,
                metadata: record.clone(),
            })
            .collect();

        let record_batch = items_to_record_batch(&items)
            .map_err(|e| load_err(batch_no, total_batches, e.to_string()))?;
        let reader = Box::new(RecordBatchIterator::new(
            vec![Ok(record_batch)].into_iter(),
            build_items_schema(),
        ));
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| load_err(batch_no, total_batches, e.to_string()))?;

        report.records += batch.len();
        report.batches += 1;
        pb.set_position(batch_no as u64);
        info!(batch = batch_no, total = total_batches, records = batch.len(), "batch written");

        if batch_no < total_batches && !opts.pause.is_zero() {
            tokio::time::sleep(opts.pause).await;
        }
    }

    pb.finish_with_message("load complete");
    Ok(report)
}

fn load_err(batch: usize, total: usize, reason: String) -> Error {
    Error::Load {
        batch,
        total,
        reason,
    }
}

//! Top-level seeding run.
//!
//! Linear phases: connect (with liveness probe) → provision collection and
//! index → clear → generate → batched load → post-load index reconcile,
//! search smoke test, and run metadata. The connection is released on every
//! exit path. Only startup and load failures stop the run; everything else
//! degrades with a warning.

use lancedb::Connection;
use tracing::{debug, info, warn};

use catalogdb_core::cancel::CancelToken;
use catalogdb_core::error::{Error, Result};
use catalogdb_core::traits::{EmbedProvider, RecordSource};
use catalogdb_core::types::VectorIndexDescriptor;

use crate::loader::{load, LoadOptions};
use crate::provision::{ensure_vector_index, verify_search};
use crate::table::{clear_collection, ensure_collection, open_db, set_meta, META_TABLE};

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub db_uri: String,
    pub collection: String,
    pub index: VectorIndexDescriptor,
    pub load: LoadOptions,
}

#[derive(Debug, Clone)]
pub struct SeedOutcome {
    pub records: usize,
    pub batches: usize,
    pub index_ready: bool,
    pub cancelled: bool,
}

pub struct Seeder {
    source: Box<dyn RecordSource>,
    embedder: Box<dyn EmbedProvider>,
    opts: SeedOptions,
    cancel: CancelToken,
}

impl Seeder {
    pub fn new(
        source: Box<dyn RecordSource>,
        embedder: Box<dyn EmbedProvider>,
        opts: SeedOptions,
    ) -> Self {
        Self {
            source,
            embedder,
            opts,
            cancel: CancelToken::new(),
        }
    }

    /// Handle for cooperative cancellation, honored at batch boundaries.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub async fn run(&self) -> Result<SeedOutcome> {
        let conn = open_db(&self.opts.db_uri)
            .await
            .map_err(|e| Error::Startup(format!("cannot open store at '{}': {}", self.opts.db_uri, e)))?;
        // Liveness probe before touching anything.
        conn.table_names()
            .execute()
            .await
            .map_err(|e| Error::Startup(format!("store unreachable: {}", e)))?;
        info!(uri = %self.opts.db_uri, "store connected");

        let outcome = self.run_connected(&conn).await;

        // Released on success and failure alike.
        drop(conn);
        debug!("store connection released");
        outcome
    }

    async fn run_connected(&self, conn: &Connection) -> Result<SeedOutcome> {
        let collection = &self.opts.collection;

        ensure_collection(conn, collection)
            .await
            .map_err(|e| Error::Startup(format!("cannot provision collection '{}': {}", collection, e)))?;
        let pre_ready = ensure_vector_index(conn, collection, &self.opts.index).await;
        info!(collection = %collection, index_ready = pre_ready, "provisioned");

        clear_collection(conn, collection)
            .await
            .map_err(|e| Error::Startup(format!("cannot clear collection '{}': {}", collection, e)))?;
        info!(collection = %collection, "collection cleared");

        let records = self
            .source
            .generate()
            .await
            .map_err(|e| Error::Startup(format!("record generation failed: {}", e)))?;
        info!(count = records.len(), "records ready for load");

        let table = conn
            .open_table(collection)
            .execute()
            .await
            .map_err(|e| Error::Startup(format!("cannot open collection '{}': {}", collection, e)))?;
        let report = load(
            &table,
            self.embedder.as_ref(),
            &records,
            &self.opts.load,
            &self.cancel,
        )
        .await?;

        // The store trains vector indexes from stored rows; now that the rows
        // exist, reconcile once more so the index covers the fresh data.
        let index_ready = ensure_vector_index(conn, collection, &self.opts.index).await;

        if report.records > 0 {
            match verify_search(conn, collection, 3, 3).await {
                Ok(true) => info!("search smoke test passed"),
                Ok(false) => warn!("search smoke test returned no hits"),
                Err(e) => warn!(error = %e, "search smoke test failed"),
            }
        }

        self.record_meta(conn, &report, index_ready).await;

        Ok(SeedOutcome {
            records: report.records,
            batches: report.batches,
            index_ready,
            cancelled: report.cancelled,
        })
    }

    async fn record_meta(&self, conn: &Connection, report: &crate::loader::LoadReport, index_ready: bool) {
        let entries = [
            ("last_seed_records", report.records.to_string()),
            ("last_seed_batches", report.batches.to_string()),
            (
                "active_index",
                if index_ready {
                    self.opts.index.name.clone()
                } else {
                    String::new()
                },
            ),
            ("embedder_id", self.embedder.embedder_id().to_string()),
        ];
        for (key, value) in entries {
            if let Err(e) = set_meta(conn, META_TABLE, key, &value).await {
                warn!(error = %e, key, "could not record seed metadata");
            }
        }
    }
}

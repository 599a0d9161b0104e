//! LanceDB storage for embedded policy clauses.
//!
//! One table, `policy_clauses`, holding the chunked policy text with its
//! embeddings. Ingest rebuilds the table wholesale (drop and recreate);
//! queries run a vector similarity search over the embedding column. Every
//! read goes through an explicit handle so a database that was never
//! ingested surfaces as [`StoreError::IndexMissing`] instead of an opaque
//! backend error.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, FixedSizeListBuilder, Float32Array, Float32Builder, RecordBatchIterator, StringArray,
    UInt32Array,
};
use arrow::record_batch::RecordBatch;
use claimwise_core::schema::{CLAUSE_TABLE, policy_clause_schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use tracing::info;

use crate::StoreError;

/// LanceDB store for the clause index.
pub struct ClauseStore {
    db: lancedb::Connection,
}

/// A clause row returned by vector search, nearest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseHit {
    pub clause_id: String,
    pub source: String,
    pub seq: u32,
    pub text: String,
    pub distance: f32,
}

impl ClauseStore {
    /// Connect to a LanceDB database at the given path.
    ///
    /// Creates the database directory if it doesn't exist; an empty
    /// database is valid and simply has no index yet.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let uri = path
            .to_str()
            .ok_or_else(|| StoreError::Other("non-UTF8 database path".into()))?;
        let db = lancedb::connect(uri).execute().await?;
        Ok(Self { db })
    }

    /// Whether the clause table exists.
    pub async fn is_indexed(&self) -> Result<bool, StoreError> {
        let names = self.db.table_names().execute().await?;
        Ok(names.iter().any(|n| n == CLAUSE_TABLE))
    }

    /// Replace the clause table with freshly embedded batches.
    ///
    /// Drop-and-recreate: ingest is idempotent and never appends.
    pub async fn rebuild(&self, batches: Vec<RecordBatch>) -> Result<(), StoreError> {
        if batches.is_empty() {
            return Err(StoreError::EmptyRebuild);
        }
        let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        let schema = batches[0].schema();
        let reader = RecordBatchIterator::new(batches.into_iter().map(Ok), schema);

        if self.is_indexed().await? {
            self.db.drop_table(CLAUSE_TABLE, &[]).await?;
        }
        self.db
            .create_table(CLAUSE_TABLE, Box::new(reader))
            .execute()
            .await?;

        info!(table = CLAUSE_TABLE, rows = total_rows, "rebuilt clause index");
        Ok(())
    }

    /// Count rows in the clause table.
    pub async fn clause_count(&self) -> Result<usize, StoreError> {
        let table = self.table().await?;
        let count = table.count_rows(None).await?;
        Ok(count)
    }

    /// Vector similarity search over the embedding column.
    ///
    /// Returns the nearest `limit` clauses, ordered by distance.
    pub async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ClauseHit>, StoreError> {
        let table = self.table().await?;
        let batches: Vec<RecordBatch> = table
            .vector_search(query_vector)?
            .limit(limit)
            .execute()
            .await?
            .try_collect()
            .await?;
        decode_hits(&batches)
    }

    /// The clause table handle, or [`StoreError::IndexMissing`] when the
    /// database has never been ingested.
    async fn table(&self) -> Result<lancedb::Table, StoreError> {
        if !self.is_indexed().await? {
            return Err(StoreError::IndexMissing);
        }
        let table = self.db.open_table(CLAUSE_TABLE).execute().await?;
        Ok(table)
    }
}

/// Assemble one RecordBatch of embedded clauses for [`ClauseStore::rebuild`].
///
/// `chunks` and `embeddings` are parallel; `seq` preserves document order
/// and `clause_id` is derived from the source name and sequence number.
pub fn clause_batch(
    source: &str,
    chunks: &[String],
    embeddings: &[Vec<f32>],
    dim: i32,
) -> Result<RecordBatch, StoreError> {
    if chunks.len() != embeddings.len() {
        return Err(StoreError::Other(format!(
            "{} chunks but {} embeddings",
            chunks.len(),
            embeddings.len()
        )));
    }

    let n = chunks.len();
    let ids: Vec<String> = (0..n).map(|i| format!("{source}:{i}")).collect();
    let id_array = StringArray::from(ids.iter().map(String::as_str).collect::<Vec<_>>());
    let source_array = StringArray::from(vec![source; n]);
    let seq_array = UInt32Array::from((0..n as u32).collect::<Vec<_>>());
    let text_array = StringArray::from(chunks.iter().map(String::as_str).collect::<Vec<_>>());

    let mut emb_builder = FixedSizeListBuilder::new(Float32Builder::new(), dim);
    for emb in embeddings {
        if emb.len() != dim as usize {
            return Err(StoreError::Other(format!(
                "embedding has {} dimensions, expected {dim}",
                emb.len()
            )));
        }
        for &v in emb {
            emb_builder.values().append_value(v);
        }
        emb_builder.append(true);
    }

    let batch = RecordBatch::try_new(
        Arc::new(policy_clause_schema(dim)),
        vec![
            Arc::new(id_array),
            Arc::new(source_array),
            Arc::new(seq_array),
            Arc::new(text_array),
            Arc::new(emb_builder.finish()),
        ],
    )?;
    Ok(batch)
}

fn decode_hits(batches: &[RecordBatch]) -> Result<Vec<ClauseHit>, StoreError> {
    let mut hits = Vec::new();
    for batch in batches {
        let ids = string_column(batch, "clause_id")?;
        let sources = string_column(batch, "source")?;
        let texts = string_column(batch, "text")?;
        let seqs = batch
            .column_by_name("seq")
            .and_then(|c| c.as_any().downcast_ref::<UInt32Array>())
            .ok_or_else(|| StoreError::Other("missing or mistyped column \"seq\"".into()))?;
        let distances = batch
            .column_by_name("_distance")
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
            .ok_or_else(|| StoreError::Other("missing or mistyped column \"_distance\"".into()))?;
        for i in 0..batch.num_rows() {
            hits.push(ClauseHit {
                clause_id: ids.value(i).to_string(),
                source: sources.value(i).to_string(),
                seq: seqs.value(i),
                text: texts.value(i).to_string(),
                distance: distances.value(i),
            });
        }
    }
    Ok(hits)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| StoreError::Other(format!("missing or mistyped column {name:?}")))
}

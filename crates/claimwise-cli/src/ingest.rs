//! Ingest pipeline: read policy text, chunk, embed, rebuild the clause index.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use claimwise_ai::{Chunker, Embedder};
use claimwise_store::{ClauseStore, clause_batch};

pub async fn run(document: &Path, db: &Path, model_dir: &Path) -> anyhow::Result<()> {
    let start = Instant::now();

    let text = std::fs::read_to_string(document)
        .with_context(|| format!("reading {}", document.display()))?;
    let source = document
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let chunks = Chunker::default().split(&text);
    anyhow::ensure!(!chunks.is_empty(), "document produced no text chunks");
    eprintln!("Split {} bytes into {} chunks", text.len(), chunks.len());

    let mut embedder = Embedder::load(model_dir).context("loading embedding model")?;
    let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
    let embeddings = embedder
        .embed_batch(&refs)
        .context("generating embeddings")?;
    eprintln!("Embedded {} chunks ({}-dim)", embeddings.len(), embedder.dim());

    let batch = clause_batch(source, &chunks, &embeddings, embedder.dim() as i32)?;
    let store = ClauseStore::open(db)
        .await
        .context("opening clause database")?;
    store
        .rebuild(vec![batch])
        .await
        .context("rebuilding clause index")?;

    eprintln!(
        "Indexed {} clauses from {} in {:.1}s ({})",
        chunks.len(),
        source,
        start.elapsed().as_secs_f64(),
        db.display()
    );
    Ok(())
}

//! Query pipeline: parse, decide, retrieve clauses, log, display.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use claimwise_ai::Embedder;
use claimwise_core::{QueryRecord, evaluate, parse_query};
use claimwise_history::HistoryClient;
use claimwise_store::{ClauseStore, StoreError};
use tracing::warn;

use crate::display;

pub struct QueryArgs {
    pub text: String,
    pub db: PathBuf,
    pub model_dir: PathBuf,
    pub top_k: usize,
    pub history_url: Option<String>,
    pub json: bool,
}

pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let parsed = parse_query(&args.text);
    let outcome = evaluate(&parsed);

    let mut embedder = Embedder::load(&args.model_dir).context("loading embedding model")?;
    let vector = embedder
        .embed(parsed.procedure_or_default())
        .context("embedding retrieval term")?;

    let store = ClauseStore::open(&args.db)
        .await
        .context("opening clause database")?;
    let hits = match store.search(&vector, args.top_k).await {
        Ok(hits) => hits,
        Err(StoreError::IndexMissing) => {
            anyhow::bail!(
                "no clause index at {}; run `claimwise ingest` first",
                args.db.display()
            )
        }
        Err(e) => return Err(e).context("searching clause index"),
    };

    let clauses: Vec<String> = hits.iter().map(|h| h.text.clone()).collect();
    let record = QueryRecord::new(
        args.text,
        parsed,
        outcome,
        clauses,
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    );

    if let Some(url) = args.history_url {
        if let Err(e) = HistoryClient::new(url).append(&record).await {
            warn!(error = %e, "history append failed; continuing");
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        display::print_query_card(&record);
    }
    Ok(())
}

//! `claimwise` binary: ingest a policy document, process claim queries,
//! report index status.

mod display;
mod ingest;
mod query;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use claimwise_store::ClauseStore;

#[derive(Parser)]
#[command(name = "claimwise", version, about = "Insurance policy query assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk, embed, and index a policy document.
    Ingest {
        /// Plain-text policy document to index.
        #[arg(long)]
        document: PathBuf,
        /// LanceDB database directory.
        #[arg(long, env = "CLAIMWISE_DB", default_value = "claimwise.lancedb")]
        db: PathBuf,
        /// Directory containing model.onnx and tokenizer.json.
        #[arg(
            long,
            env = "CLAIMWISE_MODEL_DIR",
            default_value = "models/all-MiniLM-L6-v2"
        )]
        model_dir: PathBuf,
    },
    /// Process a claim query end to end.
    Query {
        /// Free-text claim query.
        text: String,
        /// LanceDB database directory.
        #[arg(long, env = "CLAIMWISE_DB", default_value = "claimwise.lancedb")]
        db: PathBuf,
        /// Directory containing model.onnx and tokenizer.json.
        #[arg(
            long,
            env = "CLAIMWISE_MODEL_DIR",
            default_value = "models/all-MiniLM-L6-v2"
        )]
        model_dir: PathBuf,
        /// Number of clauses to retrieve.
        #[arg(long, default_value_t = 3)]
        top_k: usize,
        /// History service base URL; logging is skipped when unset.
        #[arg(long, env = "CLAIMWISE_HISTORY_URL")]
        history_url: Option<String>,
        /// Emit the query record as JSON instead of the card.
        #[arg(long)]
        json: bool,
    },
    /// Report whether a clause index exists and its size.
    Status {
        /// LanceDB database directory.
        #[arg(long, env = "CLAIMWISE_DB", default_value = "claimwise.lancedb")]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("claimwise v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Ingest {
            document,
            db,
            model_dir,
        } => ingest::run(&document, &db, &model_dir).await,
        Command::Query {
            text,
            db,
            model_dir,
            top_k,
            history_url,
            json,
        } => {
            query::run(query::QueryArgs {
                text,
                db,
                model_dir,
                top_k,
                history_url,
                json,
            })
            .await
        }
        Command::Status { db } => status(&db).await,
    }
}

async fn status(db: &Path) -> anyhow::Result<()> {
    let store = ClauseStore::open(db).await?;
    if store.is_indexed().await? {
        let count = store.clause_count().await?;
        println!("clause index: {count} clauses at {}", db.display());
    } else {
        println!("clause index: not built (run `claimwise ingest`)");
    }
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use storage::document::JsonDocumentStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server::ApiState;

/// Topic document store and question dataset over HTTP.
#[derive(Parser)]
#[command(name = "sheet-server", about = "Serve the study sheet API")]
struct Cli {
    /// Address to bind the API server.
    #[arg(long, default_value = "0.0.0.0:5000", env = "SHEET_BIND")]
    bind: String,

    /// JSON array file holding topic-level records.
    #[arg(long, default_value = "./data.json", env = "SHEET_DOCUMENT")]
    document: PathBuf,

    /// Question dataset served by `GET /api/sheet`.
    #[arg(long, default_value = "./data/striver-sheet.json", env = "SHEET_DATASET")]
    dataset: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::info!(
        document = %cli.document.display(),
        dataset = %cli.dataset.display(),
        "starting sheet server"
    );

    let state = Arc::new(ApiState::new(
        JsonDocumentStore::new(cli.document),
        cli.dataset,
    ));
    server::serve(state, &cli.bind).await
}

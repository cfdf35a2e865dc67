//! `sheet`: command-line front end for the study sheet.

mod db;
mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use services::config::parse_timeout_secs;
use services::{
    HydrationOutcome, HydrationService, RemoteFailure, SheetApi, SheetConfig, SheetService,
    TopicRemote,
};
use sheet_core::model::{QuestionId, SubtopicId, TopicId, normalize_link};
use sheet_core::progress::next_incomplete;
use storage::cache::ClientCache;
use storage::repository::Storage;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Track progress through a Topic → Subtopic → Question study sheet.
#[derive(Parser)]
#[command(name = "sheet", about = "Study sheet progress tracker")]
struct Cli {
    /// SQLite cache holding the sheet, completed questions and admin flag.
    #[arg(long, global = true, env = "SHEET_CACHE_DB", default_value = db::DEFAULT_DB_URL)]
    db: String,

    /// Base URL of the sheet API (overrides `SHEET_API_URL`).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in whole seconds (overrides `SHEET_API_TIMEOUT_SECS`).
    #[arg(long, global = true, value_parser = parse_timeout_secs)]
    timeout_secs: Option<Duration>,

    /// Work from the local cache only; nothing is sent to the API.
    #[arg(long, global = true)]
    offline: bool,

    /// Re-send failed API writes this many times before giving up.
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sheet with progress at every level.
    Show,

    /// Overall progress and the next open question.
    Status,

    /// The first question that is not completed yet.
    Next,

    /// Case-insensitive search over topic and question titles.
    Search { query: String },

    /// Mark a question done, or undone if it already was.
    Toggle { question: String },

    /// Fill an empty sheet from the API's question dataset.
    Sync,

    /// Show or change admin mode.
    Admin {
        #[arg(value_enum, default_value_t = AdminAction::Status)]
        action: AdminAction,
    },

    /// Append a topic.
    AddTopic { title: String },

    /// Delete a topic and everything under it.
    DeleteTopic { topic: String },

    /// Move the topic at index FROM to index TO.
    Reorder { from: usize, to: usize },

    /// Move a topic to where another topic is.
    Move { dragged: String, target: String },

    /// Append a subtopic to a topic.
    AddSubtopic { topic: String, title: String },

    DeleteSubtopic { topic: String, subtopic: String },

    /// Append a question to a subtopic.
    AddQuestion {
        topic: String,
        subtopic: String,
        title: String,
        /// Problem URL; `https://` is added when no scheme is given.
        #[arg(long, default_value = "")]
        link: String,
    },

    DeleteQuestion {
        topic: String,
        subtopic: String,
        question: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AdminAction {
    Status,
    On,
    Off,
    Toggle,
}

impl Commands {
    /// Structural edits are only offered in admin mode.
    fn needs_admin(&self) -> bool {
        matches!(
            self,
            Commands::AddTopic { .. }
                | Commands::DeleteTopic { .. }
                | Commands::Reorder { .. }
                | Commands::Move { .. }
                | Commands::AddSubtopic { .. }
                | Commands::DeleteSubtopic { .. }
                | Commands::AddQuestion { .. }
                | Commands::DeleteQuestion { .. }
        )
    }

    /// Read views seed an empty sheet from the dataset first.
    fn hydrates_on_start(&self) -> bool {
        matches!(self, Commands::Show | Commands::Status | Commands::Next)
    }
}

fn api_config(cli: &Cli) -> Result<SheetConfig> {
    let mut config = SheetConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = SheetConfig::new(url, config.timeout())?;
    }
    if let Some(timeout) = cli.timeout_secs {
        config = SheetConfig::new(config.base_url(), timeout)?;
    }
    Ok(config)
}

fn report(applied: bool, what: &str) {
    if applied {
        println!("{what}");
    } else {
        println!("Nothing matched; no change.");
    }
}

async fn run_command(
    command: Commands,
    store: &SheetService,
    remote: Option<Arc<dyn TopicRemote>>,
) -> Result<()> {
    match command {
        Commands::Show => {
            let admin = store.is_admin().await;
            let tree = store
                .read(|sheet, completed| render::sheet_tree(sheet, completed, admin))
                .await;
            print!("{tree}");
            println!("{}", render::progress_line("Overall", store.progress().await));
        }
        Commands::Status => {
            println!("{}", render::progress_line("Overall", store.progress().await));
            let next = store
                .read(|sheet, completed| render::next_line(next_incomplete(sheet, completed)))
                .await;
            println!("{next}");
        }
        Commands::Next => {
            let next = store
                .read(|sheet, completed| render::next_line(next_incomplete(sheet, completed)))
                .await;
            println!("{next}");
        }
        Commands::Search { query } => {
            let results = store
                .read(|sheet, completed| render::search_results(sheet, completed, &query))
                .await;
            print!("{results}");
        }
        Commands::Toggle { question } => {
            let done = store.toggle_complete(&QuestionId::new(question)).await?;
            println!("{}", if done { "Marked done." } else { "Marked not done." });
        }
        Commands::Sync => {
            let Some(remote) = remote else {
                bail!("sync needs the sheet API; drop --offline");
            };
            match HydrationService::new(remote).hydrate_if_empty(store).await {
                HydrationOutcome::Hydrated { topics, questions } => {
                    println!("Loaded {topics} topics with {questions} questions.");
                }
                HydrationOutcome::Skipped => println!("Sheet already has topics; nothing loaded."),
                HydrationOutcome::EmptyDataset => println!("The dataset is empty."),
                HydrationOutcome::Failed(err) => {
                    eprintln!("Could not load the dataset: {err}");
                    eprintln!("Your local sheet is unchanged; run `sheet sync` to try again.");
                }
            }
        }
        Commands::Admin { action } => {
            let admin = match action {
                AdminAction::Status => store.is_admin().await,
                AdminAction::On => {
                    store.set_admin_mode(true).await?;
                    true
                }
                AdminAction::Off => {
                    store.set_admin_mode(false).await?;
                    false
                }
                AdminAction::Toggle => store.toggle_admin_mode().await?,
            };
            println!("Admin mode is {}.", if admin { "on" } else { "off" });
        }
        Commands::AddTopic { title } => match store.add_topic(&title).await? {
            Some(topic) => println!("Added topic {} ({}).", topic.title(), topic.id()),
            None => println!("Topic title is empty; nothing added."),
        },
        Commands::DeleteTopic { topic } => {
            let outcome = store.delete_topic(&TopicId::new(topic)).await?;
            report(outcome.is_applied(), "Topic deleted.");
        }
        Commands::Reorder { from, to } => {
            let outcome = store.reorder_topics(from, to).await?;
            report(outcome.is_applied(), "Topics reordered.");
        }
        Commands::Move { dragged, target } => {
            let outcome = store
                .move_topic(&TopicId::new(dragged), &TopicId::new(target))
                .await?;
            report(outcome.is_applied(), "Topic moved.");
        }
        Commands::AddSubtopic { topic, title } => {
            match store.add_subtopic(&TopicId::new(topic), &title).await? {
                Some(sub) => println!("Added subtopic {} ({}).", sub.title(), sub.id()),
                None => println!("Nothing matched; no change."),
            }
        }
        Commands::DeleteSubtopic { topic, subtopic } => {
            let outcome = store
                .delete_subtopic(&TopicId::new(topic), &SubtopicId::new(subtopic))
                .await?;
            report(outcome.is_applied(), "Subtopic deleted.");
        }
        Commands::AddQuestion {
            topic,
            subtopic,
            title,
            link,
        } => {
            let link = normalize_link(&link);
            let added = store
                .add_question(&TopicId::new(topic), &SubtopicId::new(subtopic), &title, &link)
                .await?;
            match added {
                Some(q) => println!("Added question {} ({}).", q.title(), q.id()),
                None => println!("Nothing matched; no change."),
            }
        }
        Commands::DeleteQuestion {
            topic,
            subtopic,
            question,
        } => {
            let outcome = store
                .delete_question(
                    &TopicId::new(topic),
                    &SubtopicId::new(subtopic),
                    &QuestionId::new(question),
                )
                .await?;
            report(outcome.is_applied(), "Question deleted.");
        }
    }
    Ok(())
}

/// Load the dataset into an empty sheet before a read view is printed.
///
/// Failures are reported and the command still runs on the local sheet.
async fn hydrate_before_read(
    command: &Commands,
    store: &SheetService,
    remote: Option<&Arc<dyn TopicRemote>>,
) {
    let Some(remote) = remote else {
        return;
    };
    if !command.hydrates_on_start() || !store.read(|sheet, _| sheet.is_empty()).await {
        return;
    }
    match HydrationService::new(Arc::clone(remote))
        .hydrate_if_empty(store)
        .await
    {
        HydrationOutcome::Hydrated { topics, questions } => {
            tracing::info!(topics, questions, "empty sheet loaded before read");
        }
        HydrationOutcome::Skipped | HydrationOutcome::EmptyDataset => {}
        HydrationOutcome::Failed(err) => {
            eprintln!("warning: could not load the dataset: {err}");
        }
    }
}

/// Wait for API writes, re-sending failures up to `retries` times.
async fn settle_remote(
    store: &SheetService,
    failures: &mut mpsc::UnboundedReceiver<RemoteFailure>,
    retries: u32,
) {
    let mut attempt = 0;
    loop {
        store.flush().await;
        let mut failed = Vec::new();
        while let Ok(failure) = failures.try_recv() {
            failed.push(failure);
        }
        if failed.is_empty() {
            return;
        }
        if attempt >= retries {
            for failure in failed {
                eprintln!(
                    "warning: {} for topic {} did not reach the API: {}",
                    failure.op.name(),
                    failure.op.topic_id(),
                    failure.error
                );
            }
            eprintln!("Local changes are saved; pass --retries to re-send.");
            return;
        }
        attempt += 1;
        tracing::info!(attempt, count = failed.len(), "retrying failed API writes");
        for failure in failed {
            store.retry(failure.op);
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let db_url = db::normalize_sqlite_url(&cli.db);
    db::prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url)
        .await
        .with_context(|| format!("opening cache {db_url}"))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut store = SheetService::load(ClientCache::new(storage.cache))
        .await?
        .with_failure_sink(tx);

    let remote: Option<Arc<dyn TopicRemote>> = if cli.offline {
        None
    } else {
        let api = SheetApi::new(api_config(&cli)?)?;
        tracing::debug!(base_url = api.config().base_url(), "using sheet API");
        Some(Arc::new(api))
    };
    if let Some(remote) = &remote {
        store = store.with_remote(Arc::clone(remote));
    }

    if cli.command.needs_admin() && !store.is_admin().await {
        bail!("admin mode is off; run `sheet admin on` to edit the sheet");
    }

    hydrate_before_read(&cli.command, &store, remote.as_ref()).await;
    let result = run_command(cli.command, &store, remote).await;
    settle_remote(&store, &mut rx, cli.retries).await;
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheet=warn,services=warn,storage=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run().await
}

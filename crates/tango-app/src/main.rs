use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tango_config::Config;
use tango_core::{Importer, SearchIndex, SearchOutcome, Searcher, WordStore};

use crate::server::AppState;

mod server;

#[derive(Parser)]
#[command(name = "tango", about = "Japanese dictionary search service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a jmdict-simplified JSON file into the index and store
    Import {
        source: PathBuf,
        /// Drop the existing index and store for this version first
        #[arg(long)]
        rebuild: bool,
    },
    /// Run a single query and print the results as JSON
    Search { query: String },
    /// Serve the HTTP search API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let index = Arc::new(
        SearchIndex::open(&config.index_path())
            .with_context(|| format!("opening index at {}", config.index_path().display()))?,
    );
    let store = Arc::new(
        WordStore::open(&config.store_path(), &config.jmdict_version)
            .with_context(|| format!("opening store at {}", config.store_path().display()))?,
    );

    match cli.command {
        Command::Import { source, rebuild } => {
            let importer = Importer::new(index, store, config.batch_size, config.import_workers);
            let report = importer
                .run(&source, rebuild)
                .await
                .with_context(|| format!("importing {}", source.display()))?;
            println!(
                "imported {} words in {:.2?}",
                report.words_imported, report.elapsed
            );
        }
        Command::Search { query } => {
            let searcher = Searcher::new(index, store);
            match searcher.search(&query)? {
                SearchOutcome::Found(words) => {
                    println!("{}", serde_json::to_string_pretty(&words)?);
                }
                SearchOutcome::Empty => println!("no results for {query:?}"),
            }
        }
        Command::Serve => {
            let state = Arc::new(AppState {
                searcher: Searcher::new(index, store),
            });
            server::serve(&config.listen_addr, state).await?;
        }
    }

    Ok(())
}

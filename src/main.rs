use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ragserve::{HfEmbeddingProvider, MistralAnswerModel, RagService, ServiceConfig};

#[derive(Parser)]
#[command(name = "ragserve", about = "Question answering over a document corpus", version)]
struct Cli {
    /// Source documents (PDF or CSV), in ingestion order.
    #[arg(long = "corpus", required = true, num_args = 1..)]
    corpus: Vec<PathBuf>,

    /// Directory for the persisted index snapshot.
    #[arg(long, default_value = "vectorstore_db")]
    snapshot_dir: PathBuf,

    /// Number of chunks retrieved per query.
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (the default).
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0:5001")]
        addr: SocketAddr,
    },
    /// Run an interactive question-answering loop.
    Repl,
}

fn build_service(cli: &Cli) -> anyhow::Result<Arc<RagService>> {
    let config = ServiceConfig::builder()
        .corpus_paths(cli.corpus.clone())
        .snapshot_dir(cli.snapshot_dir.clone())
        .top_k(cli.top_k)
        .build()?;

    let embedder = Arc::new(HfEmbeddingProvider::from_env()?);
    let model = Arc::new(MistralAnswerModel::from_env()?);
    Ok(Arc::new(RagService::new(config, embedder, model)))
}

async fn run_repl(service: Arc<RagService>) -> anyhow::Result<()> {
    let report = service.initialize().await?;
    println!("Ready: {} chunks indexed.", report.chunks_indexed);

    let stdin = io::stdin();
    loop {
        print!("\nEnter your query (or type 'exit' to quit): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") {
            break;
        }

        match service.query(question).await {
            Ok(result) => {
                println!("\n{}", result.answer);
                println!("\nSources:");
                for source in &result.sources {
                    println!("[{}] {}: {}", source.rank, source.page_or_row, source.preview);
                }
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let service = build_service(&cli)?;

    match cli.command.unwrap_or(Command::Serve { addr: ([0, 0, 0, 0], 5001).into() }) {
        Command::Serve { addr } => {
            // Initialize eagerly so the first query is fast, but keep
            // serving on failure; health reports initialized = false.
            match service.initialize().await {
                Ok(report) => {
                    info!(chunks = report.chunks_indexed, "index ready");
                }
                Err(e) => {
                    warn!(error = %e, "initialization failed, serving uninitialized");
                }
            }
            if let Err(e) = ragserve::server::serve(service, addr).await {
                error!(error = %e, "server exited");
                return Err(e.into());
            }
            Ok(())
        }
        Command::Repl => run_repl(service).await,
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use docent_core::{App, Config, IngestReport, QueryResult};
use docent_llm::any::AnyProvider;
use docent_llm::ollama::OllamaProvider;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(
    name = "docent",
    version,
    about = "Ask questions about your own documents with a local Ollama model"
)]
struct Cli {
    /// TOML configuration file
    #[arg(
        long,
        global = true,
        env = "DOCENT_CONFIG",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk, embed and index .pdf or .txt files
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Answer a single question from the indexed documents
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Read questions from stdin, one per line, until EOF
    Chat,
    /// Show index statistics
    Stats,
    /// List indexed documents
    Sources,
    /// Delete the index and its persisted files
    Clear,
    /// List models served by the Ollama backend
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    let provider = Arc::new(build_provider(&config));
    let mut app = App::new(config, provider)
        .await
        .context("failed to open the document index")?;

    match cli.command {
        Command::Ingest { files } => ingest(&mut app, &files, cli.json).await,
        Command::Ask { question } => {
            app.engine().check_backend().await;
            let result = app.ask(&question.join(" ")).await;
            print_result(&result, cli.json)
        }
        Command::Chat => {
            app.engine().check_backend().await;
            chat(&mut app, cli.json).await
        }
        Command::Stats => {
            let stats = app.engine().stats();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("documents:  {}", stats.total_documents);
                println!("dimension:  {}", stats.embedding_dimension);
                println!("embeddings: {}", stats.model_name);
                println!("generation: {}", app.engine().model());
            }
            Ok(())
        }
        Command::Sources => {
            let sources = app.engine().index().sources();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&sources)?);
            } else if sources.is_empty() {
                println!("no documents indexed");
            } else {
                for source in sources {
                    println!("{source}");
                }
            }
            Ok(())
        }
        Command::Clear => {
            app.clear().await.context("failed to clear the index")?;
            println!("index cleared");
            Ok(())
        }
        Command::Models => {
            let models = app.engine().available_models().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&models)?);
            } else if models.is_empty() {
                println!("no models available, is Ollama running?");
            } else {
                let current = app.engine().model();
                for model in &models {
                    let marker = if model == current { "*" } else { " " };
                    println!("{marker} {model}");
                }
            }
            Ok(())
        }
    }
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_provider(config: &Config) -> AnyProvider {
    AnyProvider::Ollama(OllamaProvider::new(
        &config.llm.base_url,
        config.llm.embedding_model.clone(),
    ))
}

async fn ingest(app: &mut App<AnyProvider>, files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let mut reports: Vec<IngestReport> = Vec::with_capacity(files.len());
    let mut failed = 0usize;

    for path in files {
        match app.ingest_path(path).await {
            Ok(report) => {
                if !json {
                    println!(
                        "{}: {} chunks (avg {:.0} chars)",
                        report.source, report.indexed, report.chunks.avg_size
                    );
                }
                reports.push(report);
            }
            Err(e) => {
                failed += 1;
                tracing::error!(path = %path.display(), "ingest failed: {e:#}");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed to ingest", files.len());
    }
    Ok(())
}

async fn chat(app: &mut App<AnyProvider>, json: bool) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "/quit" | "/exit" => break,
            "/models" => {
                for model in app.engine().available_models().await {
                    println!("{model}");
                }
            }
            "/clear" => {
                app.clear().await.context("failed to clear the index")?;
                println!("index cleared");
            }
            _ => {
                if let Some(name) = line.strip_prefix("/model ") {
                    let name = name.trim();
                    if app.engine_mut().change_model(name).await {
                        println!("using {name}");
                    } else {
                        println!("model {name} is not available");
                    }
                } else {
                    let result = app.ask(line).await;
                    print_result(&result, json)?;
                }
            }
        }
    }
    Ok(())
}

fn print_result(result: &QueryResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    println!("{}", result.answer);
    if !result.sources.is_empty() {
        println!("\nSources:");
        for source in &result.sources {
            println!(
                "  [{}] {} (chunk {}, score {:.3})",
                source.id, source.source, source.chunk_id, source.relevance_score
            );
            println!("      {}", source.preview.replace('\n', " "));
        }
    }
    println!();
    Ok(())
}

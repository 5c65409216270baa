// repolens CLI entry point.
// Thin command-line front end over the API client: health checks, listings, structure diagrams, queries.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use repolens::{ApiClient, ClientConfig, Result};

#[derive(Parser)]
#[command(name = "repolens")]
#[command(about = "Explore analysed repositories through a resilient backend client")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Backend API root (overrides REPOLENS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the backend is up
    Health,
    /// List a user's repositories
    Repos {
        username: String,
    },
    /// Print a repository's structure as a Mermaid diagram
    Structure {
        repo_url: String,
    },
    /// Ask the backend to analyse a repository
    Process {
        github_url: String,
    },
    /// Ask a question about a processed repository
    Ask {
        repo_url: String,
        question: String,
        /// Model to answer with
        #[arg(long)]
        model: Option<String>,
    },
    /// Search functions of a processed repository
    Search {
        repo_url: String,
        query: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.message());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "repolens=debug" } else { "repolens=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url);
    }
    let mut client = ApiClient::from_config(&config)?;

    match cli.command {
        Commands::Health => match client.health().await {
            Ok(health) => {
                println!("{}", health.status);
                if let Some(message) = health.message {
                    println!("{}", message);
                }
            }
            Err(e) => warn!(error = %e.message(), "backend health check failed"),
        },
        Commands::Repos { username } => {
            let repos = client.user_repositories(&username).await?;
            for repo in &repos {
                println!(
                    "{:<40} {:>6}★  {}",
                    repo.full_name,
                    repo.star_count,
                    repo.language.as_deref().unwrap_or("-")
                );
            }
            info!(count = repos.len(), "listed repositories");
        }
        Commands::Structure { repo_url } => {
            let structure = client.repository_structure(&repo_url).await?;
            println!("{}", structure.diagram().to_mermaid());
        }
        Commands::Process { github_url } => {
            let processed = client.process_repository(&github_url).await?;
            println!("{}", processed.message);
            if let Some(summary) = processed.summary() {
                println!("\n{}", summary);
            }
            let roots = processed.tree()?;
            println!("\n{}", repolens::DiagramGenerator::new().generate(&roots));
        }
        Commands::Ask {
            repo_url,
            question,
            model,
        } => {
            let answer = client
                .query_repository(&repo_url, &question, model.as_deref())
                .await?;
            println!("{}", answer.response);
        }
        Commands::Search { repo_url, query } => {
            let found = client.search_functions(&repo_url, &query).await?;
            for hit in &found.results {
                println!("{}  ({})", hit.function_name, hit.file_path);
                if let Some(summary) = &hit.function_summary {
                    println!("    {}", summary);
                }
            }
        }
    }

    Ok(())
}

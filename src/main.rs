use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use artemis::category::Category;
use artemis::config::{Config, StoreBackend};
use artemis::orchestrator::{ChatRequest, Orchestrator};
use artemis::providers;
use artemis::store::{ConversationStore, InMemoryStore, SupabaseStore};
use artemis::{chat, constants, web_server};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about = "Artemis creative writing assistant", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the Artemis web server.
    Start {
        #[arg(long, default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
        #[arg(long, value_enum, help = "Conversation store (defaults to ARTEMIS_STORE or memory).")]
        store: Option<StoreBackend>,
    },
    /// Chat with Artemis in the terminal.
    Chat {
        #[arg(long, default_value = "general", help = "Writing category to chat in.")]
        category: String,
        #[arg(long, help = "Skip the hosted models and answer locally.")]
        offline: bool,
    },
    /// Ask a single question and print the answer.
    Ask {
        #[arg(long, default_value = "general", help = "Writing category of the question.")]
        category: String,
        #[arg(long, help = "Skip the hosted models and answer locally.")]
        offline: bool,
        message: String,
    },
    /// List the writing categories.
    Categories,
}

fn build_orchestrator(config: &Config, offline: bool) -> Result<Orchestrator> {
    if offline {
        return Ok(Orchestrator::offline());
    }
    info!("Provider credentials: {}", config.credential_summary());
    Orchestrator::from_config(config).context("Failed to build provider HTTP client")
}

fn build_store(config: &Config, backend: StoreBackend) -> Result<Arc<dyn ConversationStore>> {
    Ok(match backend {
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        StoreBackend::Supabase => {
            let supabase = config.require_supabase()?;
            let client = providers::http_client(config.request_timeout)
                .context("Failed to build Supabase HTTP client")?;
            info!("Using Supabase conversation store at {}", supabase.url);
            Arc::new(SupabaseStore::new(supabase, client))
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (API keys, Supabase settings)
    dotenvy::dotenv().ok();

    // Logs go to stderr so `ask` output stays clean. RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Start { port, store } => {
            let backend = store.unwrap_or(config.store);
            info!("Starting Artemis on port {} with {:?} store...", port, backend);

            let orchestrator = Arc::new(build_orchestrator(&config, false)?);
            let store = build_store(&config, backend)?;
            let state = web_server::AppState::new(orchestrator, store);

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, state).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, shutting down...");
                    web_server_handle.abort();
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }
            info!("Shutdown complete.");
        }
        Commands::Chat { category, offline } => {
            let orchestrator = build_orchestrator(&config, offline)?;
            chat::run_chat(&orchestrator, Category::parse(&category))
                .await
                .context("Chat session failed")?;
        }
        Commands::Ask {
            category,
            offline,
            message,
        } => {
            let orchestrator = build_orchestrator(&config, offline)?;
            let request = ChatRequest::new(Category::parse(&category), message);
            let response = orchestrator.generate(&request).await;
            println!("{}", response.text);
        }
        Commands::Categories => {
            for category in Category::PRIMARY.iter() {
                println!("{:<20} {}", category.as_str(), category.title());
            }
        }
    }

    Ok(())
}

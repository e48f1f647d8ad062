use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;

use docchat::app::App;
use docchat::backend::{strip_angle_brackets, BackendClient};
use docchat::config::Config;
use docchat::handler::handle_event;
use docchat::index::EMPTY_INDEX_PLACEHOLDER;
use docchat::{logging, tui, ui};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(version, about = "Chat with your documents through a RAG backend")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "DOCCHAT_BACKEND_URL", global = true)]
    backend_url: Option<String>,

    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the reply
    Ask {
        /// Your question
        message: String,
    },
    /// Upload files to the backend
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Embed newly uploaded documents and list the index
    Embed,
    /// List embedded files
    Files,
    /// Show backend readiness
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let backend_url = config.backend_url(cli.backend_url.as_deref());
    let client = BackendClient::with_timeout(&backend_url, config.request_timeout())
        .context("Failed to build HTTP client")?;

    let Some(command) = cli.command else {
        return run_tui(client, &config).await;
    };

    logging::init_cli();
    match command {
        Commands::Ask { message } => ask(&client, &message).await,
        Commands::Upload { paths } => upload(&client, &paths).await,
        Commands::Embed => embed(&client).await,
        Commands::Files => list_files(&client).await,
        Commands::Status => status(&client).await,
    }
}

async fn run_tui(client: BackendClient, config: &Config) -> Result<()> {
    let _guard = logging::init_tui();
    info!("Starting docchat against {}", client.base_url());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new(config.tick_rate());

    let mut app = App::new(client);
    app.mount();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            let Some(event) = events.next().await else {
                break;
            };
            handle_event(&mut app, event);
            app.poll_requests().await;
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    info!("docchat exiting");
    result
}

async fn ask(client: &BackendClient, message: &str) -> Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message is empty");
    }

    println!("{} {}", "You:".bold().cyan(), message);
    let reply = client
        .chat(message)
        .await
        .context("Could not reach backend")?;
    println!("{} {}", "Bot:".bold().yellow(), strip_angle_brackets(&reply));
    Ok(())
}

async fn upload(client: &BackendClient, paths: &[PathBuf]) -> Result<()> {
    println!("📤 Uploading {} file(s)...", paths.len().to_string().bold());
    client.upload(paths).await.context("Upload failed")?;
    for path in paths {
        println!("  • {}", path.display().to_string().green());
    }
    println!("{}", format!("Uploaded {} file(s).", paths.len()).bold().green());
    Ok(())
}

async fn embed(client: &BackendClient) -> Result<()> {
    println!("🧠 Embedding new documents...");
    client.embed_all().await.context("Embedding failed")?;
    println!("{}", "Embedding complete.".bold().green());
    list_files(client).await
}

async fn list_files(client: &BackendClient) -> Result<()> {
    let files = client
        .embedded_files()
        .await
        .context("Failed to list embedded files")?;

    println!("\n{}", "📚 Embedded Files".bold().blue());
    println!("{}", "=".repeat(30).dimmed());
    if files.is_empty() {
        println!("{}", EMPTY_INDEX_PLACEHOLDER.dimmed());
    } else {
        for file in &files {
            println!("  • {}", file);
        }
        println!("\n{} file(s)", files.len().to_string().bold());
    }
    Ok(())
}

async fn status(client: &BackendClient) -> Result<()> {
    println!("Backend at {}", client.base_url().bold());
    let health = match client.health().await {
        Ok(health) => health,
        Err(e) => {
            println!("Backend: {}", "Not Ready".bold().red());
            return Err(e).context("Health check failed");
        }
    };

    let label = if health.is_ok() {
        "Ready".bold().green()
    } else {
        "Not Ready".bold().red()
    };
    println!("Backend: {}", label);
    for line in health.info_lines() {
        println!("  {}", line.dimmed());
    }
    Ok(())
}

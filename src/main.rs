use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ebot_chat::{handler, tui, ui, App, ChatClient, ChatWidget, Config};

#[derive(Parser)]
#[command(name = "ebot")]
#[command(about = "Chat with the E-Bot order-status assistant", version)]
struct Cli {
    /// Chat endpoint URL (overrides the config file)
    #[arg(long, env = "EBOT_ENDPOINT")]
    endpoint: Option<String>,

    /// Config file location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file for the interactive session
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the conversation
    Send {
        /// Message text
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref())?;
    let client = ChatClient::new(&endpoint);

    match cli.command {
        Some(Commands::Send { message }) => {
            init_stderr_logging();
            send_once(client, &message).await
        }
        None => {
            let log_file = match cli.log_file {
                Some(path) => path,
                None => default_log_path()?,
            };
            init_file_logging(&log_file)?;
            run_tui(client).await
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The terminal belongs to the UI, so interactive logs go to a file
fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("ebot").join("ebot.log"))
}

async fn send_once(client: ChatClient, message: &str) -> Result<()> {
    let mut chat = ChatWidget::new();
    chat.draft = message.to_string();
    chat.cursor_end();
    chat.submit_draft(&client).await;

    for msg in &chat.conversation {
        println!("{}: {}", msg.role.label(), msg.content);
    }
    Ok(())
}

async fn run_tui(client: ChatClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let tx = events.sender();
    let mut app = App::new(client);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            let Some(event) = events.next().await else { break };
            handler::handle_event(&mut app, event, &tx);
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    info!(messages = app.chat.conversation.len(), "chat session ended");
    result
}

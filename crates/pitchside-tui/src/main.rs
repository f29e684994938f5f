use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use pitchside_core::{
    config, ChatClient, ChatController, ChatRole, ClientConfig, Config, MatchQuery, ModelId, Overrides,
    FALLBACK_MESSAGE,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "pitchside", version)]
#[command(about = "Chat with a cricket match analysis server from your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the analysis server (default http://localhost:8000)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Whether the analysis server is running; when false, replies are placeholders
    #[arg(long, global = true, value_name = "BOOL")]
    server_available: Option<bool>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Ask a single question and print the analysis
    Ask {
        /// Your question, e.g. "MI vs CSK at Wankhede Stadium"
        message: String,
        /// Model to use
        #[arg(short, long)]
        model: Option<ModelId>,
    },
    /// List the models the server recognizes
    Models,
    /// Check that the analysis server is reachable
    Ping,
    /// Save the default model to the config file
    SetModel {
        model: ModelId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        api_url: cli.api_url,
        server_available: cli.server_available,
        default_model: None,
        request_timeout_secs: cli.timeout,
    };

    // `.env` may set RUST_LOG, so it goes in before any subscriber
    config::load_dotenv();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let log_path = logging::init_file()?;
            let config = ClientConfig::load(overrides);
            info!(log = %log_path.display(), chat_url = %config.chat_url(), "starting chat");
            run_tui(config).await
        }
        Commands::Ask { message, model } => {
            logging::init_stderr()?;
            ask(ClientConfig::load(overrides), &message, model).await
        }
        Commands::Models => {
            list_models(&ClientConfig::load(overrides));
            Ok(())
        }
        Commands::Ping => {
            logging::init_stderr()?;
            ping(&ClientConfig::load(overrides)).await
        }
        Commands::SetModel { model } => {
            let path = Config::save_default_model(model)?;
            println!("Default model set to {} in {}", model, path.display());
            Ok(())
        }
    }
}

async fn run_tui(config: ClientConfig) -> Result<()> {
    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run_loop(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }

        app.poll_reply();
    }

    Ok(())
}

async fn ask(config: ClientConfig, message: &str, model: Option<ModelId>) -> Result<()> {
    if message.trim().is_empty() {
        bail!("Question is empty");
    }

    match MatchQuery::parse(message) {
        Some(fixture) => println!("Analyzing {}\n", fixture),
        None => eprintln!("Tip: the server works best with 'Team1 vs Team2 at Venue'\n"),
    }

    let client = ChatClient::new(&config.api_endpoint, config.request_timeout)?;
    let mut controller = ChatController::new(config, client);
    if let Some(model) = model {
        controller.select_model(model);
    }

    controller.submit(message)?;
    controller.wait().await;

    if let Some(reply) = controller
        .transcript()
        .iter()
        .rev()
        .find(|m| m.role() == ChatRole::Assistant)
    {
        println!("{}", reply.content());
    }

    if let Some(prediction) = controller.latest_prediction() {
        println!(
            "\nPrediction: {} ({:.0}% to win)",
            prediction.team,
            prediction.win_probability * 100.0
        );
        if !prediction.key_players.is_empty() {
            println!("Key players: {}", prediction.key_players.join(", "));
        }
    }

    Ok(())
}

fn list_models(config: &ClientConfig) {
    println!("Recognized models:");
    for model in ModelId::all() {
        let marker = if model == config.default_model { "*" } else { " " };
        println!(
            " {} {:<16} {} ({})",
            marker,
            model.as_str(),
            model.display_name(),
            model.provider().display_name()
        );
    }
}

async fn ping(config: &ClientConfig) -> Result<()> {
    if !config.server_available {
        println!("Server marked unavailable; chat replies will be:\n  {}\n", FALLBACK_MESSAGE);
    }

    let client = ChatClient::new(&config.api_endpoint, config.request_timeout)?;
    match client.ping().await {
        Ok(message) => {
            println!("{} is up: {}", client.base_url(), message);
            Ok(())
        }
        Err(e) => bail!("{} is not reachable: {}", client.base_url(), e),
    }
}

mod command;
mod config;
mod error;
mod printer;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tripmate::builder::ClientBuilder;
use tripmate::{AuthClient, ChatStore};

use crate::command::{Command, HELP};
use crate::config::Config;
use crate::error::CliError;
use crate::printer::StreamPrinter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting tripmate client against {}", config.api.base_url);

    let mut builder = ClientBuilder::new()
        .base_url(&config.api.base_url)
        .request_timeout(config.api.request_timeout())
        .connect_timeout(config.api.connect_timeout())
        .page_size(config.chat.page_size)
        .observer(Arc::new(StreamPrinter::new()))
        .on_unauthorized(Arc::new(|| {
            eprintln!("\nSession expired, please /login again");
        }));
    if let Some(model) = &config.chat.model {
        builder = builder.model(model);
    }
    if let Some(path) = &config.auth.token_file {
        builder = builder.token_file(path);
    }
    if let Some(token) = &config.token {
        builder = builder.token(token);
    }

    let client = builder.build()?;
    let (mut store, auth) = (client.store, client.auth);

    if auth.is_authenticated() {
        list_conversations(&mut store).await;
    } else {
        println!("Not signed in, use /login <user> <password>");
    }
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&store);
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match run(command, &mut store, &auth).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("{}", e),
        }
    }

    tracing::info!("Exiting");
    Ok(())
}

/// Execute one command; `Ok(false)` ends the session
async fn run(command: Command, store: &mut ChatStore, auth: &AuthClient) -> anyhow::Result<bool> {
    match command {
        Command::Empty => {}
        Command::Quit => return Ok(false),
        Command::Help => println!("{}", HELP),
        Command::Chat(text) => store.send_message(&text).await,

        Command::Login { username, password } => {
            auth.login(&username, &password).await?;
            println!("Signed in as {}", username);
            list_conversations(store).await;
        }
        Command::Logout => {
            auth.logout().await?;
            println!("Signed out");
        }

        Command::List => list_conversations(store).await,
        Command::New(title) => {
            let summary = store.create_conversation(&title).await?;
            println!("Started \"{}\" ({})", summary.title, summary.id);
        }
        Command::Open(id) => {
            store.open_conversation(&id).await?;
            for message in store.messages() {
                println!("{:?}> {}", message.role, message.content);
            }
        }
        Command::Delete(id) => {
            store.delete_conversation(&id).await?;
            println!("Deleted {}", id);
        }
        Command::Clear => {
            let id = store
                .state()
                .current_conversation_id()
                .map(str::to_string)
                .ok_or(CliError::NoConversation)?;
            store.clear_conversation_messages(&id).await?;
            println!("Cleared");
        }
        Command::Tools => print_tools(store),
    }
    Ok(true)
}

async fn list_conversations(store: &mut ChatStore) {
    let conversations = store.refresh_conversations().await;
    if conversations.is_empty() {
        match store.error() {
            Some(error) => eprintln!("Could not load conversations: {}", error),
            None => println!("No conversations yet, /new to start one"),
        }
        return;
    }
    for c in conversations {
        println!(
            "{}  {}  {}",
            c.id,
            c.title,
            c.latest_message_preview.as_deref().unwrap_or_default()
        );
    }
}

fn print_tools(store: &ChatStore) {
    let mut any = false;
    for message in store.messages() {
        for (tool, entry) in store.tool_status(&message.id) {
            any = true;
            println!("{}  {:<16} {:?}  {}", message.id, tool, entry.status, entry.content);
        }
    }
    if !any {
        println!("No tool activity in this conversation");
    }
}

fn prompt(store: &ChatStore) {
    use std::io::Write;

    let title = store
        .state()
        .current_conversation
        .as_ref()
        .map(|c| c.title.as_str())
        .unwrap_or("no conversation");
    print!("[{}] you> ", title);
    let _ = std::io::stdout().flush();
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

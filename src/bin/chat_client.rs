//! Terminal front end for the chat proxy.
use anyhow::Context;
use chat_proxy::ui::terminal::{self, TerminalView};
use chat_proxy::ui::transport::DEFAULT_PROXY_URL;
use chat_proxy::ui::{ChatController, HttpTransport};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chat-client", about = "Chat with the model through the chat proxy")]
struct Cli {
    /// Chat endpoint of the proxy.
    #[arg(long, env = "CHAT_PROXY_URL", default_value = DEFAULT_PROXY_URL)]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let transport =
        HttpTransport::new(reqwest::Client::new(), &cli.url).context("invalid --url")?;
    let mut chat = ChatController::with_view(transport, TerminalView::new(std::io::stdout()));

    println!("Chat with Groq ({}). Type {} to leave.\n", cli.url, terminal::QUIT);

    terminal::run(&mut chat, BufReader::new(tokio::io::stdin()))
        .await
        .context("failed to read stdin")?;
    Ok(())
}

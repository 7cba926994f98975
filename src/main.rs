use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

mod config;
mod printer;
mod system_prompt;

use system_prompt::ConfiguredPrompt;

/// Print the generated system prompt between banners
#[derive(Parser, Debug)]
#[command(author, version, about = "Print the generated system prompt")]
struct Args {}

#[tokio::main]
async fn main() {
    let _args = Args::parse();

    // stdout carries the prompt, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("show_prompt=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // load environment variables from .env file
    dotenv().ok();

    let source = ConfiguredPrompt::new();
    let mut stdout = std::io::stdout();

    if let Err(err) = printer::run(&source, &mut stdout).await {
        tracing::debug!("Prompt generation failed: {:?}", err);
        printer::report_failure(&err, &mut std::io::stderr());
        std::process::exit(1);
    }
}

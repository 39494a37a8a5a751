mod cli;
mod repl;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use nimbus_ai::tools::ToolRegistry;
use nimbus_ai::{OpenAiClient, OpenAiConfig, Session};
use nimbus_weather::WeatherTool;

const SYSTEM_PROMPT: &str = "You are a concise weather assistant. To answer weather questions, \
call the function get_weather_by_city with a city name (optionally with region/country). \
After tool results are provided, summarize ONLY the current temperature in °F and location \
name in one short sentence.";

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    // Try common locations for .env relative to the workspace
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        // Workspace root, two levels up from crates/nimbus-app/
        manifest_dir.join("..").join("..").join(".env"),
        // Current directory
        std::path::PathBuf::from(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    load_dotenv();

    // Parse CLI arguments
    let args = cli::parse();

    // Initialize logging
    let log_directive = args.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "info".parse().unwrap()),
            ),
        )
        .init();

    let mut config = match OpenAiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(effort) = args.effort {
        config = config.with_reasoning_effort(effort);
    }

    tracing::info!(
        "Nimbus v{} starting (model: {})",
        env!("CARGO_PKG_VERSION"),
        config.model
    );

    let client = OpenAiClient::new(config);

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WeatherTool::new()));

    let mut session = Session::new("openai")
        .with_system_prompt(SYSTEM_PROMPT)
        .with_registry(Arc::new(registry));

    if let Err(e) = repl::run(&mut session, &client, !args.no_stream).await {
        tracing::error!("I/O error: {e}");
    }
}

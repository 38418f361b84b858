//! ytincome - estimate YouTube channel revenue from public statistics
//!
//! Runs a one-shot calculation, prints channel rankings, or serves the JSON API.

use std::io::IsTerminal;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use ytincome::cache::CacheManager;
use ytincome::cli::{parse_filters, Cli, Command};
use ytincome::data::YouTubeClient;
use ytincome::income::IncomeCalculator;
use ytincome::server::{self, ApiResponse};

/// Installs the log subscriber; logs go to stderr so stdout stays JSON
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

/// Prints an envelope as pretty JSON on stdout
fn print_envelope<T: Serialize>(envelope: &ApiResponse<T>) {
    match serde_json::to_string_pretty(envelope) {
        Ok(json) => println!("{}", json),
        Err(err) => tracing::error!(error = %err, "failed to serialize response"),
    }
}

/// Reports a failure in the envelope format and returns a failing exit code
fn fail(message: impl Into<String>) -> ExitCode {
    let message = message.into();
    tracing::error!("{}", message);
    print_envelope(&ApiResponse::<()>::failure(message));
    ExitCode::FAILURE
}

async fn run(cli: Cli) -> ExitCode {
    let config = match cli.config() {
        Ok(config) => config,
        Err(err) => return fail(err.to_string()),
    };

    let client = YouTubeClient::new(config.api_key.as_str()).with_base_url(config.base_url.as_str());
    let calculator = IncomeCalculator::new(client, CacheManager::new());

    match cli.command {
        Command::Calculate {
            channel_url,
            language,
        } => match calculator
            .calculate_channel_income(&channel_url, &language)
            .await
        {
            Ok(income) => {
                print_envelope(&ApiResponse::ok(income));
                ExitCode::SUCCESS
            }
            Err(err) => fail(err.to_string()),
        },
        Command::Serve { port } => {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            match server::serve(Arc::new(calculator), addr).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => fail(format!("Server error: {}", err)),
            }
        }
        Command::Rankings { filters } => {
            let query = match parse_filters(&filters) {
                Ok(query) => query,
                Err(err) => return fail(err.to_string()),
            };
            match calculator.channel_rankings(query).await {
                Ok(rankings) => {
                    print_envelope(&ApiResponse::ok(rankings));
                    ExitCode::SUCCESS
                }
                Err(err) => fail(err.to_string()),
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    run(cli).await
}

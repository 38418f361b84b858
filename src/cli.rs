//! Command-line interface parsing for ytincome
//!
//! This module handles parsing of CLI arguments using clap: a one-shot
//! `calculate` command, the `serve` HTTP boundary, and the `rankings` stub.

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Config;
use crate::income::DEFAULT_LANGUAGE;

/// Default port for `serve`
pub const DEFAULT_PORT: u16 = 3000;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A rankings filter was not written as KEY=VALUE
    #[error("Invalid filter: '{0}'. Expected KEY=VALUE")]
    InvalidFilter(String),
}

/// Estimate a YouTube channel's advertising revenue
#[derive(Parser, Debug)]
#[command(name = "ytincome")]
#[command(about = "Estimate YouTube channel revenue from public statistics")]
#[command(version)]
pub struct Cli {
    /// YouTube Data API key
    #[arg(long, global = true, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the YouTube Data API root URL
    #[arg(long, global = true, env = "YOUTUBE_API_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Estimate income for one channel and print the result as JSON
    ///
    /// Examples:
    ///   ytincome calculate https://www.youtube.com/@handle
    ///   ytincome calculate https://www.youtube.com/channel/UC... --language en
    Calculate {
        /// Channel URL (/channel/<id>, /@handle or /c/<name>)
        channel_url: String,
        /// Response language
        #[arg(long, default_value = DEFAULT_LANGUAGE)]
        language: String,
    },
    /// Serve the JSON API
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Print channel rankings for the given filters
    Rankings {
        /// Filters as KEY=VALUE pairs
        filters: Vec<String>,
    },
}

impl Cli {
    /// Validates the global options into a runtime configuration
    pub fn config(&self) -> crate::error::Result<Config> {
        Config::new(self.api_key.clone(), self.base_url.clone())
    }
}

/// Parses KEY=VALUE filters into a query map
///
/// # Returns
/// * `Ok(map)` with one entry per filter (later keys win)
/// * `Err(CliError::InvalidFilter)` for an argument without `=` or with an empty key
pub fn parse_filters(filters: &[String]) -> Result<BTreeMap<String, String>, CliError> {
    filters
        .iter()
        .map(|filter| match filter.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(CliError::InvalidFilter(filter.clone())),
        })
        .collect()
}

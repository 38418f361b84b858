//! Channel URL resolution
//!
//! Channel URLs come in three public shapes. Only `/channel/<id>` carries the
//! identifier; `/@handle` and `/c/<name>` are resolved through a channel search
//! with a best-effort title match.

use std::sync::LazyLock;

use regex::Regex;

use crate::data::{ChannelCandidate, ChannelId, StatisticsProvider};
use crate::error::{Error, Result};

/// Number of candidates requested from a channel search
pub const SEARCH_MAX_RESULTS: u32 = 5;

static CHANNEL_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/channel/([^/?#]+)").expect("valid regex"));
static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/@([^/?#]+)").expect("valid regex"));
static CUSTOM_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/c/([^/?#]+)").expect("valid regex"));

/// A recognized channel URL shape and the text it captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelUrl {
    /// `youtube.com/channel/<id>`
    Id(ChannelId),
    /// `youtube.com/@<handle>`
    Handle(String),
    /// `youtube.com/c/<name>`
    CustomName(String),
}

/// Returns every shape `url` matches, in resolution order
pub fn match_channel_url(url: &str) -> Vec<ChannelUrl> {
    let capture = |pattern: &Regex| {
        pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    };

    let mut matches = Vec::new();
    if let Some(id) = capture(&CHANNEL_ID_PATTERN) {
        matches.push(ChannelUrl::Id(ChannelId::new(id)));
    }
    if let Some(handle) = capture(&HANDLE_PATTERN) {
        matches.push(ChannelUrl::Handle(handle));
    }
    if let Some(name) = capture(&CUSTOM_NAME_PATTERN) {
        matches.push(ChannelUrl::CustomName(name));
    }
    matches
}

/// Picks the search candidate for `name`
///
/// A candidate titled exactly `name` or `@name` wins over result order;
/// otherwise the first candidate is used.
pub fn pick_candidate(name: &str, candidates: &[ChannelCandidate]) -> Option<ChannelId> {
    let prefixed = format!("@{}", name);
    candidates
        .iter()
        .find(|c| c.title == name || c.title == prefixed)
        .or_else(|| candidates.first())
        .map(|c| c.id.clone())
}

/// Resolves a user-supplied channel URL to a channel identifier
///
/// `/channel/<id>` URLs resolve without touching the provider. For name-based
/// shapes a failed or empty search moves on to the next matching shape.
///
/// # Errors
/// * `InvalidChannelUrl` if the URL matches no known shape (no provider calls)
/// * `ChannelLookup` if every name-based lookup came back empty or failed
pub async fn resolve_channel_id<P>(provider: &P, channel_url: &str) -> Result<ChannelId>
where
    P: StatisticsProvider + ?Sized,
{
    let decoded = urlencoding::decode(channel_url)
        .map_err(|_| Error::InvalidChannelUrl(channel_url.to_string()))?;
    tracing::debug!(url = %decoded, "resolving channel URL");

    let mut last_failure: Option<(String, String)> = None;

    for shape in match_channel_url(&decoded) {
        let name = match shape {
            ChannelUrl::Id(id) => return Ok(id),
            ChannelUrl::Handle(name) | ChannelUrl::CustomName(name) => name,
        };

        match provider.search_channels(&name, SEARCH_MAX_RESULTS).await {
            Ok(candidates) => match pick_candidate(&name, &candidates) {
                Some(id) => {
                    tracing::info!(query = %name, channel_id = %id, "resolved channel by search");
                    return Ok(id);
                }
                None => last_failure = Some((name, "no matching channels".to_string())),
            },
            Err(err) => {
                tracing::warn!(query = %name, error = %err, "channel search failed, trying next pattern");
                last_failure = Some((name, err.to_string()));
            }
        }
    }

    match last_failure {
        Some((query, reason)) => Err(Error::ChannelLookup { query, reason }),
        None => Err(Error::InvalidChannelUrl(decoded.into_owned())),
    }
}

use std::collections::HashSet;

use reqwest::Url;
use tracing::debug;

use crate::models::{Citation, Source};

pub const MAX_CITATIONS: usize = 3;
const FALLBACK_LABEL: &str = "Source";

/// Turns raw grounding sources into at most [`MAX_CITATIONS`] labelled links,
/// keeping upstream order and the first occurrence of each URL.
///
/// Only absolute `http`/`https` URLs survive; anything else would end up as a
/// clickable `href` in the client.
pub fn normalize_citations(sources: &[Source]) -> Vec<Citation> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .filter_map(|source| {
            let url = parse_web_url(&source.uri)?;
            if !seen.insert(url.as_str().to_string()) {
                return None;
            }
            Some(Citation {
                label: label_for(source.title.as_deref(), &url),
                url: url.into(),
            })
        })
        .take(MAX_CITATIONS)
        .collect()
}

fn parse_web_url(raw: &str) -> Option<Url> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Some(url),
        _ => {
            debug!("Dropping grounding source with unusable URL {raw:?}");
            None
        }
    }
}

fn label_for(title: Option<&str>, url: &Url) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => title.to_string(),
        None => url
            .host_str()
            .map(|host| host.strip_prefix("www.").unwrap_or(host))
            .filter(|host| !host.is_empty())
            .unwrap_or(FALLBACK_LABEL)
            .to_string(),
    }
}

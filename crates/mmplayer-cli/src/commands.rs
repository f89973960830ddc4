//! CLI command implementations

use crate::output::{self, OutputFormat};
use async_trait::async_trait;
use mmplayer_core::sync::active_captions;
use mmplayer_core::timecode::{self, format_time, parse_time};
use mmplayer_core::{CaptionFetcher, CaptionLoadOutcome, CaptionLoader, Error, HttpFetcher, WidgetConfig};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Caption fetcher for local files (`file://`) and remote documents
pub struct SourceFetcher {
    http: HttpFetcher,
}

impl SourceFetcher {
    pub fn new(config: &WidgetConfig) -> mmplayer_core::Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(Duration::from_millis(config.fetch_timeout_ms))?,
        })
    }
}

#[async_trait]
impl CaptionFetcher for SourceFetcher {
    async fn fetch(&self, url: &Url) -> mmplayer_core::Result<String> {
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| Error::Internal(format!("Not a local path: {}", url)))?;
            debug!(path = %path.display(), "Reading caption file");
            return Ok(tokio::fs::read_to_string(path).await?);
        }
        self.http.fetch(url).await
    }
}

/// Turn a path or URL argument into an absolute URL
pub fn source_url(source: &str) -> anyhow::Result<Url> {
    if source.contains("://") {
        return Ok(Url::parse(source)?);
    }

    let path = std::fs::canonicalize(Path::new(source))?;
    Url::from_file_path(&path).map_err(|_| anyhow::anyhow!("Cannot express {} as a URL", path.display()))
}

/// Read a position given as seconds or as a timecode
pub fn parse_position(text: &str) -> anyhow::Result<f64> {
    let seconds = match text.parse::<f64>() {
        Ok(seconds) => seconds,
        Err(_) => parse_time(Some(text)),
    };
    if !timecode::is_valid(seconds) {
        anyhow::bail!("Invalid position: {}", text);
    }
    Ok(seconds)
}

/// Format seconds as a timecode
pub fn time_format(seconds: f64, format: &str) -> anyhow::Result<()> {
    let formatted = format_time(seconds);
    match OutputFormat::from(format) {
        OutputFormat::Json => println!(
            "{}",
            output::to_json(&json!({ "seconds": seconds, "timecode": formatted }))?
        ),
        _ => println!("{}", formatted),
    }
    Ok(())
}

/// Parse a timecode into seconds
pub fn time_parse(text: &str, format: &str) -> anyhow::Result<()> {
    let seconds = parse_time(Some(text));
    if !timecode::is_valid(seconds) {
        anyhow::bail!("Invalid timecode: {}", text);
    }

    match OutputFormat::from(format) {
        OutputFormat::Json => println!(
            "{}",
            output::to_json(&json!({ "timecode": text, "seconds": seconds }))?
        ),
        _ => println!("{}", seconds),
    }
    Ok(())
}

/// Load a caption document and list its captions
pub async fn captions(
    source: &str,
    at: Option<&str>,
    config: &WidgetConfig,
    format: &str,
) -> anyhow::Result<()> {
    let url = source_url(source)?;
    let position = at.map(parse_position).transpose()?;

    let loader = CaptionLoader::new(Arc::new(SourceFetcher::new(config)?), config);
    let track = match loader.load_external(&url).await {
        CaptionLoadOutcome::Loaded(track) => track,
        CaptionLoadOutcome::Failed(e) => anyhow::bail!("Failed to load captions: {}", e),
    };

    let selected: Vec<_> = match position {
        Some(position) => active_captions(&track, position).collect(),
        None => track.iter().collect(),
    };

    let format = OutputFormat::from(format);
    if format == OutputFormat::Text {
        match position {
            Some(position) => println!(
                "{} of {} captions visible at {}",
                selected.len(),
                track.len(),
                format_time(position)
            ),
            None => println!("{} captions in {}", track.len(), url),
        }
    }
    println!("{}", output::captions(&selected, format)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("12.5").unwrap(), 12.5);
        assert_eq!(parse_position("0:01:30").unwrap(), 90.0);
        assert_eq!(parse_position("4s").unwrap(), 4.0);
        assert!(parse_position("soon").is_err());
    }

    #[test]
    fn test_remote_source_url() {
        let url = source_url("https://example.com/cc/en.html").unwrap();
        assert_eq!(url.scheme(), "https");
    }
}

//! Output formatting for CLI

use mmplayer_core::timecode::format_time;
use mmplayer_core::Caption;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Text,
        }
    }
}

/// Serialize as pretty JSON
pub fn to_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[derive(Tabled)]
struct CaptionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Begin")]
    begin: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Text")]
    text: String,
}

/// Render a caption list in the selected format
pub fn captions(captions: &[&Caption], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(&captions),
        OutputFormat::Table => {
            let rows = captions.iter().enumerate().map(|(i, c)| CaptionRow {
                index: i + 1,
                begin: format!("{} ({:.3}s)", format_time(c.begin()), c.begin()),
                end: format!("{} ({:.3}s)", format_time(c.end()), c.end()),
                text: c.text().to_string(),
            });
            let mut table = Table::new(rows);
            table.with(Style::modern());
            Ok(table.to_string())
        }
        OutputFormat::Text => Ok(captions
            .iter()
            .map(|c| {
                format!(
                    "{} --> {}  {}",
                    format_time(c.begin()),
                    format_time(c.end()),
                    c.text()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

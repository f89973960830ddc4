//! Core types for the media widget

use crate::backend::BackendKind;
use crate::i18n::ControlLabels;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

static WIDGET_SEED: AtomicU64 = AtomicU64::new(0);

/// Next generated widget id: `<prefix>1`, `<prefix>2`, ...
pub fn next_widget_id(prefix: &str) -> String {
    let n = WIDGET_SEED.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{}{}", prefix, n)
}

/// Audio or video element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// One `<source>` child of the media element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSourceInfo {
    pub src: String,
    /// MIME type, e.g. `video/mp4`
    pub mime: Option<String>,
}

/// What the host knows about the media element being wrapped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaElementInfo {
    /// Id of the widget container, if the page set one
    pub container_id: Option<String>,
    /// Id of the media element, if the page set one
    pub media_id: Option<String>,
    pub kind: MediaKind,
    pub width: Option<String>,
    pub height: Option<String>,
    pub poster: Option<String>,
    pub title: Option<String>,
    pub sources: Vec<MediaSourceInfo>,
    /// `src` of the first captions track
    pub caption_track: Option<String>,
}

impl MediaElementInfo {
    /// A bare element of the given kind
    pub fn new(kind: MediaKind) -> Self {
        Self {
            container_id: None,
            media_id: None,
            kind,
            width: None,
            height: None,
            poster: None,
            title: None,
            sources: Vec::new(),
            caption_track: None,
        }
    }

    /// First source with the given MIME type
    pub fn source_of_type(&self, mime: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.mime.as_deref() == Some(mime))
            .map(|s| s.src.as_str())
    }
}

/// Data object handed to the template renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    /// Widget id
    pub id: String,
    /// Media element id
    pub m_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaKind,
    pub width: String,
    pub height: String,
    /// Caption track source as declared on the element
    pub captions: Option<String>,
    pub backend: BackendKind,
    /// Plugin parameters, only for the fallback backend
    pub flashvars: Option<String>,
    #[serde(flatten)]
    pub labels: ControlLabels,
}

impl PlayerData {
    /// Build the data object for an element. Audio elements report a zero
    /// size.
    pub fn new(element: &MediaElementInfo, id_prefix: &str, labels: ControlLabels) -> Self {
        let id = element
            .container_id
            .clone()
            .unwrap_or_else(|| next_widget_id(id_prefix));
        let m_id = element
            .media_id
            .clone()
            .unwrap_or_else(|| format!("{}-media", id));

        let (width, height) = match element.kind {
            MediaKind::Video => (
                element.width.clone().unwrap_or_default(),
                element.height.clone().unwrap_or_default(),
            ),
            MediaKind::Audio => ("0".to_string(), "0".to_string()),
        };

        Self {
            id,
            m_id,
            media_type: element.kind,
            width,
            height,
            captions: element.caption_track.clone(),
            backend: BackendKind::Native,
            flashvars: None,
            labels,
        }
    }
}

/// Parameters passed to the fallback plugin
pub fn fallback_params(element: &MediaElementInfo, data: &PlayerData, base: &Url) -> String {
    let absolute = |src: Option<&str>| -> String {
        src.and_then(|s| base.join(s).ok())
            .map(|u| u.to_string())
            .unwrap_or_default()
    };

    let mut params = format!("id={}", data.m_id);
    match element.kind {
        MediaKind::Video => {
            params.push_str(&format!(
                "&height={}&width={}&posterimg={}&media={}",
                data.height,
                data.width,
                absolute(element.poster.as_deref()),
                absolute(element.source_of_type("video/mp4")),
            ));
        }
        MediaKind::Audio => {
            params.push_str(&format!(
                "&media={}",
                absolute(element.source_of_type("audio/mp3"))
            ));
        }
    }
    params
}

//! Playback backends
//!
//! A backend is the engine that actually plays the media: the native media
//! element, or a plugin-based fallback when native playback is unavailable.
//! The two expose the same capabilities under different shapes:
//!
//! | capability      | native element     | plugin fallback          |
//! |-----------------|--------------------|--------------------------|
//! | start / stop    | `play` / `pause`   | `doPlay` / `doPause`     |
//! | properties      | plain fields       | callable getters/setters |
//!
//! [`MediaBackend`] describes both shapes; every method a backend lacks has
//! a default that reports [`Error::MissingMethod`]. The player façade
//! (`crate::facade`) hides the differences.

mod reference;

pub use reference::{NativeElement, PlaybackClock, PluginObject, SharedClock};

use crate::types::PlayerData;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of backend drives a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Native,
    Fallback,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Native => write!(f, "native"),
            BackendKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// Media properties a backend may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaProperty {
    Paused,
    Ended,
    CurrentTime,
    Duration,
    Volume,
    Muted,
}

impl MediaProperty {
    pub const ALL: [MediaProperty; 6] = [
        MediaProperty::Paused,
        MediaProperty::Ended,
        MediaProperty::CurrentTime,
        MediaProperty::Duration,
        MediaProperty::Volume,
        MediaProperty::Muted,
    ];

    /// Property name as the backend spells it
    pub fn name(&self) -> &'static str {
        match self {
            MediaProperty::Paused => "paused",
            MediaProperty::Ended => "ended",
            MediaProperty::CurrentTime => "currentTime",
            MediaProperty::Duration => "duration",
            MediaProperty::Volume => "volume",
            MediaProperty::Muted => "muted",
        }
    }

    /// Name of the callable getter on backends that use methods
    pub fn getter_name(&self) -> &'static str {
        match self {
            MediaProperty::Paused => "getPaused",
            MediaProperty::Ended => "getEnded",
            MediaProperty::CurrentTime => "getCurrentTime",
            MediaProperty::Duration => "getDuration",
            MediaProperty::Volume => "getVolume",
            MediaProperty::Muted => "getMuted",
        }
    }

    /// Name of the callable setter on backends that use methods
    pub fn setter_name(&self) -> &'static str {
        match self {
            MediaProperty::Paused => "setPaused",
            MediaProperty::Ended => "setEnded",
            MediaProperty::CurrentTime => "setCurrentTime",
            MediaProperty::Duration => "setDuration",
            MediaProperty::Volume => "setVolume",
            MediaProperty::Muted => "setMuted",
        }
    }

    /// Look a property up by its noun, with or without a leading capital
    pub fn from_noun(noun: &str) -> Option<Self> {
        let mut chars = noun.chars();
        let first = chars.next()?;
        let name: String = std::iter::once(first.to_ascii_lowercase()).chain(chars).collect();

        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Properties that only the backend itself changes
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            MediaProperty::Paused | MediaProperty::Ended | MediaProperty::Duration
        )
    }
}

impl fmt::Display for MediaProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value crossing the façade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

/// How a backend exposes one property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Read and written through `call_get`/`call_set`
    Callable,
    /// Read and assigned directly through `field`/`set_field`
    Field,
}

/// The playback engine behind a widget
pub trait MediaBackend: Send {
    fn kind(&self) -> BackendKind;

    /// Native-style start
    fn play(&mut self) -> Result<()> {
        Err(Error::missing("play"))
    }

    /// Native-style stop
    fn pause(&mut self) -> Result<()> {
        Err(Error::missing("pause"))
    }

    /// Plugin-style start
    fn do_play(&mut self) -> Result<()> {
        Err(Error::missing("doPlay"))
    }

    /// Plugin-style stop
    fn do_pause(&mut self) -> Result<()> {
        Err(Error::missing("doPause"))
    }

    /// How `property` is exposed
    fn binding(&self, _property: MediaProperty) -> Binding {
        Binding::Field
    }

    fn call_get(&mut self, property: MediaProperty) -> Result<Value> {
        Err(Error::missing(property.getter_name()))
    }

    fn call_set(&mut self, property: MediaProperty, _value: Value) -> Result<()> {
        Err(Error::missing(property.setter_name()))
    }

    /// Plain property read; `None` when the backend has no such property
    fn field(&self, property: MediaProperty) -> Option<Value>;

    /// Plain property assignment
    fn set_field(&mut self, property: MediaProperty, value: Value);
}

/// Live state of the host media element, sampled once at attach
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaProbe {
    /// The element reported a media error
    pub has_error: bool,
    /// Source the element selected, if any
    pub current_src: Option<String>,
}

/// Pick the backend for an element: native playback needs an error-free
/// element with a selected source.
pub fn detect_backend(probe: &MediaProbe) -> BackendKind {
    let has_source = probe
        .current_src
        .as_deref()
        .map(|src| !src.is_empty())
        .unwrap_or(false);

    if !probe.has_error && has_source {
        BackendKind::Native
    } else {
        BackendKind::Fallback
    }
}

/// Host hook that samples the media element and builds backends
pub trait BackendProvider {
    /// Sample the element's live state
    fn probe(&self) -> MediaProbe;

    /// Build the backend of the selected kind
    fn create(&mut self, kind: BackendKind, data: &PlayerData) -> Result<Box<dyn MediaBackend>>;
}

//! Localized control labels
//!
//! The widget never reaches for a global string table. A [`Localizer`] is
//! handed to it at construction and resolved once into [`ControlLabels`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// String lookup service keyed by short tokens
pub trait Localizer: Send + Sync {
    /// Label for `token`, optionally qualified by a state such as `on`/`off`
    fn lookup(&self, token: &str, state: Option<&str>) -> String;
}

/// Labels used by the control bar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLabels {
    pub rewind: String,
    pub ff: String,
    pub play: String,
    pub pause: String,
    pub cc_on: String,
    pub cc_off: String,
    pub cc_error: String,
    pub mute_on: String,
    pub mute_off: String,
    pub duration: String,
    pub position: String,
}

impl ControlLabels {
    /// Resolve every label once
    pub fn resolve(localizer: &dyn Localizer) -> Self {
        Self {
            rewind: localizer.lookup("rew", None),
            ff: localizer.lookup("ffwd", None),
            play: localizer.lookup("play", None),
            pause: localizer.lookup("pause", None),
            cc_on: localizer.lookup("cc", Some("on")),
            cc_off: localizer.lookup("cc", Some("off")),
            cc_error: localizer.lookup("cc-err", None),
            mute_on: localizer.lookup("mute", Some("on")),
            mute_off: localizer.lookup("mute", Some("off")),
            duration: localizer.lookup("dur", None),
            position: localizer.lookup("pos", None),
        }
    }
}

/// In-memory string table. Qualified entries use `token/state` keys.
/// Unknown tokens resolve to the key itself.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// English labels
    pub fn english() -> Self {
        [
            ("rew", "Rewind"),
            ("ffwd", "Fast forward"),
            ("play", "Play"),
            ("pause", "Pause"),
            ("cc/on", "Hide closed captioning"),
            ("cc/off", "Show closed captioning"),
            ("cc-err", "Error loading closed captioning"),
            ("mute/on", "Mute"),
            ("mute/off", "Unmute"),
            ("dur", "Total time"),
            ("pos", "Current position"),
        ]
        .into_iter()
        .fold(Self::new(), |catalog, (key, label)| catalog.with(key, label))
    }

    /// Add or replace an entry
    pub fn with(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.entries.insert(key.into(), label.into());
        self
    }
}

impl Localizer for StaticCatalog {
    fn lookup(&self, token: &str, state: Option<&str>) -> String {
        let key = match state {
            Some(state) => format!("{}/{}", token, state),
            None => token.to_string(),
        };
        self.entries.get(&key).cloned().unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_english() {
        let labels = ControlLabels::resolve(&StaticCatalog::english());
        assert_eq!(labels.play, "Play");
        assert_eq!(labels.cc_off, "Show closed captioning");
        assert_eq!(labels.cc_error, "Error loading closed captioning");
    }

    #[test]
    fn test_unknown_token_falls_back_to_key() {
        let catalog = StaticCatalog::new().with("play", "Lire");
        assert_eq!(catalog.lookup("play", None), "Lire");
        assert_eq!(catalog.lookup("mute", Some("on")), "mute/on");
    }
}

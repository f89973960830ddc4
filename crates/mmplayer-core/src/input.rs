//! Mouse and keyboard input

use regex::Regex;
use std::sync::OnceLock;

/// A control inside the widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlTarget {
    /// Play/pause button or the click-to-play overlay
    PlayPause,
    /// Caption toggle
    Captions,
    /// Mute toggle
    Mute,
    /// Progress bar, clicked at `fraction` of its width
    Progress { fraction: f64 },
    Rewind,
    FastForward,
    /// Anything else
    Other,
}

impl ControlTarget {
    /// Classify a control from its class attribute. `fraction` is where a
    /// progress bar click landed.
    pub fn from_class_name(class_name: &str, fraction: f64) -> Self {
        static PATTERNS: OnceLock<[Regex; 5]> = OnceLock::new();
        let [play_pause, captions, mute, rewind, fast_forward] = PATTERNS.get_or_init(|| {
            [
                r"playpause|-(play|pause)|wb-mm-ovrly",
                r"\bcc\b|-subtitles",
                r"\bmute\b|-volume-(up|off)",
                r"\brewind\b|-backwards",
                r"\bfastforward\b|-forward",
            ]
            .map(|p| Regex::new(p).expect("control pattern is valid"))
        });

        if play_pause.is_match(class_name) {
            ControlTarget::PlayPause
        } else if captions.is_match(class_name) {
            ControlTarget::Captions
        } else if mute.is_match(class_name) {
            ControlTarget::Mute
        } else if class_name.contains("wb-progress-inner") || class_name.contains("wb-progress-outer") {
            ControlTarget::Progress {
                fraction: fraction.clamp(0.0, 1.0),
            }
        } else if rewind.is_match(class_name) {
            ControlTarget::Rewind
        } else if fast_forward.is_match(class_name) {
            ControlTarget::FastForward
        } else {
            ControlTarget::Other
        }
    }
}

/// Mouse button of a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

/// Keys the widget reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Left,
    Right,
    Up,
    Down,
    Other,
}

impl Key {
    /// Map a legacy key code
    pub fn from_code(code: u32) -> Self {
        match code {
            32 => Key::Space,
            37 => Key::Left,
            38 => Key::Up,
            39 => Key::Right,
            40 => Key::Down,
            _ => Key::Other,
        }
    }
}

/// Input delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    Click {
        target: ControlTarget,
        button: MouseButton,
    },
    KeyDown(Key),
    KeyUp(Key),
}

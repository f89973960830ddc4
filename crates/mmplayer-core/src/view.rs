//! Visual-update collaborator
//!
//! The widget decides *what* changes; a [`View`] applies it to whatever
//! markup the template renderer produced.

use crate::sync::{CaptionArea, CaptionLines};
use crate::types::PlayerData;
use serde::Serialize;

/// Renders the widget markup from its data object
pub trait TemplateRenderer {
    fn render(&self, data: &PlayerData) -> String;
}

/// One visual change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewUpdate {
    /// Play/pause button icon and tooltip
    PlayButton { playing: bool, title: String },
    /// Click-to-play overlay
    Overlay { playing: bool },
    /// Progress bar animation
    ProgressActive(bool),
    /// Progress bar value in percent, one decimal
    ProgressValue(f64),
    /// Current position label
    CurrentTime(String),
    /// Total duration label
    TotalTime(String),
    /// Mute button icon and tooltip
    MuteButton { muted: bool, title: String },
    /// Caption button tooltip and emphasis
    CaptionButton { visible: bool, title: String },
    /// Caption loading failed: show the message, disable the toggle
    CaptionsUnavailable { message: String },
    /// Waiting-for-data indicator
    Waiting(bool),
}

/// The rendered widget
pub trait View {
    /// Apply one visual change
    fn apply(&mut self, update: ViewUpdate);

    /// The caption overlay
    fn caption_area(&mut self) -> &mut dyn CaptionArea;
}

/// View that records every update; useful headless and in tests
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub updates: Vec<ViewUpdate>,
    pub captions: CaptionLines,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain recorded updates
    pub fn take_updates(&mut self) -> Vec<ViewUpdate> {
        std::mem::take(&mut self.updates)
    }
}

impl View for RecordingView {
    fn apply(&mut self, update: ViewUpdate) {
        self.updates.push(update);
    }

    fn caption_area(&mut self) -> &mut dyn CaptionArea {
        &mut self.captions
    }
}

//! Playback lifecycle events

use crate::captions::CaptionTrack;
use crate::loader::CaptionLoadOutcome;
use crate::Error;
use std::fmt;
use std::sync::Arc;

/// Events delivered to a widget, by the backend, the host or the widget
/// itself
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// Media duration became known or changed
    DurationChange,
    /// Playback started
    Play,
    /// Playback paused
    Pause,
    /// Playback reached the end
    Ended,
    /// Volume or mute changed
    VolumeChange,
    /// Periodic position tick
    TimeUpdate,
    /// Periodic download progress tick
    Progress,
    /// Playback is waiting for data
    Waiting,
    /// Enough data to resume playback
    CanPlay,
    /// The caption track is available
    CaptionsLoaded(CaptionTrack),
    /// The external caption document could not be retrieved
    CaptionsLoadFailed(Arc<Error>),
    /// The caption overlay was shown or hidden
    CaptionsVisibleChange,
}

impl PlayerEvent {
    /// Event name as the host's event system spells it
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::DurationChange => "durationchange",
            PlayerEvent::Play => "play",
            PlayerEvent::Pause => "pause",
            PlayerEvent::Ended => "ended",
            PlayerEvent::VolumeChange => "volumechange",
            PlayerEvent::TimeUpdate => "timeupdate",
            PlayerEvent::Progress => "progress",
            PlayerEvent::Waiting => "waiting",
            PlayerEvent::CanPlay => "canplay",
            PlayerEvent::CaptionsLoaded(_) => "captionsloaded",
            PlayerEvent::CaptionsLoadFailed(_) => "captionsloadfailed",
            PlayerEvent::CaptionsVisibleChange => "captionsvisiblechange",
        }
    }

    /// Parse a payload-free event name
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "durationchange" => PlayerEvent::DurationChange,
            "play" => PlayerEvent::Play,
            "pause" => PlayerEvent::Pause,
            "ended" => PlayerEvent::Ended,
            "volumechange" => PlayerEvent::VolumeChange,
            "timeupdate" => PlayerEvent::TimeUpdate,
            "progress" => PlayerEvent::Progress,
            "waiting" => PlayerEvent::Waiting,
            "canplay" => PlayerEvent::CanPlay,
            "captionsvisiblechange" => PlayerEvent::CaptionsVisibleChange,
            _ => return None,
        })
    }
}

impl fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<CaptionLoadOutcome> for PlayerEvent {
    fn from(outcome: CaptionLoadOutcome) -> Self {
        match outcome {
            CaptionLoadOutcome::Loaded(track) => PlayerEvent::CaptionsLoaded(track),
            CaptionLoadOutcome::Failed(error) => PlayerEvent::CaptionsLoadFailed(error),
        }
    }
}

//! MMPlayer Core - Accessible Media Player Library
//!
//! This crate provides the playback-independent core of an accessible media
//! player widget:
//! - Timecode parsing and formatting
//! - Caption parsing from inline HTML and TTML-like documents
//! - Internal and external caption loading
//! - Caption synchronization with the playback position
//! - A uniform player façade over native and plugin backends
//! - Buffering detection for backends without waiting events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         MMPlayer Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │   Caption    │  │   Caption    │  │   Timecode   │           │
//! │  │   Loader     │──│   Parsers    │──│    Codec     │           │
//! │  └──────┬───────┘  └──────────────┘  └──────────────┘           │
//! │         │                                                       │
//! │  ┌──────┴───────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Media     │──│    Player    │──│   Backend    │           │
//! │  │    Widget    │  │    Façade    │  │ Native/Plugin│           │
//! │  └──────┬───────┘  └──────────────┘  └──────────────┘           │
//! │         │                                                       │
//! │  ┌──────┴───────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │     View     │  │   Caption    │  │  Buffering   │           │
//! │  │   Updates    │  │    Sync      │  │  Heuristic   │           │
//! │  └──────────────┘  └──────────────┘  └──────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod timecode;
pub mod captions;
pub mod sync;
pub mod config;
pub mod loader;
pub mod backend;
pub mod i18n;
pub mod facade;
pub mod events;
pub mod buffering;
pub mod view;
pub mod input;
pub mod widget;

pub use error::{Error, Result};
pub use types::*;
pub use timecode::{format_time, parse_time};
pub use captions::{Caption, CaptionTrack, InlineParser, TtmlParser};
pub use config::WidgetConfig;
pub use loader::{CaptionFetcher, CaptionLoader, CaptionLoadOutcome, CaptionSource, HostDocument, HttpFetcher};
pub use backend::{BackendKind, BackendProvider, MediaBackend, MediaProbe, MediaProperty, Value};
pub use i18n::{ControlLabels, Localizer, StaticCatalog};
pub use facade::{PlayerCall, PlayerFacade, PlayerProperty};
pub use events::PlayerEvent;
pub use view::{RecordingView, TemplateRenderer, View, ViewUpdate};
pub use input::{ControlTarget, Key, MouseButton, UiEvent};
pub use widget::{MediaWidget, WidgetEnv};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "MMPlayer Core initialized");
}

//! Headless playback simulation
//!
//! Attaches a media widget to a reference backend, plays it tick by tick
//! and prints every visual update the widget makes.

use crate::commands::{source_url, SourceFetcher};
use crate::output::{self, OutputFormat};
use mmplayer_core::backend::{NativeElement, PlaybackClock, PluginObject, SharedClock};
use mmplayer_core::sync::{CaptionArea, CaptionLines};
use mmplayer_core::timecode::format_duration;
use mmplayer_core::{
    BackendKind, BackendProvider, HostDocument, Key, MediaBackend, MediaElementInfo, MediaKind,
    MediaProbe, MediaSourceInfo, MediaWidget, PlayerData, PlayerEvent, StaticCatalog,
    TemplateRenderer, UiEvent, View, ViewUpdate, WidgetConfig, WidgetEnv,
};
use serde_json::json;
use std::ops::RangeInclusive;
use std::sync::{Arc, PoisonError};
use tracing::{debug, info};
use url::Url;

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub duration: f64,
    pub tick: f64,
    pub ticks: usize,
    pub fallback: bool,
    pub captions: Option<String>,
    pub stall: Option<RangeInclusive<usize>>,
}

/// Parse `10-14` or `10` into a tick range
pub fn parse_tick_range(text: &str) -> anyhow::Result<RangeInclusive<usize>> {
    let (start, end) = match text.split_once('-') {
        Some((start, end)) => (start.trim().parse()?, end.trim().parse()?),
        None => {
            let tick = text.trim().parse()?;
            (tick, tick)
        }
    };
    if start > end {
        anyhow::bail!("Empty tick range: {}", text);
    }
    Ok(start..=end)
}

/// Builds reference backends over a shared clock
struct ReferenceProvider {
    clock: SharedClock,
    fallback: bool,
}

impl BackendProvider for ReferenceProvider {
    fn probe(&self) -> MediaProbe {
        if self.fallback {
            MediaProbe {
                has_error: true,
                current_src: None,
            }
        } else {
            MediaProbe {
                has_error: false,
                current_src: Some("simulated.mp4".into()),
            }
        }
    }

    fn create(&mut self, kind: BackendKind, data: &PlayerData) -> mmplayer_core::Result<Box<dyn MediaBackend>> {
        debug!(kind = %kind, flashvars = ?data.flashvars, "Creating reference backend");
        Ok(match kind {
            BackendKind::Native => Box::new(NativeElement::new(self.clock.clone())),
            BackendKind::Fallback => Box::new(PluginObject::new(self.clock.clone())),
        })
    }
}

/// Renders the player data object as JSON in place of real markup
struct JsonTemplate;

impl TemplateRenderer for JsonTemplate {
    fn render(&self, data: &PlayerData) -> String {
        serde_json::to_string(data).unwrap_or_default()
    }
}

/// View printing each update on its own line
struct ConsoleView {
    format: OutputFormat,
    tick: usize,
    captions: CaptionLines,
    shown: Vec<String>,
}

impl ConsoleView {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tick: 0,
            captions: CaptionLines::new(),
            shown: Vec::new(),
        }
    }

    /// Print the caption overlay if it changed since the last flush
    fn flush_captions(&mut self) {
        if self.captions.lines() == self.shown.as_slice() {
            return;
        }
        self.shown = self.captions.lines().to_vec();

        match self.format {
            OutputFormat::Json => println!("{}", json!({ "tick": self.tick, "captions": self.shown })),
            _ => println!("[{:>4}] captions: {}", self.tick, self.captions.to_html()),
        }
    }
}

impl View for ConsoleView {
    fn apply(&mut self, update: ViewUpdate) {
        match self.format {
            OutputFormat::Json => println!("{}", json!({ "tick": self.tick, "update": update })),
            _ => println!("[{:>4}] {:?}", self.tick, update),
        }
    }

    fn caption_area(&mut self) -> &mut dyn CaptionArea {
        &mut self.captions
    }
}

/// Run a simulation
pub async fn run(options: SimulationOptions, config: &WidgetConfig, format: &str) -> anyhow::Result<()> {
    let format = OutputFormat::from(format);
    let clock = PlaybackClock::shared(options.duration);
    let mut provider = ReferenceProvider {
        clock: clock.clone(),
        fallback: options.fallback,
    };

    let document_url = Url::from_directory_path(std::env::current_dir()?)
        .map_err(|_| anyhow::anyhow!("Working directory is not an absolute path"))?;
    let caption_track = options
        .captions
        .as_deref()
        .map(source_url)
        .transpose()?
        .map(|url| url.to_string());

    let element = MediaElementInfo {
        container_id: Some("simulation".into()),
        width: Some("640".into()),
        height: Some("360".into()),
        sources: vec![MediaSourceInfo {
            src: "simulated.mp4".into(),
            mime: Some("video/mp4".into()),
        }],
        caption_track,
        ..MediaElementInfo::new(MediaKind::Video)
    };

    let catalog = StaticCatalog::english();
    let env = WidgetEnv {
        document: HostDocument::new(document_url, ""),
        config,
        localizer: &catalog,
        renderer: &JsonTemplate,
        fetcher: Arc::new(SourceFetcher::new(config)?),
    };

    let mut widget = MediaWidget::attach(&element, env, &mut provider, ConsoleView::new(format))?;
    debug!(markup = widget.markup(), "Template rendered");

    if widget.captions_pending() {
        widget.wait_for_captions().await;
    }
    if format == OutputFormat::Json {
        println!("{}", output::to_json(widget.data())?);
    }

    info!(
        backend = %widget.backend_kind(),
        duration = %format_duration(options.duration),
        captions = widget.captions().map(|c| c.len()).unwrap_or(0),
        "Simulation started"
    );

    widget.handle_event(PlayerEvent::DurationChange);
    widget.handle_ui(UiEvent::KeyDown(Key::Space));
    widget.handle_event(PlayerEvent::Play);

    for tick in 1..=options.ticks {
        widget.view_mut().tick = tick;
        let stalled = options.stall.as_ref().is_some_and(|range| range.contains(&tick));

        let ended = {
            let mut clock = clock.lock().unwrap_or_else(PoisonError::into_inner);
            clock.set_stalled(stalled);
            clock.advance(options.tick);
            clock.ended()
        };

        widget.handle_event(PlayerEvent::TimeUpdate);
        widget.view_mut().flush_captions();
        widget.handle_event(PlayerEvent::Progress);

        if ended {
            widget.handle_event(PlayerEvent::Ended);
            break;
        }
    }

    widget.teardown();
    info!("Simulation finished");
    Ok(())
}

//! Media widget
//!
//! Attaches to a host media element, owns the [`PlayerFacade`] for the
//! selected backend and routes every input and lifecycle event through two
//! entry points: [`MediaWidget::handle_ui`] for mouse/keyboard input and
//! [`MediaWidget::handle_event`] for playback lifecycle events.
//!
//! External captions are fetched on a spawned task. The outcome comes back
//! over a channel and is applied by [`MediaWidget::poll_captions`] or
//! [`MediaWidget::wait_for_captions`]; tearing the widget down aborts the
//! task and discards anything it would still deliver.

use crate::backend::{detect_backend, BackendKind, BackendProvider, Value};
use crate::buffering::{progress_tick, BufferingTransition};
use crate::captions::CaptionTrack;
use crate::config::WidgetConfig;
use crate::events::PlayerEvent;
use crate::facade::{PlayerCall, PlayerFacade};
use crate::i18n::{ControlLabels, Localizer};
use crate::input::{ControlTarget, Key, MouseButton, UiEvent};
use crate::loader::{CaptionFetcher, CaptionLoadOutcome, CaptionLoader, CaptionSource, HostDocument};
use crate::sync;
use crate::timecode::format_time;
use crate::types::{fallback_params, MediaElementInfo, PlayerData};
use crate::view::{TemplateRenderer, View, ViewUpdate};
use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Collaborators and settings shared by widgets on one page
pub struct WidgetEnv<'a> {
    pub document: HostDocument,
    pub config: &'a WidgetConfig,
    pub localizer: &'a dyn Localizer,
    pub renderer: &'a dyn TemplateRenderer,
    pub fetcher: Arc<dyn CaptionFetcher>,
}

/// An external caption fetch in flight
struct PendingCaptions {
    alive: Arc<AtomicBool>,
    task: JoinHandle<()>,
    outcome_rx: mpsc::Receiver<CaptionLoadOutcome>,
}

/// A media player widget bound to one media element
pub struct MediaWidget<V: View> {
    data: PlayerData,
    markup: String,
    player: PlayerFacade,
    labels: ControlLabels,
    seek_step_ratio: f64,
    volume_step: f64,
    view: V,
    captions: Option<CaptionTrack>,
    captions_disabled: bool,
    pending: Option<PendingCaptions>,
}

impl<V: View> MediaWidget<V> {
    /// Attach a widget to `element`: pick the backend, render the template
    /// and start loading captions if the element declares a track.
    ///
    /// External captions are fetched on the current tokio runtime.
    pub fn attach(
        element: &MediaElementInfo,
        env: WidgetEnv<'_>,
        provider: &mut dyn BackendProvider,
        view: V,
    ) -> Result<Self> {
        env.config.validate()?;

        let labels = ControlLabels::resolve(env.localizer);
        let mut data = PlayerData::new(element, &env.config.id_prefix, labels.clone());

        let kind = detect_backend(&provider.probe());
        data.backend = kind;
        if kind == BackendKind::Fallback {
            data.flashvars = Some(fallback_params(element, &data, &env.document.url));
        }

        let markup = env.renderer.render(&data);
        let backend = provider.create(kind, &data)?;

        info!(id = %data.id, media = %data.media_type, backend = %kind, "Media widget attached");

        let mut widget = Self {
            markup,
            player: PlayerFacade::new(backend),
            labels,
            seek_step_ratio: env.config.seek_step_ratio,
            volume_step: env.config.volume_step,
            view,
            captions: None,
            captions_disabled: false,
            pending: None,
            data,
        };

        if let Some(track_src) = element.caption_track.clone() {
            widget.start_caption_load(&track_src, env)?;
        }

        Ok(widget)
    }

    fn start_caption_load(&mut self, track_src: &str, env: WidgetEnv<'_>) -> Result<()> {
        let loader = CaptionLoader::new(env.fetcher, env.config);

        let source = match CaptionSource::resolve(track_src, &env.document.url) {
            Ok(source) => source,
            Err(e) => {
                warn!(src = track_src, error = %e, "Caption track source is not a valid URL");
                self.handle_event(PlayerEvent::CaptionsLoadFailed(Arc::new(e)));
                return Ok(());
            }
        };

        match source {
            CaptionSource::Embedded { fragment } => {
                let outcome = loader.load_internal(&env.document, fragment.as_deref());
                self.handle_event(outcome.into());
            }
            CaptionSource::External { url } => {
                let runtime = tokio::runtime::Handle::try_current()
                    .map_err(|e| Error::Internal(format!("No async runtime for caption fetch: {}", e)))?;

                let alive = Arc::new(AtomicBool::new(true));
                let (outcome_tx, outcome_rx) = mpsc::channel(1);
                let task_alive = alive.clone();

                let task = runtime.spawn(async move {
                    let outcome = loader.load_external(&url).await;
                    if task_alive.load(Ordering::Acquire) {
                        let _ = outcome_tx.send(outcome).await;
                    } else {
                        debug!(url = %url, "Widget torn down, discarding caption outcome");
                    }
                });

                self.pending = Some(PendingCaptions {
                    alive,
                    task,
                    outcome_rx,
                });
            }
        }
        Ok(())
    }

    /// Apply the caption outcome if the fetch has finished. Returns `true`
    /// if an outcome was applied.
    pub fn poll_captions(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        match pending.outcome_rx.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                self.handle_event(outcome.into());
                true
            }
            Err(mpsc::error::TryRecvError::Empty) => false,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.pending = None;
                false
            }
        }
    }

    /// Wait for the caption fetch and apply its outcome. Returns `false` if
    /// no fetch is pending.
    pub async fn wait_for_captions(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        let outcome = pending.outcome_rx.recv().await;
        self.pending = None;
        match outcome {
            Some(outcome) => {
                self.handle_event(outcome.into());
                true
            }
            None => false,
        }
    }

    /// Whether an external caption fetch is still in flight
    pub fn captions_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Stop the widget. A caption fetch still in flight is aborted and its
    /// outcome discarded.
    pub fn teardown(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.alive.store(false, Ordering::Release);
            pending.task.abort();
            debug!(id = %self.data.id, "Aborted pending caption fetch");
        }
    }

    /// Handle mouse/keyboard input. Returns `true` if the input was consumed
    /// and the host should suppress its default action.
    pub fn handle_ui(&mut self, event: UiEvent) -> bool {
        let consumed = match event {
            UiEvent::Click { button, .. } if button != MouseButton::Primary => false,
            UiEvent::Click { target, .. } => self.activate(target),
            UiEvent::KeyDown(key) => match key {
                Key::Space => self.activate(ControlTarget::PlayPause),
                Key::Left => self.activate(ControlTarget::Rewind),
                Key::Right => self.activate(ControlTarget::FastForward),
                Key::Up => self.step_volume(self.volume_step),
                Key::Down => self.step_volume(-self.volume_step),
                Key::Other => false,
            },
            UiEvent::KeyUp(key) => key == Key::Space,
        };

        self.drain_player_events();
        consumed
    }

    fn activate(&mut self, target: ControlTarget) -> bool {
        let result = match target {
            ControlTarget::PlayPause => {
                if self.player.paused() {
                    self.player.play()
                } else {
                    self.player.pause()
                }
            }
            ControlTarget::Captions if self.captions_disabled => return false,
            ControlTarget::Captions => {
                let visible = !self.player.captions_visible();
                self.player.set_captions_visible(visible);
                Ok(())
            }
            ControlTarget::Mute => {
                let muted = !self.player.muted();
                self.player.set_muted(muted)
            }
            ControlTarget::Progress { fraction } => {
                let duration = self.player.duration();
                self.player.set_current_time(duration * fraction)
            }
            ControlTarget::Rewind => self.seek_by(-1.0),
            ControlTarget::FastForward => self.seek_by(1.0),
            ControlTarget::Other => return false,
        };

        if let Err(e) = result {
            warn!(id = %self.data.id, control = ?target, error = %e, "Control action failed");
        }
        true
    }

    fn seek_by(&mut self, direction: f64) -> Result<()> {
        let step = self.player.duration() * self.seek_step_ratio;
        let position = self.player.current_time() + direction * step;
        self.player.set_current_time(position)
    }

    fn step_volume(&mut self, delta: f64) -> bool {
        let volume = (self.player.volume() * 10.0).round() / 10.0 + delta;
        if let Err(e) = self.player.set_volume(volume.clamp(0.0, 1.0)) {
            warn!(id = %self.data.id, error = %e, "Volume change failed");
        }
        true
    }

    /// Dispatch a façade call, then apply the events it raised
    pub fn call(&mut self, call: PlayerCall) -> Result<Option<Value>> {
        let result = self.player.invoke(call);
        self.drain_player_events();
        result
    }

    /// Apply one lifecycle event to the view
    pub fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Play => {
                self.view.apply(ViewUpdate::PlayButton {
                    playing: true,
                    title: self.labels.pause.clone(),
                });
                self.view.apply(ViewUpdate::Overlay { playing: true });
                self.view.apply(ViewUpdate::ProgressActive(true));
            }
            PlayerEvent::Pause => {
                self.view.apply(ViewUpdate::PlayButton {
                    playing: false,
                    title: self.labels.play.clone(),
                });
                self.view.apply(ViewUpdate::ProgressActive(false));
            }
            PlayerEvent::Ended => {
                self.view.apply(ViewUpdate::PlayButton {
                    playing: false,
                    title: self.labels.play.clone(),
                });
                self.view.apply(ViewUpdate::Overlay { playing: false });
            }
            PlayerEvent::VolumeChange => {
                let muted = self.player.muted();
                let title = if muted {
                    self.labels.mute_off.clone()
                } else {
                    self.labels.mute_on.clone()
                };
                self.view.apply(ViewUpdate::MuteButton { muted, title });
            }
            PlayerEvent::TimeUpdate => {
                let position = self.player.current_time();
                let percent = (position / self.player.duration() * 1000.0).round() / 10.0;
                if percent.is_finite() {
                    self.view.apply(ViewUpdate::ProgressValue(percent));
                }
                self.view.apply(ViewUpdate::CurrentTime(format_time(position)));

                if let Some(captions) = &self.captions {
                    sync::render(self.view.caption_area(), position, captions);
                }
            }
            PlayerEvent::DurationChange => {
                let duration = self.player.duration();
                self.view.apply(ViewUpdate::TotalTime(format_time(duration)));
            }
            PlayerEvent::CaptionsLoaded(track) => {
                debug!(id = %self.data.id, count = track.len(), "Captions stored");
                self.captions = Some(track);
            }
            PlayerEvent::CaptionsLoadFailed(error) => {
                warn!(id = %self.data.id, error = %error, "Captions unavailable");
                self.captions_disabled = true;
                self.view.apply(ViewUpdate::CaptionsUnavailable {
                    message: self.labels.cc_error.clone(),
                });
            }
            PlayerEvent::CaptionsVisibleChange => {
                let visible = self.player.captions_visible();
                let title = if visible {
                    self.labels.cc_on.clone()
                } else {
                    self.labels.cc_off.clone()
                };
                self.view.apply(ViewUpdate::CaptionButton { visible, title });
            }
            PlayerEvent::Waiting => self.view.apply(ViewUpdate::Waiting(true)),
            PlayerEvent::CanPlay => self.view.apply(ViewUpdate::Waiting(false)),
            PlayerEvent::Progress => {
                if let Some(transition) = progress_tick(&mut self.player) {
                    self.handle_event(match transition {
                        BufferingTransition::Waiting => PlayerEvent::Waiting,
                        BufferingTransition::Ready => PlayerEvent::CanPlay,
                    });
                }
            }
        }

        self.drain_player_events();
    }

    fn drain_player_events(&mut self) {
        for event in self.player.take_events() {
            self.handle_event(event);
        }
    }

    /// Data object handed to the template renderer
    pub fn data(&self) -> &PlayerData {
        &self.data
    }

    /// Markup produced by the template renderer
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.player.backend_kind()
    }

    /// Whether caption loading failed and the toggle is disabled
    pub fn captions_disabled(&self) -> bool {
        self.captions_disabled
    }

    /// Loaded captions, `None` until a track has loaded
    pub fn captions(&self) -> Option<&CaptionTrack> {
        self.captions.as_ref()
    }

    pub fn player(&mut self) -> &mut PlayerFacade {
        &mut self.player
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

impl<V: View> Drop for MediaWidget<V> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MediaBackend, MediaProbe, NativeElement, PlaybackClock, PluginObject, SharedClock};
    use crate::i18n::StaticCatalog;
    use crate::types::{MediaKind, MediaSourceInfo};
    use crate::view::RecordingView;
    use async_trait::async_trait;
    use url::Url;

    struct NoFetch;

    #[async_trait]
    impl CaptionFetcher for NoFetch {
        async fn fetch(&self, url: &Url) -> Result<String> {
            Err(Error::CaptionStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    struct IdRenderer;

    impl TemplateRenderer for IdRenderer {
        fn render(&self, data: &PlayerData) -> String {
            format!("<div id=\"{}\"></div>", data.id)
        }
    }

    struct ClockProvider {
        probe: MediaProbe,
        clock: SharedClock,
    }

    impl BackendProvider for ClockProvider {
        fn probe(&self) -> MediaProbe {
            self.probe.clone()
        }

        fn create(&mut self, kind: BackendKind, _data: &PlayerData) -> Result<Box<dyn MediaBackend>> {
            Ok(match kind {
                BackendKind::Native => Box::new(NativeElement::new(self.clock.clone())),
                BackendKind::Fallback => Box::new(PluginObject::new(self.clock.clone())),
            })
        }
    }

    fn element() -> MediaElementInfo {
        MediaElementInfo {
            container_id: Some("demo".into()),
            sources: vec![MediaSourceInfo {
                src: "clip.mp4".into(),
                mime: Some("video/mp4".into()),
            }],
            ..MediaElementInfo::new(MediaKind::Video)
        }
    }

    fn attach(probe: MediaProbe) -> (MediaWidget<RecordingView>, SharedClock) {
        let clock = PlaybackClock::shared(100.0);
        let mut provider = ClockProvider {
            probe,
            clock: clock.clone(),
        };
        let config = WidgetConfig::default();
        let catalog = StaticCatalog::english();
        let env = WidgetEnv {
            document: HostDocument::new(Url::parse("https://example.com/page.html").unwrap(), ""),
            config: &config,
            localizer: &catalog,
            renderer: &IdRenderer,
            fetcher: Arc::new(NoFetch),
        };
        let widget = MediaWidget::attach(&element(), env, &mut provider, RecordingView::new()).unwrap();
        (widget, clock)
    }

    fn native_probe() -> MediaProbe {
        MediaProbe {
            has_error: false,
            current_src: Some("clip.mp4".into()),
        }
    }

    #[test]
    fn test_attach_native() {
        let (widget, _) = attach(native_probe());
        assert_eq!(widget.backend_kind(), BackendKind::Native);
        assert_eq!(widget.markup(), "<div id=\"demo\"></div>");
        assert!(widget.data().flashvars.is_none());
        assert!(widget.captions().is_none());
    }

    #[test]
    fn test_attach_fallback_builds_params() {
        let (widget, _) = attach(MediaProbe::default());
        assert_eq!(widget.backend_kind(), BackendKind::Fallback);
        let flashvars = widget.data().flashvars.as_deref().unwrap();
        assert!(flashvars.starts_with("id=demo-media"));
        assert!(flashvars.contains("media=https://example.com/clip.mp4"));
    }

    #[test]
    fn test_play_event_updates_view() {
        let (mut widget, _) = attach(native_probe());
        widget.handle_event(PlayerEvent::Play);
        let updates = widget.view_mut().take_updates();
        assert_eq!(
            updates,
            vec![
                ViewUpdate::PlayButton {
                    playing: true,
                    title: "Pause".into()
                },
                ViewUpdate::Overlay { playing: true },
                ViewUpdate::ProgressActive(true),
            ]
        );
    }

    #[test]
    fn test_time_update_progress_and_label() {
        let (mut widget, clock) = attach(native_probe());
        clock.lock().unwrap().start();
        clock.lock().unwrap().advance(33.3);

        widget.handle_event(PlayerEvent::TimeUpdate);
        let updates = widget.view_mut().take_updates();
        assert_eq!(updates[0], ViewUpdate::ProgressValue(33.3));
        assert_eq!(updates[1], ViewUpdate::CurrentTime("00:00:33".into()));
    }

    #[test]
    fn test_click_ignores_secondary_button() {
        let (mut widget, clock) = attach(native_probe());
        let consumed = widget.handle_ui(UiEvent::Click {
            target: ControlTarget::PlayPause,
            button: MouseButton::Secondary,
        });
        assert!(!consumed);
        assert!(clock.lock().unwrap().paused());
    }

    #[test]
    fn test_caption_toggle_updates_button() {
        let (mut widget, _) = attach(native_probe());
        widget.handle_ui(UiEvent::Click {
            target: ControlTarget::Captions,
            button: MouseButton::Primary,
        });
        assert_eq!(
            widget.view_mut().take_updates(),
            vec![ViewUpdate::CaptionButton {
                visible: true,
                title: "Hide closed captioning".into()
            }]
        );
    }

    #[test]
    fn test_caption_toggle_disabled_after_load_failure() {
        let (mut widget, _) = attach(native_probe());
        widget.handle_event(PlayerEvent::CaptionsLoadFailed(Arc::new(Error::CaptionStatus {
            url: "https://example.com/cc.xml".into(),
            status: 404,
        })));
        widget.view_mut().take_updates();

        let consumed = widget.handle_ui(UiEvent::Click {
            target: ControlTarget::Captions,
            button: MouseButton::Primary,
        });
        assert!(!consumed);
        assert!(widget.captions_disabled());
        assert!(!widget.player().captions_visible());
        assert!(widget.view_mut().take_updates().is_empty());
    }

    #[test]
    fn test_progress_ticks_toggle_waiting() {
        let (mut widget, clock) = attach(native_probe());
        widget.player().play().unwrap();

        widget.handle_event(PlayerEvent::Progress);
        widget.handle_event(PlayerEvent::Progress);
        clock.lock().unwrap().advance(1.0);
        widget.handle_event(PlayerEvent::Progress);

        assert_eq!(
            widget.view_mut().take_updates(),
            vec![ViewUpdate::Waiting(true), ViewUpdate::Waiting(false)]
        );
    }
}

//! Player façade
//!
//! One call surface for every backend: `play`, `pause` and `get`/`set` of
//! a property. The façade owns the backend handle and resolves each call to
//! the shape the backend actually has:
//! - `play`/`pause` try the native method first and fall back to the plugin
//!   method (`doPlay`/`doPause`)
//! - media properties go through callable getters/setters when the backend
//!   binds them that way, through plain field access otherwise
//! - `captionsVisible`, `previousTime` and `buffering` belong to the widget
//!   and never reach the backend

use crate::backend::{BackendKind, Binding, MediaBackend, MediaProperty, Value};
use crate::events::PlayerEvent;
use crate::{Error, Result};
use std::str::FromStr;
use tracing::{debug, warn};

/// Anything addressable through `get`/`set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerProperty {
    /// Forwarded to the backend
    Media(MediaProperty),
    /// Caption overlay toggle
    CaptionsVisible,
    /// Position sampled on the previous progress tick
    PreviousTime,
    /// Buffering flag inferred from progress ticks
    Buffering,
}

impl PlayerProperty {
    /// Look a property up by its noun (`CurrentTime`, `captionsVisible`, ...)
    pub fn from_noun(noun: &str) -> Option<Self> {
        match noun {
            "CaptionsVisible" | "captionsVisible" => Some(PlayerProperty::CaptionsVisible),
            "PreviousTime" | "previousTime" => Some(PlayerProperty::PreviousTime),
            "Buffering" | "buffering" => Some(PlayerProperty::Buffering),
            _ => MediaProperty::from_noun(noun).map(PlayerProperty::Media),
        }
    }
}

impl From<MediaProperty> for PlayerProperty {
    fn from(property: MediaProperty) -> Self {
        PlayerProperty::Media(property)
    }
}

/// A verb-based call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCall {
    Play,
    Pause,
    Get(PlayerProperty),
    Set(PlayerProperty, Value),
}

impl PlayerCall {
    /// Parse a call name such as `play`, `getCurrentTime` or `setVolume`.
    /// Setters take `arg`.
    pub fn parse(name: &str, arg: Option<Value>) -> Result<Self> {
        let unknown = || Error::UnknownCall(name.to_string());

        match name {
            "play" => return Ok(PlayerCall::Play),
            "pause" => return Ok(PlayerCall::Pause),
            _ => {}
        }

        if let Some(noun) = name.strip_prefix("get") {
            let property = PlayerProperty::from_noun(noun).ok_or_else(unknown)?;
            return Ok(PlayerCall::Get(property));
        }
        if let Some(noun) = name.strip_prefix("set") {
            let property = PlayerProperty::from_noun(noun).ok_or_else(unknown)?;
            let value = arg.ok_or_else(unknown)?;
            return Ok(PlayerCall::Set(property, value));
        }

        Err(unknown())
    }
}

impl FromStr for PlayerCall {
    type Err = Error;

    /// Parse an argument-free call (`play`, `pause`, `get<Noun>`)
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, None)
    }
}

/// Uniform control surface over a backend
pub struct PlayerFacade {
    backend: Box<dyn MediaBackend>,
    captions_visible: bool,
    previous_time: Option<f64>,
    buffering: bool,
    outbox: Vec<PlayerEvent>,
}

impl PlayerFacade {
    pub fn new(backend: Box<dyn MediaBackend>) -> Self {
        Self {
            backend,
            captions_visible: false,
            previous_time: None,
            buffering: false,
            outbox: Vec::new(),
        }
    }

    /// Kind of the wrapped backend
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Dispatch a verb-based call. Getters return their value.
    pub fn invoke(&mut self, call: PlayerCall) -> Result<Option<Value>> {
        match call {
            PlayerCall::Play => self.play().map(|_| None),
            PlayerCall::Pause => self.pause().map(|_| None),
            PlayerCall::Get(property) => Ok(self.get(property)),
            PlayerCall::Set(property, value) => self.set(property, value).map(|_| None),
        }
    }

    /// Start playback, native method first
    pub fn play(&mut self) -> Result<()> {
        self.backend.play().or_else(|e| {
            debug!(error = %e, "Native play failed, trying plugin play");
            keep_native_error(e, self.backend.do_play())
        })
    }

    /// Stop playback, native method first
    pub fn pause(&mut self) -> Result<()> {
        self.backend.pause().or_else(|e| {
            debug!(error = %e, "Native pause failed, trying plugin pause");
            keep_native_error(e, self.backend.do_pause())
        })
    }

    /// Read a property. `None` means the backend has no such value.
    pub fn get(&mut self, property: PlayerProperty) -> Option<Value> {
        match property {
            PlayerProperty::CaptionsVisible => Some(Value::Bool(self.captions_visible)),
            PlayerProperty::PreviousTime => self.previous_time.map(Value::Number),
            PlayerProperty::Buffering => Some(Value::Bool(self.buffering)),
            PlayerProperty::Media(media) => match self.backend.binding(media) {
                Binding::Callable => match self.backend.call_get(media) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(property = %media, error = %e, "Backend getter failed");
                        None
                    }
                },
                Binding::Field => self.backend.field(media),
            },
        }
    }

    /// Write a property
    pub fn set(&mut self, property: PlayerProperty, value: Value) -> Result<()> {
        match property {
            PlayerProperty::CaptionsVisible => {
                let visible = value.as_bool().ok_or(Error::ValueType {
                    property: "captionsVisible",
                    expected: "boolean",
                })?;
                self.set_captions_visible(visible);
                Ok(())
            }
            PlayerProperty::PreviousTime => {
                let time = value.as_f64().ok_or(Error::ValueType {
                    property: "previousTime",
                    expected: "number",
                })?;
                self.previous_time = Some(time);
                Ok(())
            }
            PlayerProperty::Buffering => {
                self.buffering = value.as_bool().ok_or(Error::ValueType {
                    property: "buffering",
                    expected: "boolean",
                })?;
                Ok(())
            }
            PlayerProperty::Media(media) => match self.backend.binding(media) {
                Binding::Callable => self.backend.call_set(media, value),
                Binding::Field => {
                    self.backend.set_field(media, value);
                    Ok(())
                }
            },
        }
    }

    pub fn paused(&mut self) -> bool {
        self.get_bool(MediaProperty::Paused).unwrap_or(true)
    }

    pub fn muted(&mut self) -> bool {
        self.get_bool(MediaProperty::Muted).unwrap_or(false)
    }

    /// Current position in seconds, `NaN` if the backend does not know it
    pub fn current_time(&mut self) -> f64 {
        self.get_number(MediaProperty::CurrentTime).unwrap_or(f64::NAN)
    }

    /// Duration in seconds, `NaN` if the backend does not know it
    pub fn duration(&mut self) -> f64 {
        self.get_number(MediaProperty::Duration).unwrap_or(f64::NAN)
    }

    pub fn volume(&mut self) -> f64 {
        self.get_number(MediaProperty::Volume).unwrap_or(1.0)
    }

    pub fn set_current_time(&mut self, seconds: f64) -> Result<()> {
        self.set(MediaProperty::CurrentTime.into(), Value::Number(seconds))
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.set(MediaProperty::Volume.into(), Value::Number(volume))
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.set(MediaProperty::Muted.into(), Value::Bool(muted))
    }

    pub fn captions_visible(&self) -> bool {
        self.captions_visible
    }

    /// Toggle the caption overlay and announce the change
    pub fn set_captions_visible(&mut self, visible: bool) {
        self.captions_visible = visible;
        self.outbox.push(PlayerEvent::CaptionsVisibleChange);
    }

    pub fn previous_time(&self) -> Option<f64> {
        self.previous_time
    }

    pub fn set_previous_time(&mut self, seconds: f64) {
        self.previous_time = Some(seconds);
    }

    pub fn buffering(&self) -> bool {
        self.buffering
    }

    pub fn set_buffering(&mut self, buffering: bool) {
        self.buffering = buffering;
    }

    /// Events raised by façade calls since the last drain
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn get_bool(&mut self, property: MediaProperty) -> Option<bool> {
        self.get(property.into()).and_then(|v| v.as_bool())
    }

    fn get_number(&mut self, property: MediaProperty) -> Option<f64> {
        self.get(property.into()).and_then(|v| v.as_f64())
    }
}

/// Result of a plugin fallback. When the plugin method is missing too, the
/// native error is the one worth reporting.
fn keep_native_error(native: Error, fallback: Result<()>) -> Result<()> {
    match fallback {
        Err(Error::MissingMethod { .. }) if !matches!(native, Error::MissingMethod { .. }) => Err(native),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{NativeElement, PlaybackClock, PluginObject};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Plugin-shaped backend that counts calls and keeps plain fields
    #[derive(Default)]
    struct CountingPlugin {
        do_play_calls: Arc<AtomicUsize>,
        do_pause_calls: Arc<AtomicUsize>,
        fields: HashMap<MediaProperty, Value>,
    }

    impl MediaBackend for CountingPlugin {
        fn kind(&self) -> BackendKind {
            BackendKind::Fallback
        }

        fn do_play(&mut self) -> Result<()> {
            self.do_play_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn do_pause(&mut self) -> Result<()> {
            self.do_pause_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn field(&self, property: MediaProperty) -> Option<Value> {
            self.fields.get(&property).copied()
        }

        fn set_field(&mut self, property: MediaProperty, value: Value) {
            self.fields.insert(property, value);
        }
    }

    #[test]
    fn test_play_falls_back_exactly_once() {
        let backend = CountingPlugin::default();
        let plays = backend.do_play_calls.clone();
        let pauses = backend.do_pause_calls.clone();
        let mut facade = PlayerFacade::new(Box::new(backend));

        assert!(facade.play().is_ok());
        assert_eq!(plays.load(Ordering::SeqCst), 1);

        assert!(facade.invoke(PlayerCall::Pause).is_ok());
        assert_eq!(pauses.load(Ordering::SeqCst), 1);
        assert_eq!(plays.load(Ordering::SeqCst), 1);
    }

    /// Native backend whose `play` fails for a reason other than a missing method
    struct BrokenNative;

    impl MediaBackend for BrokenNative {
        fn kind(&self) -> BackendKind {
            BackendKind::Native
        }

        fn play(&mut self) -> Result<()> {
            Err(Error::Internal("decoder stalled".into()))
        }

        fn field(&self, _property: MediaProperty) -> Option<Value> {
            None
        }

        fn set_field(&mut self, _property: MediaProperty, _value: Value) {}
    }

    #[test]
    fn test_native_failure_reported_when_fallback_missing() {
        let mut facade = PlayerFacade::new(Box::new(BrokenNative));
        assert!(matches!(facade.play(), Err(Error::Internal(ref msg)) if msg == "decoder stalled"));
        assert!(matches!(
            facade.pause(),
            Err(Error::MissingMethod { method: "doPause" })
        ));
    }

    #[test]
    fn test_field_backend_without_accessors() {
        let mut facade = PlayerFacade::new(Box::new(CountingPlugin::default()));
        assert_eq!(facade.get(MediaProperty::Volume.into()), None);
        facade.set_volume(0.4).unwrap();
        assert_eq!(facade.volume(), 0.4);
        assert!(facade.current_time().is_nan());
    }

    #[test]
    fn test_native_and_plugin_agree() {
        let native_clock = PlaybackClock::shared(120.0);
        let plugin_clock = PlaybackClock::shared(120.0);
        let mut native = PlayerFacade::new(Box::new(NativeElement::new(native_clock)));
        let mut plugin = PlayerFacade::new(Box::new(PluginObject::new(plugin_clock)));

        for facade in [&mut native, &mut plugin] {
            facade.play().unwrap();
            assert!(!facade.paused());
            facade.set_current_time(30.0).unwrap();
            assert_eq!(facade.current_time(), 30.0);
            facade.set_muted(true).unwrap();
            assert!(facade.muted());
            assert_eq!(facade.duration(), 120.0);
        }
    }

    #[test]
    fn test_pseudo_properties_stay_local() {
        let clock = PlaybackClock::shared(10.0);
        let mut facade = PlayerFacade::new(Box::new(NativeElement::new(clock.clone())));

        assert_eq!(facade.get(PlayerProperty::PreviousTime), None);
        facade.set(PlayerProperty::PreviousTime, Value::Number(4.0)).unwrap();
        facade.set(PlayerProperty::Buffering, Value::Bool(true)).unwrap();
        assert_eq!(facade.previous_time(), Some(4.0));
        assert!(facade.buffering());

        // The backend clock is untouched
        assert_eq!(clock.lock().unwrap().current_time(), 0.0);
    }

    #[test]
    fn test_captions_visible_emits_change() {
        let mut facade = PlayerFacade::new(Box::new(CountingPlugin::default()));
        facade
            .invoke(PlayerCall::parse("setCaptionsVisible", Some(Value::Bool(true))).unwrap())
            .unwrap();
        assert!(facade.captions_visible());
        let events = facade.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PlayerEvent::CaptionsVisibleChange));
        assert!(facade.take_events().is_empty());
    }

    #[test]
    fn test_parse_calls() {
        assert_eq!("play".parse::<PlayerCall>().unwrap(), PlayerCall::Play);
        assert_eq!(
            "getCurrentTime".parse::<PlayerCall>().unwrap(),
            PlayerCall::Get(PlayerProperty::Media(MediaProperty::CurrentTime))
        );
        assert_eq!(
            PlayerCall::parse("setVolume", Some(Value::Number(0.5))).unwrap(),
            PlayerCall::Set(PlayerProperty::Media(MediaProperty::Volume), Value::Number(0.5))
        );
        assert!("setVolume".parse::<PlayerCall>().is_err());
        assert!("getBitrate".parse::<PlayerCall>().is_err());
        assert!("stop".parse::<PlayerCall>().is_err());
    }

    #[test]
    fn test_type_mismatch() {
        let mut facade = PlayerFacade::new(Box::new(CountingPlugin::default()));
        assert!(matches!(
            facade.set(PlayerProperty::CaptionsVisible, Value::Number(1.0)),
            Err(Error::ValueType { .. })
        ));
    }
}

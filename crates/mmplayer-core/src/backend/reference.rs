//! Deterministic reference backends
//!
//! [`NativeElement`] and [`PluginObject`] drive the same [`PlaybackClock`]
//! but expose it in the native and plugin shapes respectively. The clock only
//! moves when [`PlaybackClock::advance`] is called, which makes the
//! backends suitable for simulations and tests.

use super::{BackendKind, Binding, MediaBackend, MediaProperty, Value};
use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Playback clock shared between a backend and whoever drives it
pub type SharedClock = Arc<Mutex<PlaybackClock>>;

/// Simulated playback state
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackClock {
    paused: bool,
    ended: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    stalled: bool,
}

impl PlaybackClock {
    /// A paused clock at position zero
    pub fn new(duration: f64) -> Self {
        Self {
            paused: true,
            ended: false,
            current_time: 0.0,
            duration: duration.max(0.0),
            volume: 1.0,
            muted: false,
            stalled: false,
        }
    }

    /// Wrap a new clock for sharing
    pub fn shared(duration: f64) -> SharedClock {
        Arc::new(Mutex::new(Self::new(duration)))
    }

    /// Move the position forward by `seconds` of wall time. Nothing moves
    /// while paused or stalled.
    pub fn advance(&mut self, seconds: f64) {
        if self.paused || self.stalled || self.ended {
            return;
        }
        self.current_time = (self.current_time + seconds).min(self.duration);
        if self.current_time >= self.duration {
            self.ended = true;
            self.paused = true;
        }
    }

    /// Simulate data starvation: the position stops advancing
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    pub fn start(&mut self) {
        if self.ended {
            self.current_time = 0.0;
            self.ended = false;
        }
        self.paused = false;
    }

    pub fn stop(&mut self) {
        self.paused = true;
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Read a property
    pub fn get(&self, property: MediaProperty) -> Value {
        match property {
            MediaProperty::Paused => Value::Bool(self.paused),
            MediaProperty::Ended => Value::Bool(self.ended),
            MediaProperty::CurrentTime => Value::Number(self.current_time),
            MediaProperty::Duration => Value::Number(self.duration),
            MediaProperty::Volume => Value::Number(self.volume),
            MediaProperty::Muted => Value::Bool(self.muted),
        }
    }

    /// Write a property
    pub fn set(&mut self, property: MediaProperty, value: Value) -> Result<()> {
        if property.is_read_only() {
            return Err(Error::ReadOnlyProperty {
                property: property.name(),
            });
        }

        match property {
            MediaProperty::CurrentTime => {
                let t = number(property, value)?;
                self.current_time = t.clamp(0.0, self.duration);
                self.ended = self.current_time >= self.duration && self.duration > 0.0;
            }
            MediaProperty::Volume => {
                self.volume = number(property, value)?.clamp(0.0, 1.0);
            }
            MediaProperty::Muted => {
                self.muted = value.as_bool().ok_or(Error::ValueType {
                    property: property.name(),
                    expected: "boolean",
                })?;
            }
            MediaProperty::Paused | MediaProperty::Ended | MediaProperty::Duration => {}
        }
        Ok(())
    }
}

fn number(property: MediaProperty, value: Value) -> Result<f64> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or(Error::ValueType {
            property: property.name(),
            expected: "number",
        })
}

fn lock(clock: &SharedClock) -> MutexGuard<'_, PlaybackClock> {
    clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Native-shaped backend: `play`/`pause` methods, properties as fields
pub struct NativeElement {
    clock: SharedClock,
}

impl NativeElement {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }
}

impl MediaBackend for NativeElement {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn play(&mut self) -> Result<()> {
        lock(&self.clock).start();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        lock(&self.clock).stop();
        Ok(())
    }

    fn field(&self, property: MediaProperty) -> Option<Value> {
        Some(lock(&self.clock).get(property))
    }

    fn set_field(&mut self, property: MediaProperty, value: Value) {
        // Assigning a read-only or mistyped property is silently ignored
        if let Err(e) = lock(&self.clock).set(property, value) {
            debug!(property = %property, error = %e, "Ignored property assignment");
        }
    }
}

/// Plugin-shaped backend: `doPlay`/`doPause`, callable getters and setters
pub struct PluginObject {
    clock: SharedClock,
}

impl PluginObject {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }
}

impl MediaBackend for PluginObject {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn do_play(&mut self) -> Result<()> {
        lock(&self.clock).start();
        Ok(())
    }

    fn do_pause(&mut self) -> Result<()> {
        lock(&self.clock).stop();
        Ok(())
    }

    fn binding(&self, _property: MediaProperty) -> Binding {
        Binding::Callable
    }

    fn call_get(&mut self, property: MediaProperty) -> Result<Value> {
        Ok(lock(&self.clock).get(property))
    }

    fn call_set(&mut self, property: MediaProperty, value: Value) -> Result<()> {
        lock(&self.clock).set(property, value)
    }

    fn field(&self, _property: MediaProperty) -> Option<Value> {
        None
    }

    fn set_field(&mut self, property: MediaProperty, _value: Value) {
        debug!(property = %property, "Plugin object has no plain properties");
    }
}

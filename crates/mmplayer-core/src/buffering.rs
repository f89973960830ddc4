//! Buffering detection from progress ticks
//!
//! Backends that never report waiting/ready transitions still report
//! progress. On each tick the current position is compared with the one
//! sampled on the previous tick: a playing backend whose position has not
//! moved is assumed to be waiting for data, and the first tick that sees it
//! move again marks it ready.
//!
//! A backend that genuinely stalls on a segment boundary without running
//! out of data also reads as waiting.

use crate::facade::PlayerFacade;
use tracing::debug;

/// Inferred change in data availability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferingTransition {
    /// Playback stalled; raise a waiting indicator
    Waiting,
    /// Playback resumed; clear the waiting indicator
    Ready,
}

/// Process one progress tick. The current position is always recorded as
/// the previous position for the next tick.
pub fn progress_tick(player: &mut PlayerFacade) -> Option<BufferingTransition> {
    let current = player.current_time();
    let stalled = !player.paused() && player.previous_time() == Some(current);

    let transition = if stalled {
        if player.buffering() {
            None
        } else {
            player.set_buffering(true);
            Some(BufferingTransition::Waiting)
        }
    } else if player.buffering() {
        player.set_buffering(false);
        Some(BufferingTransition::Ready)
    } else {
        None
    };

    if let Some(transition) = transition {
        debug!(?transition, position = current, "Buffering state inferred");
    }

    player.set_previous_time(current);
    transition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{NativeElement, PlaybackClock, SharedClock};

    fn playing(duration: f64) -> (PlayerFacade, SharedClock) {
        let clock = PlaybackClock::shared(duration);
        let mut player = PlayerFacade::new(Box::new(NativeElement::new(clock.clone())));
        player.play().unwrap();
        (player, clock)
    }

    #[test]
    fn test_stall_then_resume() {
        let (mut player, clock) = playing(60.0);

        // First tick has nothing to compare against
        assert_eq!(progress_tick(&mut player), None);

        // Same position while playing
        assert_eq!(progress_tick(&mut player), Some(BufferingTransition::Waiting));
        assert!(player.buffering());

        // Still stalled: no repeated waiting
        assert_eq!(progress_tick(&mut player), None);

        clock.lock().unwrap().advance(0.25);
        assert_eq!(progress_tick(&mut player), Some(BufferingTransition::Ready));
        assert!(!player.buffering());

        clock.lock().unwrap().advance(0.25);
        assert_eq!(progress_tick(&mut player), None);
    }

    #[test]
    fn test_paused_is_not_buffering() {
        let (mut player, _clock) = playing(60.0);
        player.pause().unwrap();

        assert_eq!(progress_tick(&mut player), None);
        assert_eq!(progress_tick(&mut player), None);
        assert!(!player.buffering());
    }

    #[test]
    fn test_previous_time_always_recorded() {
        let (mut player, clock) = playing(60.0);
        clock.lock().unwrap().advance(3.0);
        progress_tick(&mut player);
        assert_eq!(player.previous_time(), Some(3.0));
    }
}

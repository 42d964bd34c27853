//! Artist/title pairing with debounce
//!
//! Artist and title arrive as separate events, in either order, and sometimes only
//! one of them arrives at all. The coordinator buffers the partial pair and emits:
//! - immediately, once both fields are present
//! - when the debounce window elapses after the last field, with whatever is set
//!
//! The coordinator does not own a timer task. It exposes the armed deadline and the
//! event loop sleeps until it (see `service`), calling [`PairingCoordinator::on_timer`]
//! when the sleep completes. Arming replaces the previous deadline, so at most one
//! timer is ever live.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::Result;
use crate::metadata::{decode_payload, DisplayPair, MetadataEvent};

/// Delay after the last field before a partial pair is emitted
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(3000);

/// Partial pair plus the armed debounce deadline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairState {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub armed_deadline: Option<Instant>,
}

impl PairState {
    fn is_empty(&self) -> bool {
        self.artist.is_none() && self.title.is_none()
    }
}

/// Which field an event targets
#[derive(Debug, Clone, Copy)]
enum Field {
    Artist,
    Title,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::Artist => "artist",
            Field::Title => "title",
        }
    }
}

/// Pairing state machine
#[derive(Debug)]
pub struct PairingCoordinator {
    window: Duration,
    state: PairState,
}

impl PairingCoordinator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: PairState::default(),
        }
    }

    /// Debounce window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Deadline of the armed timer, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.state.armed_deadline
    }

    pub fn state(&self) -> &PairState {
        &self.state
    }

    /// Apply one metadata event at time `now`
    ///
    /// Returns the pair to display when the event completes it. A field payload
    /// that is not text is returned as `InvalidEventPayload` and leaves the state
    /// untouched (no field set, timer not re-armed).
    pub fn handle_event(
        &mut self,
        event: MetadataEvent,
        now: Instant,
    ) -> Result<Option<DisplayPair>> {
        match event {
            MetadataEvent::Artist(payload) => {
                let text = decode_payload(Field::Artist.name(), payload)?;
                Ok(self.set_field(Field::Artist, text, now))
            }
            MetadataEvent::Title(payload) => {
                let text = decode_payload(Field::Title.name(), payload)?;
                Ok(self.set_field(Field::Title, text, now))
            }
            boundary @ (MetadataEvent::SessionBegin | MetadataEvent::SessionEnd) => {
                debug!("Session boundary ({:?}), discarding partial pair", boundary);
                self.clear();
                Ok(None)
            }
        }
    }

    /// Debounce timer fired at `now`
    ///
    /// A no-op when nothing is armed (the pair was already emitted) or when the
    /// deadline has not actually been reached.
    pub fn on_timer(&mut self, now: Instant) -> Option<DisplayPair> {
        let deadline = self.state.armed_deadline?;
        if now < deadline {
            trace!("Debounce timer woke early, ignoring");
            return None;
        }

        if self.state.is_empty() {
            self.state.armed_deadline = None;
            return None;
        }

        debug!("Debounce window elapsed, emitting partial pair");
        Some(self.emit())
    }

    /// Drop any partial pair and disarm the timer
    pub fn clear(&mut self) {
        self.state = PairState::default();
    }

    fn set_field(&mut self, field: Field, text: String, now: Instant) -> Option<DisplayPair> {
        // An empty payload counts as unset but still overwrites and re-arms
        let value = Some(text).filter(|t| !t.is_empty());
        let other_present = match field {
            Field::Artist => {
                self.state.artist = value;
                self.state.title.is_some()
            }
            Field::Title => {
                self.state.title = value;
                self.state.artist.is_some()
            }
        };

        if other_present {
            return Some(self.emit());
        }

        // Always measured from the most recent field
        let deadline = now + self.window;
        trace!("Arming debounce timer after {}", field.name());
        self.state.armed_deadline = Some(deadline);
        None
    }

    /// Take the buffered pair, leaving the state empty and disarmed
    fn emit(&mut self) -> DisplayPair {
        let state = std::mem::take(&mut self.state);
        DisplayPair::new(state.artist, state.title)
    }
}

impl Default for PairingCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DisplayError;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn pair(artist: Option<&str>, title: Option<&str>) -> DisplayPair {
        DisplayPair::new(artist.map(String::from), title.map(String::from))
    }

    #[test]
    fn test_artist_then_title_emits_once() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        assert_eq!(coord.handle_event(MetadataEvent::artist("a"), t0).unwrap(), None);
        assert_eq!(coord.deadline(), Some(t0 + DEFAULT_DEBOUNCE));

        let emitted = coord.handle_event(MetadataEvent::title("t"), t0 + ms(500)).unwrap();
        assert_eq!(emitted, Some(pair(Some("a"), Some("t"))));

        // Cleared and disarmed
        assert_eq!(coord.state(), &PairState::default());
        assert_eq!(coord.on_timer(t0 + ms(5000)), None);
    }

    #[test]
    fn test_title_then_artist_emits_once() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        assert_eq!(coord.handle_event(MetadataEvent::title("t"), t0).unwrap(), None);
        let emitted = coord.handle_event(MetadataEvent::artist("a"), t0 + ms(2999)).unwrap();
        assert_eq!(emitted, Some(pair(Some("a"), Some("t"))));
        assert_eq!(coord.deadline(), None);
    }

    #[test]
    fn test_timeout_emits_partial_pair() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        coord.handle_event(MetadataEvent::artist("A"), t0).unwrap();

        // Not before the window
        assert_eq!(coord.on_timer(t0 + ms(2999)), None);
        assert!(coord.deadline().is_some());

        assert_eq!(coord.on_timer(t0 + ms(3000)), Some(pair(Some("A"), None)));
        assert_eq!(coord.deadline(), None);

        // Exactly one emission
        assert_eq!(coord.on_timer(t0 + ms(6000)), None);
    }

    #[test]
    fn test_new_field_rearms_from_now() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        coord.handle_event(MetadataEvent::artist("A"), t0).unwrap();
        coord.handle_event(MetadataEvent::artist("B"), t0 + ms(1000)).unwrap();
        assert_eq!(coord.deadline(), Some(t0 + ms(4000)));

        assert_eq!(coord.on_timer(t0 + ms(3000)), None);
        assert_eq!(coord.on_timer(t0 + ms(4000)), Some(pair(Some("B"), None)));
    }

    #[test]
    fn test_duplicate_value_still_rearms() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        coord.handle_event(MetadataEvent::title("same"), t0).unwrap();
        coord.handle_event(MetadataEvent::title("same"), t0 + ms(2000)).unwrap();
        assert_eq!(coord.deadline(), Some(t0 + ms(5000)));
    }

    #[test]
    fn test_session_boundaries_reset() {
        for boundary in [MetadataEvent::SessionBegin, MetadataEvent::SessionEnd] {
            let mut coord = PairingCoordinator::default();
            let t0 = Instant::now();

            coord.handle_event(MetadataEvent::artist("A"), t0).unwrap();
            assert_eq!(coord.handle_event(boundary, t0 + ms(100)).unwrap(), None);
            assert_eq!(coord.state(), &PairState::default());
            assert_eq!(coord.on_timer(t0 + ms(10_000)), None);

            // Fresh cycle: a title alone must not pair with the discarded artist
            assert_eq!(
                coord.handle_event(MetadataEvent::title("T"), t0 + ms(200)).unwrap(),
                None
            );
            assert_eq!(
                coord.on_timer(t0 + ms(3200)),
                Some(pair(None, Some("T")))
            );
        }
    }

    #[test]
    fn test_invalid_payload_is_ignored() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        let err = coord
            .handle_event(MetadataEvent::Artist(vec![0xC3, 0x28]), t0)
            .unwrap_err();
        assert!(matches!(err, DisplayError::InvalidEventPayload { field: "artist" }));
        assert_eq!(coord.state(), &PairState::default());

        // Does not re-arm an existing timer either
        coord.handle_event(MetadataEvent::title("T"), t0).unwrap();
        coord
            .handle_event(MetadataEvent::Title(vec![0xFF]), t0 + ms(1000))
            .unwrap_err();
        assert_eq!(coord.deadline(), Some(t0 + DEFAULT_DEBOUNCE));
        assert_eq!(coord.state().title.as_deref(), Some("T"));
    }

    #[test]
    fn test_lone_empty_field_never_emits() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        assert_eq!(coord.handle_event(MetadataEvent::title(""), t0).unwrap(), None);
        assert_eq!(coord.on_timer(t0 + DEFAULT_DEBOUNCE), None);
        assert_eq!(coord.state(), &PairState::default());
    }

    #[test]
    fn test_empty_field_does_not_complete_pair() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        coord.handle_event(MetadataEvent::title(""), t0).unwrap();
        assert_eq!(
            coord.handle_event(MetadataEvent::artist("X"), t0 + ms(100)).unwrap(),
            None
        );
        assert_eq!(coord.deadline(), Some(t0 + ms(3100)));
        assert_eq!(coord.on_timer(t0 + ms(3100)), Some(pair(Some("X"), None)));
    }

    #[test]
    fn test_empty_field_overwrites_previous_value() {
        let mut coord = PairingCoordinator::default();
        let t0 = Instant::now();

        coord.handle_event(MetadataEvent::artist("A"), t0).unwrap();
        coord.handle_event(MetadataEvent::artist(""), t0 + ms(100)).unwrap();
        assert_eq!(coord.on_timer(t0 + ms(3100)), None);
    }

    #[test]
    fn test_timer_without_state_is_noop() {
        let mut coord = PairingCoordinator::new(ms(10));
        assert_eq!(coord.on_timer(Instant::now()), None);
    }
}

//! Metadata event types
//!
//! Events arrive one field at a time from the metadata source. Field payloads are
//! kept as raw bytes until the coordinator decodes them, so a non-text payload can
//! be rejected without touching pairing state.

use crate::error::{DisplayError, Result};

/// One discrete metadata event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataEvent {
    /// Artist name payload
    Artist(Vec<u8>),
    /// Track title payload
    Title(Vec<u8>),
    /// Playback session started
    SessionBegin,
    /// Playback session ended
    SessionEnd,
}

impl MetadataEvent {
    /// Convenience constructor for a textual artist event
    pub fn artist(text: impl Into<String>) -> Self {
        Self::Artist(text.into().into_bytes())
    }

    /// Convenience constructor for a textual title event
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title(text.into().into_bytes())
    }
}

/// Decode a field payload as UTF-8 text
pub(crate) fn decode_payload(field: &'static str, payload: Vec<u8>) -> Result<String> {
    String::from_utf8(payload).map_err(|_| DisplayError::InvalidEventPayload { field })
}

/// Snapshot of the pair handed from the coordinator to the renderer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayPair {
    pub artist: Option<String>,
    pub title: Option<String>,
}

impl DisplayPair {
    pub fn new(artist: Option<String>, title: Option<String>) -> Self {
        Self { artist, title }
    }
}

impl std::fmt::Display for DisplayPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {}",
            self.artist.as_deref().unwrap_or("-"),
            self.title.as_deref().unwrap_or("-")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_payload() {
        let text = decode_payload("artist", "Björk".as_bytes().to_vec()).unwrap();
        assert_eq!(text, "Björk");
    }

    #[test]
    fn test_decode_rejects_binary_payload() {
        let err = decode_payload("title", vec![0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            DisplayError::InvalidEventPayload { field: "title" }
        ));
    }

    #[test]
    fn test_pair_display() {
        let pair = DisplayPair::new(Some("A".into()), None);
        assert_eq!(pair.to_string(), "A / -");
    }
}

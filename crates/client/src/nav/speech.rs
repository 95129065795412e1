//! Spoken announcements.

use serde::Serialize;

/// Language tag for every announcement.
pub const LANGUAGE: &str = "ms-MY";

/// One line of speech.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub text: String,
    pub lang: &'static str,
    pub rate: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), lang: LANGUAGE, rate: 1.0 }
    }
}

/// Text-to-speech output. A new utterance cuts off whatever is still playing.
pub trait Speaker: Send + Sync {
    fn speak(&self, utterance: Utterance);
}

use std::fmt;
use std::time::Duration;

use crate::Effect;

pub const FEEDBACK_DISPLAY: Duration = Duration::from_millis(5000);
pub const FEEDBACK_FADE: Duration = Duration::from_millis(1000);
/// Text shown for any failure the server did not describe.
pub const GENERIC_ERROR_TEXT: &str = "Error";

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_ENTROPY_MASK: u32 = (1 << 29) - 1;

/// Element id of a feedback bubble. Collisions are not guarded against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedbackId(String);

impl FeedbackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Base-36 id from 29 random bits.
    pub fn from_bits(bits: u32) -> Self {
        let mut value = bits & ID_ENTROPY_MASK;
        let mut digits = Vec::new();
        loop {
            digits.push(ID_ALPHABET[(value % 36) as usize]);
            value /= 36;
            if value == 0 {
                break;
            }
        }
        digits.reverse();
        Self(digits.into_iter().map(char::from).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPhase {
    Visible,
    Fading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub id: FeedbackId,
    pub text: String,
    pub phase: FeedbackPhase,
}

/// Transient, self-dismissing messages. Entries are independent: a new one
/// never shortens or cancels another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notifier {
    entries: Vec<FeedbackEntry>,
    display: Duration,
    fade: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(FEEDBACK_DISPLAY, FEEDBACK_FADE)
    }
}

impl Notifier {
    pub fn new(display: Duration, fade: Duration) -> Self {
        Self {
            entries: Vec::new(),
            display,
            fade,
        }
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    pub fn notify(&mut self, id: FeedbackId, text: impl Into<String>) -> Vec<Effect> {
        let text = text.into();
        self.entries.push(FeedbackEntry {
            id: id.clone(),
            text: text.clone(),
            phase: FeedbackPhase::Visible,
        });
        vec![
            Effect::ShowFeedback {
                id: id.clone(),
                text,
            },
            Effect::ScheduleFeedbackFade {
                id,
                after: self.display,
            },
        ]
    }

    pub fn fade_due(&mut self, id: &FeedbackId) -> Vec<Effect> {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| &entry.id == id && entry.phase == FeedbackPhase::Visible)
        else {
            return Vec::new();
        };
        entry.phase = FeedbackPhase::Fading;
        vec![
            Effect::FadeFeedback {
                id: id.clone(),
                duration: self.fade,
            },
            Effect::ScheduleFeedbackRemoval {
                id: id.clone(),
                after: self.fade,
            },
        ]
    }

    pub fn remove_due(&mut self, id: &FeedbackId) -> Vec<Effect> {
        let Some(position) = self
            .entries
            .iter()
            .position(|entry| &entry.id == id && entry.phase == FeedbackPhase::Fading)
        else {
            return Vec::new();
        };
        self.entries.remove(position);
        vec![Effect::RemoveFeedback { id: id.clone() }]
    }
}

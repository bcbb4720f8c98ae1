use std::collections::BTreeMap;
use std::time::Duration;

use crate::autosave::DEFAULT_UPDATE_INTERVAL;
use crate::clipboard::{CopyTracker, COPY_RESTORE_DELAY};
use crate::feedback::{Notifier, FEEDBACK_DISPLAY, FEEDBACK_FADE};
use crate::view_model::{AutosaveView, FeedbackView, PageViewModel};
use crate::{AutosaveSession, FormId};

/// Timing knobs of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    pub update_interval: Duration,
    pub feedback_display: Duration,
    pub feedback_fade: Duration,
    pub copy_restore: Duration,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            feedback_display: FEEDBACK_DISPLAY,
            feedback_fade: FEEDBACK_FADE,
            copy_restore: COPY_RESTORE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    settings: PageSettings,
    sessions: BTreeMap<FormId, AutosaveSession>,
    notifier: Notifier,
    copies: CopyTracker,
    requests_in_flight: usize,
    dirty: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(PageSettings::default())
    }
}

impl PageState {
    pub fn new(settings: PageSettings) -> Self {
        Self {
            settings,
            sessions: BTreeMap::new(),
            notifier: Notifier::new(settings.feedback_display, settings.feedback_fade),
            copies: CopyTracker::new(settings.copy_restore),
            requests_in_flight: 0,
            dirty: false,
        }
    }

    pub fn settings(&self) -> PageSettings {
        self.settings
    }

    pub fn session(&self, form: &FormId) -> Option<&AutosaveSession> {
        self.sessions.get(form)
    }

    pub fn requests_in_flight(&self) -> usize {
        self.requests_in_flight
    }

    pub fn view(&self) -> PageViewModel {
        PageViewModel {
            autosave: self
                .sessions
                .values()
                .map(|session| AutosaveView {
                    form: session.form().clone(),
                    phase: session.phase(),
                    saves_issued: session.saves_issued(),
                    last_outcome: session.last_outcome(),
                })
                .collect(),
            feedback: self
                .notifier
                .entries()
                .iter()
                .map(|entry| FeedbackView {
                    id: entry.id.clone(),
                    text: entry.text.clone(),
                    phase: entry.phase,
                })
                .collect(),
            requests_in_flight: self.requests_in_flight,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn sessions_mut(&mut self) -> &mut BTreeMap<FormId, AutosaveSession> {
        &mut self.sessions
    }

    pub(crate) fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub(crate) fn copies_mut(&mut self) -> &mut CopyTracker {
        &mut self.copies
    }

    pub(crate) fn request_started(&mut self) {
        self.requests_in_flight += 1;
    }

    pub(crate) fn request_finished(&mut self) {
        self.requests_in_flight = self.requests_in_flight.saturating_sub(1);
    }
}

//! Change-driven autosave for one form.
//!
//! A session never keeps its own copy of the baseline fingerprint: the
//! durable store holds it, and every tick compares against what the store
//! returned. The new fingerprint is written before the save request is
//! issued and is never rolled back, so a failed save is only retried once
//! the content changes again.

use std::time::Duration;

use crate::fingerprint::storage_key;
use crate::{Effect, FormId, FormRequest, RequestOutcome, RequestPurpose, SubmittedForm};

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosavePhase {
    /// A tick is scheduled; nothing in flight.
    Waiting,
    /// A save request is in flight; the next tick is scheduled on completion.
    Saving,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveSession {
    form: FormId,
    interval: Duration,
    phase: AutosavePhase,
    saves_issued: u64,
    last_outcome: Option<SaveOutcome>,
}

impl AutosaveSession {
    /// Marks the loaded content as the saved baseline (no initial save) and
    /// schedules the first tick.
    pub fn start(form: &SubmittedForm, interval: Duration) -> (Self, Vec<Effect>) {
        let session = Self {
            form: form.id.clone(),
            interval,
            phase: AutosavePhase::Waiting,
            saves_issued: 0,
            last_outcome: None,
        };
        let effects = vec![
            Effect::StoreFingerprint {
                key: storage_key(&form.id),
                fingerprint: form.snapshot.fingerprint(),
            },
            session.schedule(),
        ];
        (session, effects)
    }

    pub fn form(&self) -> &FormId {
        &self.form
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn phase(&self) -> AutosavePhase {
        self.phase
    }

    pub fn saves_issued(&self) -> u64 {
        self.saves_issued
    }

    pub fn last_outcome(&self) -> Option<SaveOutcome> {
        self.last_outcome
    }

    /// One autosave tick.
    ///
    /// Ticks that arrive while a save is in flight or after cancellation do
    /// nothing; the in-flight save reschedules when it completes.
    pub fn tick(&mut self, current: Option<&SubmittedForm>, stored: Option<&str>) -> Vec<Effect> {
        if self.phase != AutosavePhase::Waiting {
            return Vec::new();
        }
        let Some(form) = current else {
            return vec![self.schedule()];
        };

        let fingerprint = form.snapshot.fingerprint();
        if fingerprint.matches_stored(stored) {
            return vec![self.schedule()];
        }

        self.phase = AutosavePhase::Saving;
        self.saves_issued += 1;
        vec![
            Effect::StoreFingerprint {
                key: storage_key(&self.form),
                fingerprint,
            },
            Effect::Submit {
                purpose: RequestPurpose::Autosave {
                    form: self.form.clone(),
                },
                request: FormRequest::from_form(form),
            },
        ]
    }

    /// The in-flight save finished; success or not, the loop continues.
    pub fn save_completed(&mut self, outcome: &RequestOutcome) -> Vec<Effect> {
        self.last_outcome = Some(match outcome {
            Ok(_) => SaveOutcome::Saved,
            Err(_) => SaveOutcome::Failed,
        });
        match self.phase {
            AutosavePhase::Saving => {
                self.phase = AutosavePhase::Waiting;
                vec![self.schedule()]
            }
            AutosavePhase::Waiting | AutosavePhase::Cancelled => Vec::new(),
        }
    }

    pub fn cancel(&mut self) -> Vec<Effect> {
        if self.phase == AutosavePhase::Cancelled {
            return Vec::new();
        }
        self.phase = AutosavePhase::Cancelled;
        vec![Effect::CancelAutosave {
            form: self.form.clone(),
        }]
    }

    fn schedule(&self) -> Effect {
        Effect::ScheduleAutosaveTick {
            form: self.form.clone(),
            after: self.interval,
        }
    }
}

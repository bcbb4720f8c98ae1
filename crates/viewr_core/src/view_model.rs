use crate::{AutosavePhase, FeedbackId, FeedbackPhase, FormId, SaveOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageViewModel {
    pub autosave: Vec<AutosaveView>,
    pub feedback: Vec<FeedbackView>,
    pub requests_in_flight: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveView {
    pub form: FormId,
    pub phase: AutosavePhase,
    pub saves_issued: u64,
    pub last_outcome: Option<SaveOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackView {
    pub id: FeedbackId,
    pub text: String,
    pub phase: FeedbackPhase,
}

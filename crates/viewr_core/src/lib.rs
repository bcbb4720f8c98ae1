//! viewR page core: pure state machine for the requirement page's autosave,
//! fragment sync and feedback flows.
mod autosave;
mod clipboard;
mod effect;
mod feedback;
mod fingerprint;
mod form;
mod fragment;
mod msg;
mod navigation;
mod reply;
mod state;
mod update;
mod view_model;

pub use autosave::{AutosavePhase, AutosaveSession, SaveOutcome, DEFAULT_UPDATE_INTERVAL};
pub use clipboard::{CopyTracker, COPIED_PLACEHOLDER, COPY_RESTORE_DELAY};
pub use effect::Effect;
pub use feedback::{
    FeedbackEntry, FeedbackId, FeedbackPhase, Notifier, FEEDBACK_DISPLAY, FEEDBACK_FADE,
    GENERIC_ERROR_TEXT,
};
pub use fingerprint::{storage_key, Fingerprint};
pub use form::{FormId, FormRequest, FormSnapshot, Method, SubmittedForm};
pub use fragment::{FragmentKind, FragmentOp};
pub use msg::Msg;
pub use navigation::{path_form, ADD_REQ_URL};
pub use reply::{Reply, ReplyShape, RequestFailure, RequestOutcome, RequestPurpose};
pub use state::{PageSettings, PageState};
pub use update::update;
pub use view_model::{AutosaveView, FeedbackView, PageViewModel};

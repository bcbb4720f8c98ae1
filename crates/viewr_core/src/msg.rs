use crate::{FeedbackId, FormId, FragmentKind, RequestOutcome, RequestPurpose, SubmittedForm};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page finished loading; carries every watched form that exists on it.
    PageReady { autosave_forms: Vec<SubmittedForm> },
    /// Autosave timer fired for `form`.
    AutosaveTick {
        form: FormId,
        /// Current form content, `None` if the form has left the page.
        current: Option<SubmittedForm>,
        /// Fingerprint last written to the store, as stored.
        stored: Option<String>,
    },
    /// Page teardown (navigation) for one form's autosave loop.
    StopAutosave { form: FormId },
    /// User clicked a menu button with a `data-action` URL.
    MenuActionClicked {
        action: String,
        feedback_id: FeedbackId,
    },
    /// The requirement path selector changed.
    PathChanged { form: SubmittedForm },
    /// User clicked "add new requirement".
    AddNewReqClicked { form: SubmittedForm },
    /// User submitted an add-label or add-relation form.
    FragmentAddSubmitted {
        kind: FragmentKind,
        form: SubmittedForm,
    },
    /// User clicked a delete button inside a fragment region.
    FragmentDeleteClicked {
        kind: FragmentKind,
        form: SubmittedForm,
        key: String,
    },
    /// User clicked an index element; `html` is its current content.
    IndexClicked { element_id: String, html: String },
    /// A request issued through `Effect::Submit` finished.
    RequestCompleted {
        purpose: RequestPurpose,
        outcome: RequestOutcome,
    },
    FeedbackFadeDue { id: FeedbackId },
    FeedbackRemovalDue { id: FeedbackId },
    CopyRestoreDue { element_id: String },
}

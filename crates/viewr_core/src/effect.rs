use std::time::Duration;

use crate::{FeedbackId, Fingerprint, FormId, FormRequest, RequestPurpose};

/// Side effects requested by [`crate::update`], executed in order by the
/// platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write a fingerprint to the durable key-value store.
    StoreFingerprint { key: String, fingerprint: Fingerprint },
    /// Issue a request; its outcome comes back as `Msg::RequestCompleted`.
    Submit {
        purpose: RequestPurpose,
        request: FormRequest,
    },
    ScheduleAutosaveTick { form: FormId, after: Duration },
    CancelAutosave { form: FormId },
    ShowFeedback { id: FeedbackId, text: String },
    ScheduleFeedbackFade { id: FeedbackId, after: Duration },
    FadeFeedback { id: FeedbackId, duration: Duration },
    ScheduleFeedbackRemoval { id: FeedbackId, after: Duration },
    RemoveFeedback { id: FeedbackId },
    /// Replace a region (including its own element) with server markup.
    ReplaceRegion { region_id: String, html: String },
    ClearInput { input_id: String },
    ClearInlineErrors { form: FormId },
    AppendInlineError { form: FormId, message: String },
    Navigate { url: String },
    WriteClipboard { text: String },
    SetElementHtml { element_id: String, html: String },
    ScheduleCopyRestore { element_id: String, after: Duration },
}

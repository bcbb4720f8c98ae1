use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use viewr_core::{
    Effect, FeedbackId, FormId, Method, Reply, ReplyShape, RequestFailure, RequestOutcome,
};
use viewr_engine::{
    EngineHandle, HttpMethod, KeyValueStore, OutgoingRequest, ServerReply, TimerSet, Transport,
    TransportError,
};
use viewr_logging::{viewr_debug, viewr_error, viewr_info};

use super::app::PageEvent;
use super::dom::Dom;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TimerKey {
    Autosave(FormId),
    Feedback(FeedbackId),
    CopyRestore(String),
}

/// Executes core effects against the page, the store, the network and the
/// clock. Deferred results come back as [`PageEvent`]s.
pub struct EffectRunner {
    engine: EngineHandle,
    timers: TimerSet<TimerKey>,
    events: UnboundedSender<PageEvent>,
}

impl EffectRunner {
    pub fn new(transport: Arc<dyn Transport>, events: UnboundedSender<PageEvent>) -> Self {
        Self {
            engine: EngineHandle::new(transport),
            timers: TimerSet::new(),
            events,
        }
    }

    /// Applies effects in order. Store writes happen before any request
    /// issued later in the same batch is sent.
    pub fn run(&mut self, effects: Vec<Effect>, dom: &mut dyn Dom, store: &mut dyn KeyValueStore) {
        for effect in effects {
            self.apply(effect, dom, store);
        }
    }

    /// Cancels every pending timer; in-flight requests still report back.
    pub fn shutdown(&mut self) {
        self.timers.shutdown();
    }

    fn apply(&mut self, effect: Effect, dom: &mut dyn Dom, store: &mut dyn KeyValueStore) {
        match effect {
            Effect::StoreFingerprint { key, fingerprint } => {
                if let Err(err) = store.set(&key, &fingerprint.to_string()) {
                    viewr_error!("Failed to store {key}: {err}");
                }
            }
            Effect::Submit { purpose, request } => {
                let outgoing = OutgoingRequest {
                    method: map_method(request.method),
                    url: request.url,
                    body: request.body,
                    shape: map_shape(purpose.reply_shape()),
                };
                viewr_info!("Submit {:?} {} for {:?}", outgoing.method, outgoing.url, purpose);
                let events = self.events.clone();
                self.engine.submit(outgoing, move |result| {
                    let outcome = map_result(result);
                    let _ = events.send(PageEvent::RequestFinished { purpose, outcome });
                });
            }
            Effect::ScheduleAutosaveTick { form, after } => {
                let events = self.events.clone();
                let key = TimerKey::Autosave(form.clone());
                self.timers.schedule(key, after, move || {
                    let _ = events.send(PageEvent::AutosaveDue(form));
                });
            }
            Effect::CancelAutosave { form } => {
                viewr_info!("Autosave for {form} cancelled");
                self.timers.cancel(&TimerKey::Autosave(form));
            }
            Effect::ShowFeedback { id, text } => dom.append_feedback(&id, &text),
            Effect::ScheduleFeedbackFade { id, after } => {
                let events = self.events.clone();
                let key = TimerKey::Feedback(id.clone());
                self.timers.schedule(key, after, move || {
                    let _ = events.send(PageEvent::FeedbackFadeDue(id));
                });
            }
            Effect::FadeFeedback { id, duration } => dom.fade_feedback(&id, duration),
            Effect::ScheduleFeedbackRemoval { id, after } => {
                let events = self.events.clone();
                let key = TimerKey::Feedback(id.clone());
                self.timers.schedule(key, after, move || {
                    let _ = events.send(PageEvent::FeedbackRemovalDue(id));
                });
            }
            Effect::RemoveFeedback { id } => {
                dom.remove_feedback(&id);
                self.timers.cancel(&TimerKey::Feedback(id));
            }
            Effect::ReplaceRegion { region_id, html } => dom.replace_region(&region_id, &html),
            Effect::ClearInput { input_id } => {
                if !dom.set_input_value(&input_id, "") {
                    viewr_debug!("No input #{input_id} to clear");
                }
            }
            Effect::ClearInlineErrors { form } => dom.remove_inline_errors(&form),
            Effect::AppendInlineError { form, message } => dom.append_inline_error(&form, &message),
            Effect::Navigate { url } => {
                viewr_info!("Navigating to {url}");
                dom.navigate(&url);
            }
            Effect::WriteClipboard { text } => dom.write_clipboard(&text),
            Effect::SetElementHtml { element_id, html } => dom.set_element_html(&element_id, &html),
            Effect::ScheduleCopyRestore { element_id, after } => {
                let events = self.events.clone();
                let key = TimerKey::CopyRestore(element_id.clone());
                self.timers.schedule(key, after, move || {
                    let _ = events.send(PageEvent::CopyRestoreDue(element_id));
                });
            }
        }
    }
}

fn map_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::Get,
        Method::Post => HttpMethod::Post,
        Method::Put => HttpMethod::Put,
    }
}

fn map_shape(shape: ReplyShape) -> viewr_engine::ReplyShape {
    match shape {
        ReplyShape::Message => viewr_engine::ReplyShape::Message,
        ReplyShape::Status => viewr_engine::ReplyShape::Status,
        ReplyShape::NewRequirement => viewr_engine::ReplyShape::NewRequirement,
        ReplyShape::Fragment { field } => viewr_engine::ReplyShape::Fragment { field },
        ReplyShape::Ignored => viewr_engine::ReplyShape::Ignored,
    }
}

fn map_result(result: Result<ServerReply, TransportError>) -> RequestOutcome {
    match result {
        Ok(reply) => Ok(map_reply(reply)),
        Err(err) => Err(match err.status() {
            Some(status) => RequestFailure::with_status(status, err.to_string()),
            None => RequestFailure::new(err.to_string()),
        }),
    }
}

fn map_reply(reply: ServerReply) -> Reply {
    match reply {
        ServerReply::Message(message) => Reply::Message { message },
        ServerReply::Status { success, message } => Reply::Status { success, message },
        ServerReply::NewRequirement { url } => Reply::NewRequirement { url },
        ServerReply::Fragment {
            success,
            html,
            message,
        } => Reply::Fragment {
            success,
            html,
            message,
        },
        ServerReply::Empty => Reply::Empty,
    }
}

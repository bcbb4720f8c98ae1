use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use viewr_core::{
    storage_key, update, FeedbackId, FormId, Msg, PageSettings, PageState, PageViewModel,
    RequestOutcome, RequestPurpose,
};
use viewr_engine::{KeyValueStore, Transport};
use viewr_logging::{viewr_debug, viewr_info, viewr_trace, viewr_warn};

use super::dom::{Dom, DomEvent};
use super::effects::EffectRunner;
use super::router::{EventRouter, Route};

/// Everything that can wake the page up.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// Document ready: bind handlers and start the autosave loops.
    Ready,
    Dom(DomEvent),
    AutosaveDue(FormId),
    /// Teardown of one form's loop, e.g. on navigation away.
    StopAutosave(FormId),
    FeedbackFadeDue(FeedbackId),
    FeedbackRemovalDue(FeedbackId),
    CopyRestoreDue(String),
    RequestFinished {
        purpose: RequestPurpose,
        outcome: RequestOutcome,
    },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeSettings {
    pub page: PageSettings,
    /// Forms whose content is autosaved while the page is open.
    pub autosave_forms: Vec<FormId>,
}

/// One open page: the core state, the DOM it drives and the effect runner,
/// fed by a single event queue.
pub struct PageRuntime<D: Dom> {
    state: PageState,
    dom: D,
    store: Box<dyn KeyValueStore>,
    router: Option<EventRouter>,
    runner: EffectRunner,
    autosave_forms: Vec<FormId>,
    events_tx: UnboundedSender<PageEvent>,
    events_rx: UnboundedReceiver<PageEvent>,
}

impl<D: Dom> PageRuntime<D> {
    /// Must be called inside a tokio runtime; effects spawn tasks.
    pub fn new(
        dom: D,
        transport: Arc<dyn Transport>,
        store: Box<dyn KeyValueStore>,
        settings: RuntimeSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: PageState::new(settings.page),
            dom,
            store,
            router: None,
            runner: EffectRunner::new(transport, events_tx.clone()),
            autosave_forms: settings.autosave_forms,
            events_tx,
            events_rx,
        }
    }

    pub fn events(&self) -> UnboundedSender<PageEvent> {
        self.events_tx.clone()
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn view(&self) -> PageViewModel {
        self.state.view()
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Waits for the next queued event.
    pub async fn next_event(&mut self) -> Option<PageEvent> {
        self.events_rx.recv().await
    }

    /// Handles at most one event, waiting up to `within` for it. Returns
    /// false if nothing arrived.
    pub async fn process_next(&mut self, within: Duration) -> bool {
        match tokio::time::timeout(within, self.events_rx.recv()).await {
            Ok(Some(event)) => {
                self.handle_event(event);
                true
            }
            Ok(None) | Err(_) => false,
        }
    }

    /// Handles every event until `Shutdown`, then hands the page back.
    pub async fn run(mut self) -> D {
        while let Some(event) = self.events_rx.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }
        self.dom
    }

    /// Returns false once the page has shut down.
    pub fn handle_event(&mut self, event: PageEvent) -> bool {
        match event {
            PageEvent::Ready => self.on_ready(),
            PageEvent::Dom(event) => self.on_dom_event(event),
            PageEvent::AutosaveDue(form) => {
                let current = self.dom.form(&form);
                let stored = self.store.get(&storage_key(&form));
                self.dispatch(Msg::AutosaveTick {
                    form,
                    current,
                    stored,
                });
            }
            PageEvent::StopAutosave(form) => self.dispatch(Msg::StopAutosave { form }),
            PageEvent::FeedbackFadeDue(id) => self.dispatch(Msg::FeedbackFadeDue { id }),
            PageEvent::FeedbackRemovalDue(id) => self.dispatch(Msg::FeedbackRemovalDue { id }),
            PageEvent::CopyRestoreDue(element_id) => {
                self.dispatch(Msg::CopyRestoreDue { element_id })
            }
            PageEvent::RequestFinished { purpose, outcome } => {
                self.dispatch(Msg::RequestCompleted { purpose, outcome })
            }
            PageEvent::Shutdown => {
                for form in self.autosave_forms.clone() {
                    self.dispatch(Msg::StopAutosave { form });
                }
                self.runner.shutdown();
                viewr_info!("Page shut down");
                return false;
            }
        }
        true
    }

    fn on_ready(&mut self) {
        if self.router.is_some() {
            viewr_debug!("Page already ready");
            return;
        }
        self.router = Some(EventRouter::for_page());
        let autosave_forms = self
            .autosave_forms
            .iter()
            .filter_map(|id| {
                let form = self.dom.form(id);
                if form.is_none() {
                    viewr_debug!("No {id} on this page, not autosaving it");
                }
                form
            })
            .collect();
        self.dispatch(Msg::PageReady { autosave_forms });
    }

    fn on_dom_event(&mut self, event: DomEvent) {
        let Some(route) = self.router.as_ref().and_then(|router| router.route(&event)) else {
            viewr_trace!("Unhandled {event:?}");
            return;
        };
        if let Some(msg) = self.msg_for(route) {
            self.dispatch(msg);
        }
    }

    fn msg_for(&self, route: Route) -> Option<Msg> {
        let msg = match route {
            Route::MenuAction { action } => Msg::MenuActionClicked {
                action,
                feedback_id: FeedbackId::from_bits(rand::random()),
            },
            Route::CopyIndex { element_id } => {
                let html = self.dom.element_html(&element_id)?;
                Msg::IndexClicked { element_id, html }
            }
            Route::PathChanged { form } => Msg::PathChanged {
                form: self.read_form(&form)?,
            },
            Route::AddNewRequirement { form } => Msg::AddNewReqClicked {
                form: self.read_form(&form)?,
            },
            Route::FragmentAdd { kind, form } => Msg::FragmentAddSubmitted {
                kind,
                form: self.read_form(&form)?,
            },
            Route::FragmentDelete { kind, form, key } => Msg::FragmentDeleteClicked {
                kind,
                form: self.read_form(&form)?,
                key,
            },
        };
        Some(msg)
    }

    fn read_form(&self, form: &FormId) -> Option<viewr_core::SubmittedForm> {
        let found = self.dom.form(form);
        if found.is_none() {
            viewr_warn!("{form} is not on the page");
        }
        found
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.view();
        if state.consume_dirty() {
            viewr_trace!("{view:?}");
        }
        self.state = state;
        self.runner
            .run(effects, &mut self.dom, self.store.as_mut());
    }
}

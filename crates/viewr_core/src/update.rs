use crate::feedback::GENERIC_ERROR_TEXT;
use crate::fragment::{self, FragmentOp};
use crate::{navigation, AutosaveSession, Effect, Msg, PageState, Reply, RequestPurpose};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PageState, msg: Msg) -> (PageState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageReady { autosave_forms } => {
            let interval = state.settings().update_interval;
            let mut effects = Vec::with_capacity(autosave_forms.len() * 2);
            for form in autosave_forms {
                // Ready fires once per page view; a repeat must not restart a loop.
                if state.session(&form.id).is_some() {
                    continue;
                }
                let (session, started) = AutosaveSession::start(&form, interval);
                state.sessions_mut().insert(form.id.clone(), session);
                effects.extend(started);
            }
            effects
        }
        Msg::AutosaveTick {
            form,
            current,
            stored,
        } => match state.sessions_mut().get_mut(&form) {
            Some(session) => session.tick(current.as_ref(), stored.as_deref()),
            None => Vec::new(),
        },
        Msg::StopAutosave { form } => match state.sessions_mut().get_mut(&form) {
            Some(session) => session.cancel(),
            None => Vec::new(),
        },
        Msg::MenuActionClicked {
            action,
            feedback_id,
        } => vec![Effect::Submit {
            purpose: RequestPurpose::MenuAction { feedback_id },
            request: crate::FormRequest::post(action, String::new()),
        }],
        Msg::PathChanged { form } => vec![Effect::Submit {
            purpose: RequestPurpose::PathChange,
            request: navigation::path_change_request(&form),
        }],
        Msg::AddNewReqClicked { form } => vec![Effect::Submit {
            purpose: RequestPurpose::NewRequirement,
            request: navigation::new_requirement_request(&form),
        }],
        Msg::FragmentAddSubmitted { kind, form } => vec![Effect::Submit {
            purpose: RequestPurpose::FragmentAdd(kind),
            request: fragment::add_request(&form),
        }],
        Msg::FragmentDeleteClicked { kind, form, key } => vec![Effect::Submit {
            purpose: RequestPurpose::FragmentDelete(kind),
            request: fragment::delete_request(kind, &form, &key),
        }],
        Msg::IndexClicked { element_id, html } => state.copies_mut().copy(&element_id, &html),
        Msg::CopyRestoreDue { element_id } => state.copies_mut().restore_due(&element_id),
        Msg::RequestCompleted { purpose, outcome } => {
            state.request_finished();
            match purpose {
                RequestPurpose::MenuAction { feedback_id } => {
                    let text = match outcome {
                        Ok(Reply::Message { message }) => message,
                        Ok(_) | Err(_) => GENERIC_ERROR_TEXT.to_string(),
                    };
                    state.notifier_mut().notify(feedback_id, text)
                }
                RequestPurpose::Autosave { form } => match state.sessions_mut().get_mut(&form) {
                    Some(session) => session.save_completed(&outcome),
                    None => Vec::new(),
                },
                RequestPurpose::PathChange => navigation::apply_path_outcome(outcome),
                RequestPurpose::NewRequirement => {
                    navigation::apply_new_requirement_outcome(outcome)
                }
                RequestPurpose::FragmentAdd(kind) => {
                    fragment::apply_outcome(kind, FragmentOp::Add, outcome)
                }
                RequestPurpose::FragmentDelete(kind) => {
                    fragment::apply_outcome(kind, FragmentOp::Delete, outcome)
                }
            }
        }
        Msg::FeedbackFadeDue { id } => state.notifier_mut().fade_due(&id),
        Msg::FeedbackRemovalDue { id } => state.notifier_mut().remove_due(&id),
    };

    for effect in &effects {
        if matches!(effect, Effect::Submit { .. }) {
            state.request_started();
        }
    }
    if !effects.is_empty() {
        state.mark_dirty();
    }

    (state, effects)
}

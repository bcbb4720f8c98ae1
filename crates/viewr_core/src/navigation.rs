use crate::feedback::GENERIC_ERROR_TEXT;
use crate::{Effect, FormId, FormRequest, Reply, RequestOutcome, SubmittedForm};

/// Endpoint creating a requirement next to the one being viewed.
pub const ADD_REQ_URL: &str = "/viewR/ajax_add_req";

pub fn path_form() -> FormId {
    FormId::new("req_path_form")
}

pub fn path_change_request(form: &SubmittedForm) -> FormRequest {
    FormRequest::from_form(form)
}

pub fn new_requirement_request(form: &SubmittedForm) -> FormRequest {
    FormRequest::post(ADD_REQ_URL, form.snapshot.serialize())
}

/// Clears the previous inline error, then shows a new one unless the server
/// accepted the path.
pub fn apply_path_outcome(outcome: RequestOutcome) -> Vec<Effect> {
    let form = path_form();
    let mut effects = vec![Effect::ClearInlineErrors { form: form.clone() }];
    let message = match outcome {
        Ok(Reply::Status { success: true, .. }) => return effects,
        Ok(Reply::Status {
            success: false,
            message,
        }) => message
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| GENERIC_ERROR_TEXT.to_string()),
        Ok(_) | Err(_) => GENERIC_ERROR_TEXT.to_string(),
    };
    effects.push(Effect::AppendInlineError { form, message });
    effects
}

pub fn apply_new_requirement_outcome(outcome: RequestOutcome) -> Vec<Effect> {
    match outcome {
        Ok(Reply::NewRequirement { url: Some(url) }) if !url.is_empty() => {
            vec![Effect::Navigate { url }]
        }
        Ok(_) | Err(_) => {
            let form = path_form();
            vec![
                Effect::ClearInlineErrors { form: form.clone() },
                Effect::AppendInlineError {
                    form,
                    message: GENERIC_ERROR_TEXT.to_string(),
                },
            ]
        }
    }
}

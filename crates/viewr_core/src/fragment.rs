//! Add/delete flows for the server-rendered label and relation lists.
//!
//! The client never edits a fragment: after every successful mutation the
//! whole region is replaced by the markup the server returned.

use crate::feedback::GENERIC_ERROR_TEXT;
use crate::{Effect, FormId, FormRequest, Reply, RequestOutcome, SubmittedForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FragmentKind {
    Labels,
    Relations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOp {
    Add,
    Delete,
}

impl FragmentKind {
    pub const ALL: [FragmentKind; 2] = [FragmentKind::Labels, FragmentKind::Relations];

    pub fn region_id(self) -> &'static str {
        match self {
            FragmentKind::Labels => "req_label",
            FragmentKind::Relations => "req_relation",
        }
    }

    pub fn add_form(self) -> FormId {
        match self {
            FragmentKind::Labels => FormId::new("add_req_label_form"),
            FragmentKind::Relations => FormId::new("add_req_relation_form"),
        }
    }

    pub fn delete_form(self) -> FormId {
        match self {
            FragmentKind::Labels => FormId::new("delete_req_label_form"),
            FragmentKind::Relations => FormId::new("delete_req_relation_form"),
        }
    }

    /// Field appended to the delete form carrying the item key.
    pub fn delete_field(self) -> &'static str {
        match self {
            FragmentKind::Labels => "label",
            FragmentKind::Relations => "delete",
        }
    }

    /// Class of the delete buttons rendered inside the region.
    pub fn delete_button_class(self) -> &'static str {
        match self {
            FragmentKind::Labels => "delete-label",
            FragmentKind::Relations => "delete-relation",
        }
    }

    /// Attribute of a delete button holding the item key.
    pub fn key_attribute(self) -> &'static str {
        match self {
            FragmentKind::Labels => "data-label",
            FragmentKind::Relations => "data-index",
        }
    }

    /// JSON field of the reply holding the new fragment.
    pub fn reply_field(self) -> &'static str {
        match self {
            FragmentKind::Labels => "req_label",
            FragmentKind::Relations => "req_relation",
        }
    }

    /// Free-text inputs emptied after a successful add.
    pub fn cleared_inputs(self) -> &'static [&'static str] {
        match self {
            FragmentKind::Labels => &["id_new_label"],
            FragmentKind::Relations => &["id_new_parent", "id_new_child", "id_new_related"],
        }
    }

    pub fn form_for(self, op: FragmentOp) -> FormId {
        match op {
            FragmentOp::Add => self.add_form(),
            FragmentOp::Delete => self.delete_form(),
        }
    }
}

pub fn add_request(form: &SubmittedForm) -> FormRequest {
    FormRequest::from_form(form)
}

/// Delete requests are always POSTed, with the key appended after the form's
/// own fields.
pub fn delete_request(kind: FragmentKind, form: &SubmittedForm, key: &str) -> FormRequest {
    let snapshot = form.snapshot.clone().with_field(kind.delete_field(), key);
    FormRequest::post(form.action.clone(), snapshot.serialize())
}

/// Effects for a finished add or delete.
///
/// Failures of either kind leave the region untouched and put an inline error
/// on the submitting form.
pub fn apply_outcome(kind: FragmentKind, op: FragmentOp, outcome: RequestOutcome) -> Vec<Effect> {
    let form = kind.form_for(op);
    let mut effects = vec![Effect::ClearInlineErrors { form: form.clone() }];

    let failure = match outcome {
        Ok(Reply::Fragment {
            success: true,
            html: Some(html),
            ..
        }) => {
            effects.push(Effect::ReplaceRegion {
                region_id: kind.region_id().to_string(),
                html,
            });
            if op == FragmentOp::Add {
                effects.extend(kind.cleared_inputs().iter().map(|input| Effect::ClearInput {
                    input_id: (*input).to_string(),
                }));
            }
            return effects;
        }
        Ok(Reply::Fragment {
            success: false,
            message: Some(message),
            ..
        }) if !message.is_empty() => message,
        Ok(_) | Err(_) => GENERIC_ERROR_TEXT.to_string(),
    };

    effects.push(Effect::AppendInlineError {
        form,
        message: failure,
    });
    effects
}

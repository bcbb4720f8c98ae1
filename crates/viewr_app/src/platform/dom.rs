//! The slice of a page's DOM the client reads and patches.

use std::collections::BTreeMap;
use std::time::Duration;

use viewr_core::{FeedbackId, FormId, SubmittedForm};

/// Element receiving feedback bubbles.
pub const FEEDBACK_CONTAINER_ID: &str = "menu_section";
/// Class of inline error elements appended to forms.
pub const ERROR_MESSAGE_CLASS: &str = "error_message";

pub trait Dom: Send {
    /// Reads a form's method, action and successful controls.
    fn form(&self, form: &FormId) -> Option<SubmittedForm>;
    fn element_html(&self, element_id: &str) -> Option<String>;
    fn set_element_html(&mut self, element_id: &str, html: &str);
    /// Replaces the region element itself (not only its content) with `html`.
    fn replace_region(&mut self, region_id: &str, html: &str);
    /// Returns false if no such input exists.
    fn set_input_value(&mut self, input_id: &str, value: &str) -> bool;
    fn remove_inline_errors(&mut self, form: &FormId);
    fn append_inline_error(&mut self, form: &FormId, message: &str);
    fn append_feedback(&mut self, id: &FeedbackId, text: &str);
    fn fade_feedback(&mut self, id: &FeedbackId, duration: Duration);
    fn remove_feedback(&mut self, id: &FeedbackId);
    fn write_clipboard(&mut self, text: &str);
    fn navigate(&mut self, url: &str);
}

/// Element an event was dispatched on, with what delegated handlers need to
/// match it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventTarget {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    /// Ids of enclosing elements, nearest first.
    pub ancestor_ids: Vec<String>,
}

impl EventTarget {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_within(&self, ancestor_id: &str) -> bool {
        self.ancestor_ids.iter().any(|id| id == ancestor_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    Click(EventTarget),
    Submit { form_id: String },
    Change { element_id: String },
}

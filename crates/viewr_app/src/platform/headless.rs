//! In-memory page built from server markup, for the console and for tests.
//!
//! Only what the client touches is modelled: forms and their controls, the
//! fragment regions, elements addressable by id, the feedback container,
//! the clipboard and the location.

use std::collections::BTreeMap;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use viewr_core::{FeedbackId, FormId, FormSnapshot, FragmentKind, Method, SubmittedForm};
use viewr_logging::{viewr_debug, viewr_warn};

use super::dom::{Dom, EventTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldKind {
    Value,
    Checkable { checked: bool },
    /// `<select multiple>`: one pair per selected option.
    Choices { selected: Vec<String> },
    /// Buttons, files and other controls never serialized.
    Inert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement {
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: String,
    pub disabled: bool,
    kind: FieldKind,
}

impl FieldElement {
    /// Values the control contributes to the form's serialization, in
    /// option order. Empty for controls that are not successful.
    pub fn submitted_values(&self) -> Vec<&str> {
        if self.disabled || self.name.as_deref().map_or(true, str::is_empty) {
            return Vec::new();
        }
        match &self.kind {
            FieldKind::Value | FieldKind::Checkable { checked: true } => vec![self.value.as_str()],
            FieldKind::Choices { selected } => selected.iter().map(String::as_str).collect(),
            FieldKind::Checkable { checked: false } | FieldKind::Inert => Vec::new(),
        }
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        if let FieldKind::Choices { selected } = &mut self.kind {
            *selected = vec![value.to_string()];
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormElement {
    pub id: String,
    pub action: String,
    pub method: String,
    pub fields: Vec<FieldElement>,
    pub errors: Vec<String>,
}

impl FormElement {
    /// The form data set a browser would submit. Line breaks in values are
    /// sent as CRLF.
    pub fn snapshot(&self) -> FormSnapshot {
        let mut snapshot = FormSnapshot::new();
        for field in &self.fields {
            let Some(name) = field.name.as_deref() else {
                continue;
            };
            for value in field.submitted_values() {
                snapshot.push(name, crlf_line_breaks(value));
            }
        }
        snapshot
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackElement {
    pub id: FeedbackId,
    pub text: String,
    pub fading: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessDom {
    /// Page markup as loaded, used to find targets outside the regions.
    document: String,
    forms: BTreeMap<String, FormElement>,
    /// Region id to the region's outer HTML.
    regions: BTreeMap<String, String>,
    /// Other elements with an id, to their inner HTML.
    elements: BTreeMap<String, String>,
    feedback: Vec<FeedbackElement>,
    clipboard: Option<String>,
    location: Option<String>,
}

impl HeadlessDom {
    pub fn from_html(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let mut dom = HeadlessDom {
            document: html.to_string(),
            ..HeadlessDom::default()
        };

        let region_ids: Vec<&str> = FragmentKind::ALL.iter().map(|kind| kind.region_id()).collect();

        if let (Some(form_sel), Some(control_sel)) = (
            parse_selector("form[id]"),
            parse_selector("input, textarea, select"),
        ) {
            for form in doc.select(&form_sel) {
                let Some(id) = form.value().id() else {
                    continue;
                };
                let element = FormElement {
                    id: id.to_string(),
                    action: form.value().attr("action").unwrap_or_default().to_string(),
                    method: form.value().attr("method").unwrap_or_default().to_string(),
                    fields: form.select(&control_sel).map(parse_field).collect(),
                    errors: Vec::new(),
                };
                dom.forms.insert(id.to_string(), element);
            }
        }

        if let Some(id_sel) = parse_selector("[id]") {
            for element in doc.select(&id_sel) {
                let Some(id) = element.value().id() else {
                    continue;
                };
                if region_ids.contains(&id) {
                    dom.regions.insert(id.to_string(), element.html());
                } else if !dom.forms.contains_key(id) && !within_any(&element, &region_ids) {
                    dom.elements.insert(id.to_string(), element.inner_html());
                }
            }
        }

        viewr_debug!(
            "Loaded page: {} forms, {} regions, {} elements",
            dom.forms.len(),
            dom.regions.len(),
            dom.elements.len()
        );
        dom
    }

    /// Every element matching `css`, as event targets. Region content is
    /// searched in its current (possibly replaced) state.
    pub fn find_targets(&self, css: &str) -> Vec<EventTarget> {
        let Some(selector) = parse_selector(css) else {
            viewr_warn!("Invalid selector {css:?}");
            return Vec::new();
        };
        let region_ids: Vec<&str> = FragmentKind::ALL.iter().map(|kind| kind.region_id()).collect();

        let doc = Html::parse_document(&self.document);
        let mut targets: Vec<EventTarget> = doc
            .select(&selector)
            .filter(|element| {
                let id = element.value().id().unwrap_or_default();
                !region_ids.contains(&id) && !within_any(element, &region_ids)
            })
            .map(target_from)
            .collect();

        for region in self.regions.values() {
            let fragment = Html::parse_fragment(region);
            targets.extend(fragment.select(&selector).map(target_from));
        }
        targets
    }

    pub fn form_element(&self, form_id: &str) -> Option<&FormElement> {
        self.forms.get(form_id)
    }

    pub fn region_html(&self, region_id: &str) -> Option<&str> {
        self.regions.get(region_id).map(String::as_str)
    }

    pub fn input_value(&self, input_id: &str) -> Option<&str> {
        self.forms
            .values()
            .flat_map(|form| form.fields.iter())
            .find(|field| field.id.as_deref() == Some(input_id))
            .map(|field| field.value.as_str())
    }

    pub fn inline_errors(&self, form_id: &str) -> &[String] {
        self.forms
            .get(form_id)
            .map(|form| form.errors.as_slice())
            .unwrap_or_default()
    }

    pub fn feedback(&self) -> &[FeedbackElement] {
        &self.feedback
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Plain-text dump of the patched parts of the page.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (id, html) in &self.regions {
            out.push_str(&format!("region #{id}: {html}\n"));
        }
        for form in self.forms.values() {
            for error in &form.errors {
                out.push_str(&format!("error on #{}: {error}\n", form.id));
            }
        }
        for entry in &self.feedback {
            let state = if entry.fading.is_some() { "fading" } else { "shown" };
            out.push_str(&format!("feedback {} ({state}): {}\n", entry.id, entry.text));
        }
        if let Some(text) = &self.clipboard {
            out.push_str(&format!("clipboard: {text}\n"));
        }
        if let Some(url) = &self.location {
            out.push_str(&format!("location: {url}\n"));
        }
        out
    }
}

impl Dom for HeadlessDom {
    fn form(&self, form: &FormId) -> Option<SubmittedForm> {
        self.forms.get(form.as_str()).map(|element| SubmittedForm {
            id: form.clone(),
            action: element.action.clone(),
            method: Method::from_attr(&element.method),
            snapshot: element.snapshot(),
        })
    }

    fn element_html(&self, element_id: &str) -> Option<String> {
        self.elements.get(element_id).cloned()
    }

    fn set_element_html(&mut self, element_id: &str, html: &str) {
        match self.elements.get_mut(element_id) {
            Some(content) => *content = html.to_string(),
            None => viewr_warn!("No element #{element_id} to update"),
        }
    }

    fn replace_region(&mut self, region_id: &str, html: &str) {
        if self.regions.remove(region_id).is_none() {
            viewr_warn!("No region #{region_id} to replace");
            return;
        }
        let fragment = Html::parse_fragment(html);
        let new_id = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .and_then(|root| root.value().id().map(str::to_string));
        match new_id {
            Some(id) => {
                self.regions.insert(id, html.to_string());
            }
            None => viewr_warn!("Replacement for #{region_id} has no id; region is gone"),
        }
    }

    fn set_input_value(&mut self, input_id: &str, value: &str) -> bool {
        let field = self
            .forms
            .values_mut()
            .flat_map(|form| form.fields.iter_mut())
            .find(|field| field.id.as_deref() == Some(input_id));
        match field {
            Some(field) => {
                field.set_value(value);
                true
            }
            None => false,
        }
    }

    fn remove_inline_errors(&mut self, form: &FormId) {
        if let Some(element) = self.forms.get_mut(form.as_str()) {
            element.errors.clear();
        }
    }

    fn append_inline_error(&mut self, form: &FormId, message: &str) {
        match self.forms.get_mut(form.as_str()) {
            Some(element) => element.errors.push(message.to_string()),
            None => viewr_warn!("No form {form} for error {message:?}"),
        }
    }

    fn append_feedback(&mut self, id: &FeedbackId, text: &str) {
        self.feedback.push(FeedbackElement {
            id: id.clone(),
            text: text.to_string(),
            fading: None,
        });
    }

    fn fade_feedback(&mut self, id: &FeedbackId, duration: Duration) {
        if let Some(entry) = self.feedback.iter_mut().find(|entry| &entry.id == id) {
            entry.fading = Some(duration);
        }
    }

    fn remove_feedback(&mut self, id: &FeedbackId) {
        if let Some(position) = self.feedback.iter().position(|entry| &entry.id == id) {
            self.feedback.remove(position);
        }
    }

    fn write_clipboard(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }

    fn navigate(&mut self, url: &str) {
        self.location = Some(url.to_string());
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn within_any(element: &ElementRef<'_>, ids: &[&str]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter_map(|ancestor| ancestor.value().id())
        .any(|id| ids.contains(&id))
}

fn target_from(element: ElementRef<'_>) -> EventTarget {
    let value = element.value();
    EventTarget {
        tag: value.name().to_string(),
        id: value.id().map(str::to_string),
        classes: value.classes().map(str::to_string).collect(),
        attributes: value
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        ancestor_ids: element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .filter_map(|ancestor| ancestor.value().id().map(str::to_string))
            .collect(),
    }
}

fn parse_field(element: ElementRef<'_>) -> FieldElement {
    let value = element.value();
    let id = value.id().map(str::to_string);
    let name = value.attr("name").map(str::to_string);
    let disabled = value.attr("disabled").is_some();

    let (current, kind) = match value.name() {
        "textarea" => (element.text().collect::<String>(), FieldKind::Value),
        "select" if value.attr("multiple").is_some() => {
            let selected = selected_options(element);
            (
                selected.first().cloned().unwrap_or_default(),
                FieldKind::Choices { selected },
            )
        }
        "select" => (selected_option(element), FieldKind::Value),
        _ => {
            let input_type = value.attr("type").unwrap_or("text").to_ascii_lowercase();
            let raw = value.attr("value");
            match input_type.as_str() {
                "checkbox" | "radio" => (
                    raw.unwrap_or("on").to_string(),
                    FieldKind::Checkable {
                        checked: value.attr("checked").is_some(),
                    },
                ),
                "submit" | "button" | "reset" | "file" | "image" => {
                    (raw.unwrap_or_default().to_string(), FieldKind::Inert)
                }
                _ => (raw.unwrap_or_default().to_string(), FieldKind::Value),
            }
        }
    };

    FieldElement {
        id,
        name,
        value: current,
        disabled,
        kind,
    }
}

fn options(select: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    match parse_selector("option") {
        Some(option_sel) => select.select(&option_sel).collect(),
        None => Vec::new(),
    }
}

fn option_value(option: &ElementRef<'_>) -> String {
    option
        .value()
        .attr("value")
        .map(str::to_string)
        .unwrap_or_else(|| option.text().collect::<String>().trim().to_string())
}

fn is_selected(option: &ElementRef<'_>) -> bool {
    option.value().attr("selected").is_some()
}

/// A single select sends its selected option, or its first one.
fn selected_option(select: ElementRef<'_>) -> String {
    let options = options(select);
    options
        .iter()
        .find(|option| is_selected(option))
        .or_else(|| options.first())
        .map(option_value)
        .unwrap_or_default()
}

fn selected_options(select: ElementRef<'_>) -> Vec<String> {
    options(select)
        .iter()
        .filter(|option| is_selected(option))
        .map(option_value)
        .collect()
}

fn crlf_line_breaks(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\n', "\r\n")
}

#[cfg(test)]
mod tests {
    use super::HeadlessDom;
    use crate::platform::dom::Dom;
    use viewr_core::{FormId, Method};

    const PAGE: &str = r#"
        <html><body>
        <form id="req_path_form" method="post" action="/viewR/ajax/req_path/1.2">
            <input type="hidden" name="index" value="1.2">
            <select id="id_path" name="path">
                <option value="a.md">a</option>
                <option value="b.md" selected>b</option>
            </select>
            <input type="checkbox" name="draft">
            <input type="checkbox" name="active" value="yes" checked>
            <input type="text" name="locked" value="x" disabled>
            <input type="submit" name="go" value="Go">
        </form>
        <form id="req_text_form" method="post" action="/viewR/ajax/req_text/1.2">
            <textarea id="id_text" name="text">The system shall save.</textarea>
        </form>
        <div id="req_label"><button class="delete-label" data-label="x">x</button></div>
        <div class="index" id="1.2">1.2</div>
        </body></html>
    "#;

    #[test]
    fn serializes_only_successful_controls() {
        let dom = HeadlessDom::from_html(PAGE);
        let form = dom.form(&FormId::new("req_path_form")).unwrap();
        assert_eq!(form.method, Method::Post);
        assert_eq!(form.action, "/viewR/ajax/req_path/1.2");
        assert_eq!(form.snapshot.serialize(), "index=1.2&path=b.md&active=yes");
    }

    #[test]
    fn textarea_content_is_its_value() {
        let dom = HeadlessDom::from_html(PAGE);
        let form = dom.form(&FormId::new("req_text_form")).unwrap();
        assert_eq!(
            form.snapshot.serialize(),
            "text=The+system+shall+save."
        );
    }

    #[test]
    fn multiline_text_and_multiple_select_serialize_like_a_browser() {
        let mut dom = HeadlessDom::from_html(
            r#"<form id="req_text_form" method="post" action="/viewR/ajax/req_text/1.2">
                <textarea id="t" name="text"></textarea>
                <select name="tags" multiple>
                    <option value="a" selected>A</option>
                    <option value="b" selected>B</option>
                    <option value="c">C</option>
                </select>
                <select name="none" multiple><option value="x">X</option></select>
            </form>"#,
        );
        assert!(dom.set_input_value("t", "line1\nline2\r\nline3"));

        let form = dom.form(&FormId::new("req_text_form")).unwrap();
        assert_eq!(
            form.snapshot.serialize(),
            "text=line1%0D%0Aline2%0D%0Aline3&tags=a&tags=b"
        );
    }

    #[test]
    fn missing_form_is_none() {
        let dom = HeadlessDom::from_html(PAGE);
        assert!(dom.form(&FormId::new("add_req_label_form")).is_none());
    }

    #[test]
    fn region_replacement_rekeys_by_fragment_id() {
        let mut dom = HeadlessDom::from_html(PAGE);
        dom.replace_region("req_label", "<div id='req_label'>X</div>");
        assert_eq!(dom.region_html("req_label"), Some("<div id='req_label'>X</div>"));
        assert!(dom.find_targets("button.delete-label").is_empty());
    }

    #[test]
    fn targets_inside_regions_know_their_region() {
        let dom = HeadlessDom::from_html(PAGE);
        let targets = dom.find_targets("button.delete-label");
        assert_eq!(targets.len(), 1);
        assert!(targets[0].is_within("req_label"));
        assert_eq!(targets[0].attribute("data-label"), Some("x"));
    }

    #[test]
    fn elements_by_id_are_editable() {
        let mut dom = HeadlessDom::from_html(PAGE);
        assert_eq!(dom.element_html("1.2").as_deref(), Some("1.2"));
        dom.set_element_html("1.2", "copied");
        assert_eq!(dom.element_html("1.2").as_deref(), Some("copied"));
    }

    #[test]
    fn input_values_can_be_set_and_cleared() {
        let mut dom = HeadlessDom::from_html(PAGE);
        assert!(dom.set_input_value("id_text", "changed"));
        assert_eq!(dom.input_value("id_text"), Some("changed"));
        assert!(!dom.set_input_value("id_missing", ""));
    }
}

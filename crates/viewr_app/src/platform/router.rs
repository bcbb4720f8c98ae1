//! Delegated event bindings.
//!
//! Every handler is bound once, at page ready, against the document and
//! matched by selector when an event arrives. Fragment regions can be
//! replaced any number of times without rebinding, so a delete button always
//! has exactly one handler.

use viewr_core::{path_form, FormId, FragmentKind};

use super::dom::{DomEvent, EventTarget};

const MENU_BUTTON_CLASS: &str = "menu-button";
const INDEX_CLASS: &str = "index";
const PATH_INPUT_ID: &str = "id_path";
const ADD_NEW_REQ_ID: &str = "add_new_req";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// `button.menu-button` click, action from `data-action`.
    MenuButton,
    /// `div.index` click.
    IndexCopy,
    /// `#id_path` change.
    PathChange,
    /// `#add_new_req` click.
    AddNewRequirement,
    /// Submit of the kind's add form.
    FragmentAdd(FragmentKind),
    /// Click on the kind's delete button, scoped to its region.
    FragmentDelete(FragmentKind),
}

/// What a matched binding asks the runtime to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    MenuAction { action: String },
    CopyIndex { element_id: String },
    PathChanged { form: FormId },
    AddNewRequirement { form: FormId },
    FragmentAdd { kind: FragmentKind, form: FormId },
    FragmentDelete { kind: FragmentKind, form: FormId, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventRouter {
    bindings: Vec<Binding>,
}

impl EventRouter {
    /// The page's full set of delegated bindings.
    pub fn for_page() -> Self {
        let mut bindings = vec![
            Binding::MenuButton,
            Binding::IndexCopy,
            Binding::PathChange,
            Binding::AddNewRequirement,
        ];
        for kind in FragmentKind::ALL {
            bindings.push(Binding::FragmentAdd(kind));
            bindings.push(Binding::FragmentDelete(kind));
        }
        Self { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Every binding whose handler would run for `event`.
    pub fn matching<'a>(&'a self, event: &'a DomEvent) -> impl Iterator<Item = Route> + 'a {
        self.bindings
            .iter()
            .filter_map(move |binding| binding.route(event))
    }

    /// The route for `event`, if any binding handles it.
    pub fn route(&self, event: &DomEvent) -> Option<Route> {
        self.matching(event).next()
    }
}

impl Binding {
    fn route(self, event: &DomEvent) -> Option<Route> {
        match (self, event) {
            (Binding::MenuButton, DomEvent::Click(target))
                if target.tag == "button" && target.has_class(MENU_BUTTON_CLASS) =>
            {
                target.attribute("data-action").map(|action| Route::MenuAction {
                    action: action.to_string(),
                })
            }
            (Binding::IndexCopy, DomEvent::Click(target))
                if target.tag == "div" && target.has_class(INDEX_CLASS) =>
            {
                target.id.clone().map(|element_id| Route::CopyIndex { element_id })
            }
            (Binding::PathChange, DomEvent::Change { element_id }) if element_id == PATH_INPUT_ID => {
                Some(Route::PathChanged { form: path_form() })
            }
            (Binding::AddNewRequirement, DomEvent::Click(target))
                if target.id.as_deref() == Some(ADD_NEW_REQ_ID) =>
            {
                Some(Route::AddNewRequirement { form: path_form() })
            }
            (Binding::FragmentAdd(kind), DomEvent::Submit { form_id })
                if FormId::new(form_id.as_str()) == kind.add_form() =>
            {
                Some(Route::FragmentAdd {
                    kind,
                    form: kind.add_form(),
                })
            }
            (Binding::FragmentDelete(kind), DomEvent::Click(target)) => {
                delete_key(kind, target).map(|key| Route::FragmentDelete {
                    kind,
                    form: kind.delete_form(),
                    key,
                })
            }
            _ => None,
        }
    }
}

fn delete_key(kind: FragmentKind, target: &EventTarget) -> Option<String> {
    if target.tag != "button"
        || !target.has_class(kind.delete_button_class())
        || !target.is_within(kind.region_id())
    {
        return None;
    }
    target.attribute(kind.key_attribute()).map(str::to_string)
}

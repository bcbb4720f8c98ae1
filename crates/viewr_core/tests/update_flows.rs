use std::time::Duration;

use pretty_assertions::assert_eq;
use viewr_core::{
    update, Effect, FeedbackId, FeedbackPhase, FormId, FormRequest, FormSnapshot, FragmentKind,
    Method, Msg, PageState, Reply, RequestFailure, RequestPurpose, SubmittedForm,
};

fn init_logging() {
    viewr_logging::initialize_for_tests();
}

fn relation_delete_form() -> SubmittedForm {
    SubmittedForm {
        id: FragmentKind::Relations.delete_form(),
        action: "/viewR/ajax/delete_req_relation/1.2".to_string(),
        method: Method::Post,
        snapshot: FormSnapshot::from_pairs([("index", "1.2")]),
    }
}

#[test]
fn stop_for_unwatched_form_leaves_state_clean() {
    init_logging();
    let (mut state, effects) = update(
        PageState::default(),
        Msg::StopAutosave {
            form: FormId::new("req_text_form"),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.view().dirty);
    assert!(!state.consume_dirty());
}

#[test]
fn view_reports_dirty_until_consumed() {
    init_logging();
    let (mut state, _) = update(
        PageState::default(),
        Msg::IndexClicked {
            element_id: "1.2".to_string(),
            html: "1.2".to_string(),
        },
    );
    assert!(state.view().dirty);
    assert!(state.consume_dirty());
    assert!(!state.view().dirty);
}

#[test]
fn menu_action_posts_empty_body() {
    init_logging();
    let (state, effects) = update(
        PageState::default(),
        Msg::MenuActionClicked {
            action: "/viewR/write_pdf".to_string(),
            feedback_id: FeedbackId::new("k3x9"),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Submit {
            purpose: RequestPurpose::MenuAction {
                feedback_id: FeedbackId::new("k3x9")
            },
            request: FormRequest {
                method: Method::Post,
                url: "/viewR/write_pdf".to_string(),
                body: String::new(),
            },
        }]
    );
    assert_eq!(state.requests_in_flight(), 1);
}

#[test]
fn menu_reply_message_is_shown() {
    init_logging();
    let (state, effects) = update(
        PageState::default(),
        Msg::RequestCompleted {
            purpose: RequestPurpose::MenuAction {
                feedback_id: FeedbackId::new("k3x9"),
            },
            outcome: Ok(Reply::Message {
                message: "PDF written".to_string(),
            }),
        },
    );
    assert_eq!(
        effects[0],
        Effect::ShowFeedback {
            id: FeedbackId::new("k3x9"),
            text: "PDF written".to_string(),
        }
    );
    assert_eq!(state.view().feedback[0].text, "PDF written");
}

#[test]
fn menu_transport_error_shows_error_for_six_seconds() {
    init_logging();
    let id = FeedbackId::new("z0");
    let (state, effects) = update(
        PageState::default(),
        Msg::RequestCompleted {
            purpose: RequestPurpose::MenuAction {
                feedback_id: id.clone(),
            },
            outcome: Err(RequestFailure::new("connection refused")),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::ShowFeedback {
                id: id.clone(),
                text: "Error".to_string(),
            },
            Effect::ScheduleFeedbackFade {
                id: id.clone(),
                after: Duration::from_millis(5000),
            },
        ]
    );

    let (state, effects) = update(state, Msg::FeedbackFadeDue { id: id.clone() });
    assert_eq!(
        effects,
        vec![
            Effect::FadeFeedback {
                id: id.clone(),
                duration: Duration::from_millis(1000),
            },
            Effect::ScheduleFeedbackRemoval {
                id: id.clone(),
                after: Duration::from_millis(1000),
            },
        ]
    );
    assert_eq!(state.view().feedback[0].phase, FeedbackPhase::Fading);

    let (state, effects) = update(state, Msg::FeedbackRemovalDue { id: id.clone() });
    assert_eq!(effects, vec![Effect::RemoveFeedback { id }]);
    assert!(state.view().feedback.is_empty());
}

#[test]
fn add_label_replaces_region_and_clears_input() {
    init_logging();
    let fragment = "<div id='req_label'>X</div>".to_string();
    let (_, effects) = update(
        PageState::default(),
        Msg::RequestCompleted {
            purpose: RequestPurpose::FragmentAdd(FragmentKind::Labels),
            outcome: Ok(Reply::Fragment {
                success: true,
                html: Some(fragment.clone()),
                message: None,
            }),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::ClearInlineErrors {
                form: FormId::new("add_req_label_form")
            },
            Effect::ReplaceRegion {
                region_id: "req_label".to_string(),
                html: fragment,
            },
            Effect::ClearInput {
                input_id: "id_new_label".to_string()
            },
        ]
    );
}

#[test]
fn add_relation_clears_all_three_inputs() {
    init_logging();
    let (_, effects) = update(
        PageState::default(),
        Msg::RequestCompleted {
            purpose: RequestPurpose::FragmentAdd(FragmentKind::Relations),
            outcome: Ok(Reply::Fragment {
                success: true,
                html: Some("<div id=\"req_relation\"></div>".to_string()),
                message: None,
            }),
        },
    );
    let cleared: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::ClearInput { input_id } => Some(input_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(cleared, vec!["id_new_parent", "id_new_child", "id_new_related"]);
}

#[test]
fn delete_relation_appends_index() {
    init_logging();
    let (_, effects) = update(
        PageState::default(),
        Msg::FragmentDeleteClicked {
            kind: FragmentKind::Relations,
            form: relation_delete_form(),
            key: "2".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Submit {
            purpose: RequestPurpose::FragmentDelete(FragmentKind::Relations),
            request: FormRequest {
                method: Method::Post,
                url: "/viewR/ajax/delete_req_relation/1.2".to_string(),
                body: "index=1.2&delete=2".to_string(),
            },
        }]
    );
}

#[test]
fn path_change_uses_form_method_and_action() {
    init_logging();
    let form = SubmittedForm {
        id: FormId::new("req_path_form"),
        action: "/viewR/ajax/req_path/1.2".to_string(),
        method: Method::Put,
        snapshot: FormSnapshot::from_pairs([("index", "1.2"), ("path", "b.md")]),
    };
    let (_, effects) = update(PageState::default(), Msg::PathChanged { form });
    assert_eq!(
        effects,
        vec![Effect::Submit {
            purpose: RequestPurpose::PathChange,
            request: FormRequest {
                method: Method::Put,
                url: "/viewR/ajax/req_path/1.2".to_string(),
                body: "index=1.2&path=b.md".to_string(),
            },
        }]
    );
}

#[test]
fn index_click_copies_and_restores() {
    init_logging();
    let (state, effects) = update(
        PageState::default(),
        Msg::IndexClicked {
            element_id: "1.2".to_string(),
            html: "1.2".to_string(),
        },
    );
    assert_eq!(
        effects[0],
        Effect::WriteClipboard {
            text: "1.2".to_string()
        }
    );
    assert_eq!(
        effects[2],
        Effect::ScheduleCopyRestore {
            element_id: "1.2".to_string(),
            after: Duration::from_millis(1000),
        }
    );

    let (_, effects) = update(
        state,
        Msg::CopyRestoreDue {
            element_id: "1.2".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::SetElementHtml {
            element_id: "1.2".to_string(),
            html: "1.2".to_string(),
        }]
    );
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::time::Instant;
use viewr_app::{Dom, DomEvent, HeadlessDom, PageEvent, PageRuntime, RuntimeSettings};
use viewr_core::{Fingerprint, FormId, PageSettings, ADD_REQ_URL, COPIED_PLACEHOLDER};
use viewr_engine::{
    FailureKind, HttpMethod, MemoryStore, OutgoingRequest, ReplyShape, ServerReply, Transport,
    TransportError,
};

const SAVE_URL: &str = "/viewR/ajax/req_text/1.2";
const ADD_LABEL_URL: &str = "/viewR/ajax/add_req_label/1.2";
const DELETE_LABEL_URL: &str = "/viewR/ajax/delete_req_label/1.2";
const DELETE_RELATION_URL: &str = "/viewR/ajax/delete_req_relation/1.2";
const PATH_URL: &str = "/viewR/ajax/req_path/1.2";
const MENU_URL: &str = "/viewR/write_pdf";

const PAGE: &str = r#"
<html><body>
<div id="menu_section">
    <button class="menu-button" data-action="/viewR/write_pdf">PDF</button>
</div>
<div class="index" id="1.2">1.2</div>
<button id="add_new_req">New</button>
<form id="req_path_form" method="post" action="/viewR/ajax/req_path/1.2">
    <input type="hidden" name="index" value="1.2">
    <select id="id_path" name="path">
        <option value="a.md" selected>a</option>
        <option value="b.md">b</option>
    </select>
</form>
<form id="req_text_form" method="post" action="/viewR/ajax/req_text/1.2">
    <textarea id="id_text" name="text">Boot</textarea>
</form>
<div id="req_label"><span>no labels</span></div>
<form id="add_req_label_form" method="post" action="/viewR/ajax/add_req_label/1.2">
    <input type="hidden" name="index" value="1.2">
    <input type="text" id="id_new_label" name="new_label" value="">
</form>
<form id="delete_req_label_form" method="post" action="/viewR/ajax/delete_req_label/1.2">
    <input type="hidden" name="index" value="1.2">
</form>
<div id="req_relation">
    <button class="delete-relation" data-index="2" data-relation="parent">x</button>
</div>
<form id="delete_req_relation_form" method="post" action="/viewR/ajax/delete_req_relation/1.2">
    <input type="hidden" name="index" value="1.2">
</form>
</body></html>
"#;

const LABEL_REGION: &str =
    r#"<div id="req_label"><button class="delete-label" data-label="urgent">x</button></div>"#;

type Scripted = Result<ServerReply, TransportError>;

/// Records every request and answers from a per-URL script.
#[derive(Default)]
struct FakeServer {
    requests: Mutex<Vec<OutgoingRequest>>,
    replies: Mutex<HashMap<String, Scripted>>,
}

impl FakeServer {
    fn reply(&self, url: &str, reply: Scripted) {
        self.replies.lock().unwrap().insert(url.to_string(), reply);
    }

    fn requests_to(&self, url: &str) -> Vec<OutgoingRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.url == url)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn submit(&self, request: &OutgoingRequest) -> Result<ServerReply, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .unwrap_or(Ok(ServerReply::Empty))
    }
}

fn network_error() -> Scripted {
    Err(TransportError {
        kind: FailureKind::Network,
        message: "connection refused".to_string(),
    })
}

fn fragment(html: &str) -> Scripted {
    Ok(ServerReply::Fragment {
        success: true,
        html: Some(html.to_string()),
        message: None,
    })
}

fn open_page(server: &Arc<FakeServer>) -> PageRuntime<HeadlessDom> {
    viewr_logging::initialize_for_tests();
    let transport: Arc<dyn Transport> = server.clone();
    let mut runtime = PageRuntime::new(
        HeadlessDom::from_html(PAGE),
        transport,
        Box::new(MemoryStore::new()),
        RuntimeSettings {
            page: PageSettings::default(),
            autosave_forms: vec![FormId::new("req_text_form")],
        },
    );
    runtime.handle_event(PageEvent::Ready);
    runtime
}

/// Handles every event due within `total` of virtual time.
async fn run_for(runtime: &mut PageRuntime<HeadlessDom>, total: Duration) {
    let deadline = Instant::now() + total;
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        runtime.process_next(deadline - now).await;
    }
}

fn click(runtime: &mut PageRuntime<HeadlessDom>, selector: &str) {
    let targets = runtime.dom().find_targets(selector);
    assert_eq!(targets.len(), 1, "targets for {selector}");
    let target = targets.into_iter().next().unwrap();
    runtime.handle_event(PageEvent::Dom(DomEvent::Click(target)));
}

#[tokio::test(start_paused = true)]
async fn ready_stores_baseline_and_unchanged_page_never_saves() {
    let server = Arc::new(FakeServer::default());
    let mut runtime = open_page(&server);

    assert_eq!(
        runtime.store().get("#req_text_form_last_hash"),
        Some(Fingerprint::of("text=Boot").to_string())
    );
    run_for(&mut runtime, Duration::from_millis(5500)).await;
    assert!(server.requests_to(SAVE_URL).is_empty());
}

#[tokio::test(start_paused = true)]
async fn one_edit_is_saved_exactly_once() {
    let server = Arc::new(FakeServer::default());
    let mut runtime = open_page(&server);

    run_for(&mut runtime, Duration::from_millis(2500)).await;
    assert!(runtime.dom_mut().set_input_value("id_text", "Boot fast"));
    run_for(&mut runtime, Duration::from_millis(4000)).await;

    let saves = server.requests_to(SAVE_URL);
    assert_eq!(
        saves,
        vec![OutgoingRequest {
            method: HttpMethod::Post,
            url: SAVE_URL.to_string(),
            body: "text=Boot+fast".to_string(),
            shape: ReplyShape::Ignored,
        }]
    );
    assert_eq!(
        runtime.store().get("#req_text_form_last_hash"),
        Some(Fingerprint::of("text=Boot+fast").to_string())
    );
    assert_eq!(runtime.view().autosave[0].saves_issued, 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_autosave_loop() {
    let server = Arc::new(FakeServer::default());
    let mut runtime = open_page(&server);

    assert!(!runtime.handle_event(PageEvent::Shutdown));
    runtime.dom_mut().set_input_value("id_text", "Changed after leaving");
    run_for(&mut runtime, Duration::from_millis(3000)).await;
    assert!(server.requests_to(SAVE_URL).is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_menu_action_shows_error_then_fades_and_goes() {
    let server = Arc::new(FakeServer::default());
    server.reply(MENU_URL, network_error());
    let mut runtime = open_page(&server);

    click(&mut runtime, "button.menu-button");
    run_for(&mut runtime, Duration::from_millis(100)).await;
    let feedback = runtime.dom().feedback();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0].text, "Error");
    assert_eq!(feedback[0].fading, None);

    run_for(&mut runtime, Duration::from_millis(5000)).await;
    assert_eq!(
        runtime.dom().feedback()[0].fading,
        Some(Duration::from_millis(1000))
    );

    run_for(&mut runtime, Duration::from_millis(1000)).await;
    assert!(runtime.dom().feedback().is_empty());
}

#[tokio::test(start_paused = true)]
async fn menu_message_is_shown_verbatim() {
    let server = Arc::new(FakeServer::default());
    server.reply(MENU_URL, Ok(ServerReply::Message("PDF written".to_string())));
    let mut runtime = open_page(&server);

    click(&mut runtime, "button.menu-button");
    run_for(&mut runtime, Duration::from_millis(10)).await;
    assert_eq!(runtime.dom().feedback()[0].text, "PDF written");
    assert_eq!(server.requests_to(MENU_URL)[0].body, "");
}

#[tokio::test(start_paused = true)]
async fn added_label_replaces_region_and_clears_input() {
    let server = Arc::new(FakeServer::default());
    server.reply(ADD_LABEL_URL, fragment(LABEL_REGION));
    let mut runtime = open_page(&server);

    runtime.dom_mut().set_input_value("id_new_label", "urgent");
    runtime.handle_event(PageEvent::Dom(DomEvent::Submit {
        form_id: "add_req_label_form".to_string(),
    }));
    run_for(&mut runtime, Duration::from_millis(10)).await;

    assert_eq!(
        server.requests_to(ADD_LABEL_URL)[0].body,
        "index=1.2&new_label=urgent"
    );
    assert_eq!(runtime.dom().region_html("req_label"), Some(LABEL_REGION));
    assert_eq!(runtime.dom().input_value("id_new_label"), Some(""));
}

#[tokio::test(start_paused = true)]
async fn rejected_label_keeps_region_and_shows_inline_error() {
    let server = Arc::new(FakeServer::default());
    server.reply(
        ADD_LABEL_URL,
        Ok(ServerReply::Fragment {
            success: false,
            html: None,
            message: Some("Label exists".to_string()),
        }),
    );
    let mut runtime = open_page(&server);
    let before = runtime.dom().region_html("req_label").map(str::to_string);

    runtime.dom_mut().set_input_value("id_new_label", "dup");
    runtime.handle_event(PageEvent::Dom(DomEvent::Submit {
        form_id: "add_req_label_form".to_string(),
    }));
    run_for(&mut runtime, Duration::from_millis(10)).await;

    assert_eq!(runtime.dom().region_html("req_label").map(str::to_string), before);
    assert_eq!(
        runtime.dom().inline_errors("add_req_label_form"),
        ["Label exists".to_string()]
    );
    assert_eq!(runtime.dom().input_value("id_new_label"), Some("dup"));
}

#[tokio::test(start_paused = true)]
async fn each_delete_click_sends_one_request_after_many_replacements() {
    let server = Arc::new(FakeServer::default());
    server.reply(ADD_LABEL_URL, fragment(LABEL_REGION));
    server.reply(DELETE_LABEL_URL, fragment(LABEL_REGION));
    let mut runtime = open_page(&server);

    for cycle in 1..=4 {
        runtime.dom_mut().set_input_value("id_new_label", "urgent");
        runtime.handle_event(PageEvent::Dom(DomEvent::Submit {
            form_id: "add_req_label_form".to_string(),
        }));
        run_for(&mut runtime, Duration::from_millis(10)).await;

        click(&mut runtime, "#req_label button.delete-label");
        run_for(&mut runtime, Duration::from_millis(10)).await;
        assert_eq!(server.requests_to(DELETE_LABEL_URL).len(), cycle);
    }
    assert_eq!(
        server.requests_to(DELETE_LABEL_URL)[0].body,
        "index=1.2&label=urgent"
    );
}

#[tokio::test(start_paused = true)]
async fn relation_delete_posts_the_button_index() {
    let server = Arc::new(FakeServer::default());
    server.reply(
        DELETE_RELATION_URL,
        fragment(r#"<div id="req_relation"></div>"#),
    );
    let mut runtime = open_page(&server);

    click(&mut runtime, "#req_relation button.delete-relation");
    run_for(&mut runtime, Duration::from_millis(10)).await;

    let deletes = server.requests_to(DELETE_RELATION_URL);
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].method, HttpMethod::Post);
    assert_eq!(deletes[0].body, "index=1.2&delete=2");
    assert_eq!(
        deletes[0].shape,
        ReplyShape::Fragment {
            field: "req_relation"
        }
    );
    assert_eq!(
        runtime.dom().region_html("req_relation"),
        Some(r#"<div id="req_relation"></div>"#)
    );
}

#[tokio::test(start_paused = true)]
async fn path_change_reports_errors_inline_one_at_a_time() {
    let server = Arc::new(FakeServer::default());
    server.reply(
        PATH_URL,
        Ok(ServerReply::Status {
            success: false,
            message: Some("Path taken".to_string()),
        }),
    );
    let mut runtime = open_page(&server);

    runtime.dom_mut().set_input_value("id_path", "b.md");
    runtime.handle_event(PageEvent::Dom(DomEvent::Change {
        element_id: "id_path".to_string(),
    }));
    run_for(&mut runtime, Duration::from_millis(10)).await;
    assert_eq!(server.requests_to(PATH_URL)[0].body, "index=1.2&path=b.md");
    assert_eq!(
        runtime.dom().inline_errors("req_path_form"),
        ["Path taken".to_string()]
    );

    server.reply(PATH_URL, network_error());
    runtime.handle_event(PageEvent::Dom(DomEvent::Change {
        element_id: "id_path".to_string(),
    }));
    run_for(&mut runtime, Duration::from_millis(10)).await;
    assert_eq!(
        runtime.dom().inline_errors("req_path_form"),
        ["Error".to_string()]
    );

    server.reply(
        PATH_URL,
        Ok(ServerReply::Status {
            success: true,
            message: None,
        }),
    );
    runtime.handle_event(PageEvent::Dom(DomEvent::Change {
        element_id: "id_path".to_string(),
    }));
    run_for(&mut runtime, Duration::from_millis(10)).await;
    assert!(runtime.dom().inline_errors("req_path_form").is_empty());
}

#[tokio::test(start_paused = true)]
async fn new_requirement_navigates_to_returned_url() {
    let server = Arc::new(FakeServer::default());
    server.reply(
        ADD_REQ_URL,
        Ok(ServerReply::NewRequirement {
            url: Some("/viewR/1.3".to_string()),
        }),
    );
    let mut runtime = open_page(&server);

    click(&mut runtime, "#add_new_req");
    run_for(&mut runtime, Duration::from_millis(10)).await;

    let requests = server.requests_to(ADD_REQ_URL);
    assert_eq!(requests[0].body, "index=1.2&path=a.md");
    assert_eq!(runtime.dom().location(), Some("/viewR/1.3"));
}

#[tokio::test(start_paused = true)]
async fn index_click_copies_and_restores() {
    let server = Arc::new(FakeServer::default());
    let mut runtime = open_page(&server);

    click(&mut runtime, "div.index");
    assert_eq!(runtime.dom().clipboard(), Some("1.2"));
    assert_eq!(
        runtime.dom().element_html("1.2").as_deref(),
        Some(COPIED_PLACEHOLDER)
    );

    run_for(&mut runtime, Duration::from_millis(1100)).await;
    assert_eq!(runtime.dom().element_html("1.2").as_deref(), Some("1.2"));
}

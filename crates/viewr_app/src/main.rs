use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use viewr_app::platform::console::{parse_command, ConsoleCommand, ConsoleError};
use viewr_app::platform::logging;
use viewr_app::{ClientConfig, Dom, DomEvent, HeadlessDom, PageEvent, PageRuntime};
use viewr_engine::{JsonFileStore, ReqwestTransport};
use viewr_logging::viewr_info;

const DEFAULT_CONFIG: &str = "viewr.ron";

enum Input {
    Line(Option<String>),
    Event(Option<PageEvent>),
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(page_path) = args.next() else {
        bail!("usage: viewr_app <page.html> [config.ron]");
    };
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let config = ClientConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    logging::initialize(config.log_destination, config.level()?);

    let html =
        fs::read_to_string(&page_path).with_context(|| format!("reading page {page_path}"))?;
    let transport = ReqwestTransport::new(config.transport_settings())?;
    let store = JsonFileStore::open(&config.store_path)
        .with_context(|| format!("opening store {}", config.store_path.display()))?;

    let mut runtime = PageRuntime::new(
        HeadlessDom::from_html(&html),
        Arc::new(transport),
        Box::new(store),
        config.runtime_settings(),
    );
    viewr_info!("Opened {page_path} against {}", config.server_url);
    runtime.handle_event(PageEvent::Ready);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            event = runtime.next_event() => Input::Event(event),
        };
        match input {
            Input::Event(Some(event)) => {
                if !runtime.handle_event(event) {
                    break;
                }
            }
            Input::Event(None) => break,
            Input::Line(None) => {
                // Input ended: let outstanding requests report before leaving.
                let wait = config.transport_settings().request_timeout;
                while runtime.view().requests_in_flight > 0 {
                    if !runtime.process_next(wait).await {
                        break;
                    }
                }
                runtime.handle_event(PageEvent::Shutdown);
                break;
            }
            Input::Line(Some(line)) => match parse_command(&line) {
                Ok(ConsoleCommand::Quit) => {
                    runtime.handle_event(PageEvent::Shutdown);
                    break;
                }
                Ok(command) => apply_command(&mut runtime, command),
                Err(ConsoleError::Empty) => {}
                Err(err) => eprintln!("{err}"),
            },
        }
    }

    println!("{}", runtime.dom().describe());
    Ok(())
}

fn apply_command(runtime: &mut PageRuntime<HeadlessDom>, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Set { input_id, value } => {
            if !runtime.dom_mut().set_input_value(&input_id, &value) {
                eprintln!("no input #{input_id}");
            }
        }
        ConsoleCommand::Click { selector } => {
            match runtime.dom().find_targets(&selector).into_iter().next() {
                Some(target) => {
                    runtime.handle_event(PageEvent::Dom(DomEvent::Click(target)));
                }
                None => eprintln!("nothing matches {selector}"),
            }
        }
        ConsoleCommand::Submit { form_id } => {
            runtime.handle_event(PageEvent::Dom(DomEvent::Submit { form_id }));
        }
        ConsoleCommand::Change { element_id } => {
            runtime.handle_event(PageEvent::Dom(DomEvent::Change { element_id }));
        }
        ConsoleCommand::Show => {
            println!("{}", runtime.dom().describe());
            println!("{:#?}", runtime.view());
        }
        ConsoleCommand::Quit => {
            runtime.handle_event(PageEvent::Shutdown);
        }
    }
}

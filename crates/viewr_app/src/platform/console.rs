//! Line commands that drive a headless page from stdin.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `set <input-id> <value...>`
    Set { input_id: String, value: String },
    /// `click <css-selector>`; the first match is clicked.
    Click { selector: String },
    /// `submit <form-id>`
    Submit { form_id: String },
    /// `change <element-id>`
    Change { element_id: String },
    Show,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word {
        "" => Err(ConsoleError::Empty),
        "set" => {
            let (input_id, value) = match rest.split_once(char::is_whitespace) {
                Some((id, value)) => (id, value.trim_start()),
                None => (rest, ""),
            };
            Ok(ConsoleCommand::Set {
                input_id: required("set", input_id.trim_start_matches('#'))?,
                value: value.to_string(),
            })
        }
        "click" => Ok(ConsoleCommand::Click {
            selector: required("click", rest)?,
        }),
        "submit" => Ok(ConsoleCommand::Submit {
            form_id: required("submit", rest.trim_start_matches('#'))?,
        }),
        "change" => Ok(ConsoleCommand::Change {
            element_id: required("change", rest.trim_start_matches('#'))?,
        }),
        "show" => Ok(ConsoleCommand::Show),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(ConsoleError::Unknown(other.to_string())),
    }
}

fn required(command: &'static str, arg: &str) -> Result<String, ConsoleError> {
    if arg.is_empty() {
        Err(ConsoleError::MissingArgument(command))
    } else {
        Ok(arg.to_string())
    }
}

use std::collections::BTreeMap;
use std::time::Duration;

use crate::Effect;

/// Shown in place of an index while its text sits on the clipboard.
pub const COPIED_PLACEHOLDER: &str = "&nbsp;Copied&nbsp;&nbsp;";
pub const COPY_RESTORE_DELAY: Duration = Duration::from_millis(1000);

/// Index elements currently showing the placeholder, with their real content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CopyTracker {
    showing_placeholder: BTreeMap<String, String>,
    restore_after: Duration,
}

impl CopyTracker {
    pub fn new(restore_after: Duration) -> Self {
        Self {
            showing_placeholder: BTreeMap::new(),
            restore_after,
        }
    }

    /// A second click during the placeholder period copies the real content
    /// again instead of the placeholder, and keeps the pending restore.
    pub fn copy(&mut self, element_id: &str, html: &str) -> Vec<Effect> {
        if let Some(original) = self.showing_placeholder.get(element_id) {
            return vec![Effect::WriteClipboard {
                text: original.clone(),
            }];
        }
        self.showing_placeholder
            .insert(element_id.to_string(), html.to_string());
        vec![
            Effect::WriteClipboard {
                text: html.to_string(),
            },
            Effect::SetElementHtml {
                element_id: element_id.to_string(),
                html: COPIED_PLACEHOLDER.to_string(),
            },
            Effect::ScheduleCopyRestore {
                element_id: element_id.to_string(),
                after: self.restore_after,
            },
        ]
    }

    pub fn restore_due(&mut self, element_id: &str) -> Vec<Effect> {
        match self.showing_placeholder.remove(element_id) {
            Some(html) => vec![Effect::SetElementHtml {
                element_id: element_id.to_string(),
                html,
            }],
            None => Vec::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.showing_placeholder.len()
    }
}

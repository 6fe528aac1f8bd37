//! Script execution events.
//!
//! There is no dedicated script event kind on the wire: a script runs by
//! appending a `<script>` element to `body` through the element patch
//! encoder. Unless disabled, the element carries an attribute that makes
//! the client delete it right after execution so the script cannot run
//! again if the fragment is reprocessed.

use std::time::Duration;

use crate::consts::{AUTO_REMOVE_SCRIPT_ATTRIBUTE, DEFAULT_SSE_RETRY_DURATION};
use crate::elements::{ElementPatchMode, PatchElementsOptions};
use crate::error::SseError;
use crate::sse::ServerSentEventGenerator;

/// Options for one script execution event.
#[derive(Debug, Clone)]
pub struct ExecuteScriptOptions {
    /// Optional event id (sets the client's `lastEventId`).
    pub event_id: Option<String>,
    /// Retry hint; omitted from the wire at the default.
    pub retry_duration: Duration,
    /// Whether the client removes the script element after execution.
    /// `None` means the default (remove).
    pub auto_remove: Option<bool>,
    /// Verbatim attribute strings for the script tag, e.g.
    /// `type="module"`. Emitted in the order given.
    pub attributes: Vec<String>,
}

impl Default for ExecuteScriptOptions {
    fn default() -> Self {
        Self {
            event_id: None,
            retry_duration: DEFAULT_SSE_RETRY_DURATION,
            auto_remove: None,
            attributes: Vec::new(),
        }
    }
}

impl ExecuteScriptOptions {
    /// Set the event id.
    pub fn event_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    /// Override the retry duration.
    pub fn retry_duration(mut self, retry: Duration) -> Self {
        self.retry_duration = retry;
        self
    }

    /// Control whether the script element is removed after execution.
    pub fn auto_remove(mut self, auto_remove: bool) -> Self {
        self.auto_remove = Some(auto_remove);
        self
    }

    /// Append one verbatim attribute string to the script tag.
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

fn build_script_element(script: &str, options: &ExecuteScriptOptions) -> String {
    let mut element = String::with_capacity(script.len() + 64);
    element.push_str("<script");
    for attribute in &options.attributes {
        element.push(' ');
        element.push_str(attribute);
    }
    if options.auto_remove.unwrap_or(true) {
        element.push(' ');
        element.push_str(AUTO_REMOVE_SCRIPT_ATTRIBUTE);
    }
    element.push('>');
    element.push_str(script);
    element.push_str("</script>");
    element
}

impl ServerSentEventGenerator {
    /// Run `script` in the client browser.
    pub async fn execute_script(
        &self,
        script: &str,
        options: ExecuteScriptOptions,
    ) -> Result<(), SseError> {
        let element = build_script_element(script, &options);

        let mut patch_options = PatchElementsOptions::default()
            .selector("body")
            .mode(ElementPatchMode::Append)
            .retry_duration(options.retry_duration);
        if let Some(id) = options.event_id {
            patch_options = patch_options.event_id(id);
        }

        self.patch_elements(&element, patch_options).await
    }

    /// Log `message` to the client's console.
    pub async fn console_log(&self, message: &str) -> Result<(), SseError> {
        let call = format!("console.log({})", js_string_literal(message));
        self.execute_script(&call, ExecuteScriptOptions::default())
            .await
    }

    /// Report `message` as an error on the client's console.
    pub async fn console_error(&self, message: &str) -> Result<(), SseError> {
        let call = format!("console.error({})", js_string_literal(message));
        self.execute_script(&call, ExecuteScriptOptions::default())
            .await
    }

    /// Navigate the client to `url`.
    pub async fn redirect(&self, url: &str) -> Result<(), SseError> {
        let script = format!(
            "setTimeout(() => window.location.href = {})",
            js_string_literal(url)
        );
        self.execute_script(&script, ExecuteScriptOptions::default())
            .await
    }
}

// A JSON string is a valid JS string literal; string serialization cannot
// fail.
fn js_string_literal(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_default()
}

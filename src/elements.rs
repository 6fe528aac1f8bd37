//! Element patch events: push HTML fragments into the client's DOM.

use std::str::FromStr;
use std::time::Duration;

use crate::consts::{
    DEFAULT_SSE_RETRY_DURATION, ELEMENTS_DATALINE_LITERAL, MODE_DATALINE_LITERAL,
    SELECTOR_DATALINE_LITERAL, USE_VIEW_TRANSITION_DATALINE_LITERAL,
};
use crate::error::{InvalidPatchModeError, SseError};
use crate::event::{EventType, SseEventOptions};
use crate::sse::ServerSentEventGenerator;

/// How the client merges an incoming element fragment into its DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementPatchMode {
    /// Morph the outer HTML of the target element (the default).
    #[default]
    Outer,
    /// Morph the inner HTML of the target element.
    Inner,
    /// Remove the target element; no morph diffing.
    Remove,
    /// Replace the target element wholesale; no morph diffing.
    Replace,
    /// Insert the fragment as the target's first child.
    Prepend,
    /// Insert the fragment as the target's last child.
    Append,
    /// Insert the fragment before the target.
    Before,
    /// Insert the fragment after the target.
    After,
}

/// Every valid element patch mode, in protocol order.
pub const VALID_ELEMENT_PATCH_MODES: [ElementPatchMode; 8] = [
    ElementPatchMode::Outer,
    ElementPatchMode::Inner,
    ElementPatchMode::Remove,
    ElementPatchMode::Replace,
    ElementPatchMode::Prepend,
    ElementPatchMode::Append,
    ElementPatchMode::Before,
    ElementPatchMode::After,
];

impl ElementPatchMode {
    /// The wire token for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementPatchMode::Outer => "outer",
            ElementPatchMode::Inner => "inner",
            ElementPatchMode::Remove => "remove",
            ElementPatchMode::Replace => "replace",
            ElementPatchMode::Prepend => "prepend",
            ElementPatchMode::Append => "append",
            ElementPatchMode::Before => "before",
            ElementPatchMode::After => "after",
        }
    }
}

impl std::fmt::Display for ElementPatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementPatchMode {
    type Err = InvalidPatchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outer" => Ok(ElementPatchMode::Outer),
            "inner" => Ok(ElementPatchMode::Inner),
            "remove" => Ok(ElementPatchMode::Remove),
            "replace" => Ok(ElementPatchMode::Replace),
            "prepend" => Ok(ElementPatchMode::Prepend),
            "append" => Ok(ElementPatchMode::Append),
            "before" => Ok(ElementPatchMode::Before),
            "after" => Ok(ElementPatchMode::After),
            other => Err(InvalidPatchModeError(other.to_string())),
        }
    }
}

/// Options for one element patch event.
#[derive(Debug, Clone)]
pub struct PatchElementsOptions {
    /// Optional event id (sets the client's `lastEventId`).
    pub event_id: Option<String>,
    /// Retry hint; omitted from the wire at the default.
    pub retry_duration: Duration,
    /// CSS selector for the patch target. `None` lets the client match by
    /// element id.
    pub selector: Option<String>,
    /// Merge mode; the `mode` dataline is omitted at the default.
    pub mode: ElementPatchMode,
    /// Emit `useViewTransition true` when enabled.
    pub use_view_transition: bool,
}

impl Default for PatchElementsOptions {
    fn default() -> Self {
        Self {
            event_id: None,
            retry_duration: DEFAULT_SSE_RETRY_DURATION,
            selector: None,
            mode: ElementPatchMode::default(),
            use_view_transition: false,
        }
    }
}

impl PatchElementsOptions {
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

    /// Target the patch with a CSS selector.
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Target an element by id, equivalent to `selector("#<id>")`.
    pub fn selector_id(self, id: &str) -> Self {
        self.selector(format!("#{id}"))
    }

    /// Set the merge mode.
    pub fn mode(mut self, mode: ElementPatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable view transitions for this patch.
    pub fn use_view_transition(mut self, enabled: bool) -> Self {
        self.use_view_transition = enabled;
        self
    }

    fn into_event_options(self) -> (Vec<String>, SseEventOptions) {
        let mut data_lines = Vec::with_capacity(4);
        if let Some(selector) = self.selector.filter(|s| !s.is_empty()) {
            data_lines.push(format!("{SELECTOR_DATALINE_LITERAL}{selector}"));
        }
        if self.mode != ElementPatchMode::default() {
            data_lines.push(format!("{MODE_DATALINE_LITERAL}{}", self.mode.as_str()));
        }
        if self.use_view_transition {
            data_lines.push(format!("{USE_VIEW_TRANSITION_DATALINE_LITERAL}true"));
        }

        let event_options = SseEventOptions {
            event_id: self.event_id,
            retry_duration: self.retry_duration,
        };
        (data_lines, event_options)
    }
}

impl ServerSentEventGenerator {
    /// Send HTML elements for the client to merge into its DOM.
    ///
    /// Multi-line fragments are split on line breaks; each physical line is
    /// emitted as its own `elements` dataline.
    pub async fn patch_elements(
        &self,
        elements: &str,
        options: PatchElementsOptions,
    ) -> Result<(), SseError> {
        let (mut data_lines, event_options) = options.into_event_options();

        if !elements.is_empty() {
            for line in elements.split('\n') {
                data_lines.push(format!("{ELEMENTS_DATALINE_LITERAL}{line}"));
            }
        }

        self.send(EventType::PatchElements, &data_lines, event_options)
            .await
    }

    /// Remove the elements matched by `selector` from the client's DOM.
    pub async fn remove_element(
        &self,
        selector: &str,
        options: PatchElementsOptions,
    ) -> Result<(), SseError> {
        let options = options.mode(ElementPatchMode::Remove).selector(selector);
        self.patch_elements("", options).await
    }

    /// Remove the element with the given id, equivalent to
    /// `remove_element("#<id>")`.
    pub async fn remove_element_by_id(&self, id: &str) -> Result<(), SseError> {
        self.remove_element(&format!("#{id}"), PatchElementsOptions::default())
            .await
    }
}

//! Protocol constants for the Datastar SSE wire format.
//!
//! The tokens here are fixed by the client-side protocol and must be
//! reproduced byte-for-byte. Consumers parse datalines by literal prefix
//! match, so every dataline literal includes its trailing space.

use std::time::Duration;

/// Reserved query-string key carrying URL-encoded JSON signals on
/// read-style (GET) requests.
pub const DATASTAR_KEY: &str = "datastar";

/// Default `retry` duration advertised to clients. The `retry:` line is
/// omitted from the wire when an event uses this value.
pub const DEFAULT_SSE_RETRY_DURATION: Duration = Duration::from_millis(1000);

/// Wire token for element patch events.
pub const EVENT_TYPE_PATCH_ELEMENTS: &str = "datastar-patch-elements";

/// Wire token for signal patch events.
pub const EVENT_TYPE_PATCH_SIGNALS: &str = "datastar-patch-signals";

/// Dataline literal selecting the patch target via a CSS selector.
pub const SELECTOR_DATALINE_LITERAL: &str = "selector ";

/// Dataline literal carrying a non-default element patch mode.
pub const MODE_DATALINE_LITERAL: &str = "mode ";

/// Dataline literal carrying one physical line of an HTML fragment.
pub const ELEMENTS_DATALINE_LITERAL: &str = "elements ";

/// Dataline literal enabling view transitions for a patch.
pub const USE_VIEW_TRANSITION_DATALINE_LITERAL: &str = "useViewTransition ";

/// Dataline literal restricting a signal patch to missing signals.
pub const ONLY_IF_MISSING_DATALINE_LITERAL: &str = "onlyIfMissing ";

/// Dataline literal carrying one physical line of a signals JSON payload.
pub const SIGNALS_DATALINE_LITERAL: &str = "signals ";

/// Script-element attribute that makes the client delete the script tag
/// right after execution, preventing re-execution on reprocessing.
pub const AUTO_REMOVE_SCRIPT_ATTRIBUTE: &str = r#"data-effect="el.remove()""#;

pub(crate) const EVENT_LINE_PREFIX: &str = "event: ";
pub(crate) const ID_LINE_PREFIX: &str = "id: ";
pub(crate) const RETRY_LINE_PREFIX: &str = "retry: ";
pub(crate) const DATA_LINE_PREFIX: &str = "data: ";

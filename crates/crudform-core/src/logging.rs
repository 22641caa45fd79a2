//! Logging integration for crudform-rs.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-card and
//! per-dialog spans, so that log lines emitted while editing one object can be
//! told apart from those of another.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level` (e.g. "debug", "info",
/// "`crudform_forms=debug`"); an invalid directive falls back to "info". In
/// debug mode a pretty, human-readable format is used; otherwise structured
/// JSON. Calling this more than once is harmless: later calls are ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for a card editing one object of `model`.
///
/// # Examples
///
/// ```
/// use crudform_core::logging::card_span;
///
/// let span = card_span("Character");
/// let _guard = span.enter();
/// tracing::debug!("rendering fields");
/// ```
pub fn card_span(model: &str) -> tracing::Span {
    tracing::debug_span!("card", model = model)
}

/// Creates a tracing span for the CRUD table of `model`.
pub fn crud_span(model: &str) -> tracing::Span {
    tracing::info_span!("crud", model = model)
}

/// Creates a tracing span for a nested edit dialog on `field`.
pub fn dialog_span(model: &str, field: &str) -> tracing::Span {
    tracing::debug_span!("dialog", model = model, field = field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let mut settings = Settings::default();
        settings.log_level = "not a [valid directive".to_string();
        setup_logging(&settings);
        settings.debug = false;
        setup_logging(&settings);
    }

    #[test]
    fn test_spans_can_be_entered() {
        let span = card_span("Hero");
        let _guard = span.enter();
        let inner = dialog_span("Hero", "address");
        let _inner_guard = inner.enter();
        tracing::debug!("inside dialog");
    }
}

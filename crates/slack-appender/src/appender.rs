// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! `tracing` layer that forwards events to Slack.
//!
//! # Usage
//!
//! ```rust,ignore
//! use slack_appender::{appender::SlackLayer, config::AppenderConfig};
//! use tracing_subscriber::prelude::*;
//!
//! let layer = SlackLayer::new(AppenderConfig::from_env()?)?;
//! tracing_subscriber::registry()
//!     .with(layer.with_filter(tracing_subscriber::filter::LevelFilter::WARN))
//!     .init();
//! ```
//!
//! # Event mapping
//!
//! - level: the event level (`ERROR`, `WARN`, ...)
//! - logger name: the event target
//! - message: the `message` field followed by any other fields as `key=value`
//! - exception: an `error` or `exception` field. When it is recorded as a
//!   `dyn Error`, its `source()` chain becomes the trace. `error.type` and
//!   `error.stack` (or `backtrace`) fields override the type name and trace.
//!
//! Events from this crate and from the HTTP stack are ignored so that
//! delivery diagnostics never turn into further deliveries.

use crate::client::DeliveryClient;
use crate::composer::{compose, CompositionConfig, ExceptionInfo, LogEvent};
use crate::config::AppenderConfig;
use crate::error::ConfigError;
use crate::http::get_client;
use crate::palette::SeverityPalette;
use crate::proc::{machine_name, process_name};
use std::error::Error;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Targets whose events the layer never forwards, including their submodules.
pub const INTERNAL_TARGETS: [&str; 8] = [
    env!("CARGO_CRATE_NAME"),
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "tokio",
    "mio",
];

/// Renders the notification text for an event.
pub trait Layout: Send + Sync + 'static {
    fn format(&self, event: &LogEvent) -> String;
}

/// Uses the rendered message as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageLayout;

impl Layout for MessageLayout {
    fn format(&self, event: &LogEvent) -> String {
        event.rendered_message.clone()
    }
}

/// Substitutes `{level}`, `{logger}`, `{message}` and `{exception}` in a pattern.
///
/// The pattern is scanned once, so braces inside substituted values are kept
/// as they are. Unknown placeholders are copied verbatim.
#[derive(Debug, Clone)]
pub struct PatternLayout {
    pattern: String,
}

impl PatternLayout {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Layout for PatternLayout {
    fn format(&self, event: &LogEvent) -> String {
        let exception = event
            .exception
            .as_ref()
            .map(|exception| exception.message.as_str())
            .unwrap_or_default();
        let mut output = String::with_capacity(self.pattern.len() + event.rendered_message.len());
        let mut rest = self.pattern.as_str();

        while let Some(start) = rest.find('{') {
            output.push_str(&rest[..start]);
            let after = &rest[start..];
            let placeholder = after.find('}').map(|end| &after[..=end]);
            let value = match placeholder {
                Some("{level}") => Some(event.level.as_str()),
                Some("{logger}") => Some(event.logger_name.as_str()),
                Some("{message}") => Some(event.rendered_message.as_str()),
                Some("{exception}") => Some(exception),
                _ => None,
            };
            match (placeholder, value) {
                (Some(placeholder), Some(value)) => {
                    output.push_str(value);
                    rest = &after[placeholder.len()..];
                }
                _ => {
                    output.push('{');
                    rest = &after[1..];
                }
            }
        }
        output.push_str(rest);
        output
    }
}

/// Appender that composes and delivers one notification per event.
///
/// Events targeting [`INTERNAL_TARGETS`] are dropped so that delivery
/// diagnostics do not trigger further deliveries. Crates outside that list
/// that log while sending (a custom transport, a proxy client) must be
/// filtered out by the subscriber, e.g. with
/// `layer.with_filter(EnvFilter::new("info,my_transport=off"))`.
pub struct SlackLayer {
    endpoint: String,
    composition: CompositionConfig,
    client: DeliveryClient,
    layout: Box<dyn Layout>,
}

impl fmt::Debug for SlackLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackLayer")
            .field("composition", &self.composition)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl SlackLayer {
    /// Validates `config` and builds a layer bound to the current tokio runtime.
    pub fn new(config: AppenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = DeliveryClient::new(get_client(config.proxy.as_deref()))
            .map_err(|e| ConfigError::NoRuntime(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    #[must_use]
    pub fn with_client(config: AppenderConfig, client: DeliveryClient) -> Self {
        let endpoint = config.webhook_endpoint();
        let composition = CompositionConfig {
            include_attachment: config.add_attachment,
            include_exception_trace_field: config.add_exception_trace_field,
            append_logger_name_to_username: config.username_append_logger_name,
            username: config.username,
            channel: config.channel,
            icon_url: config.icon_url,
            icon_emoji: config.icon_emoji,
            process_name: process_name(),
            machine_name: machine_name(),
            palette: SeverityPalette::new(config.level_colors),
            rendered_text: String::new(),
        };
        SlackLayer {
            endpoint,
            composition,
            client,
            layout: Box::new(MessageLayout),
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: impl Layout) -> Self {
        self.layout = Box::new(layout);
        self
    }

    /// Delivery client, e.g. to wait for outstanding notifications on shutdown.
    #[must_use]
    pub fn client(&self) -> &DeliveryClient {
        &self.client
    }

    /// Composes `event` and starts its delivery without waiting for it.
    pub fn append(&self, event: &LogEvent) {
        let mut composition = self.composition.clone();
        composition.rendered_text = self.layout.format(event);
        let payload = compose(event, &composition);
        self.client.deliver(&self.endpoint, payload, None);
    }
}

impl<S: Subscriber> Layer<S> for SlackLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if is_internal(event.metadata().target()) {
            return;
        }
        self.append(&log_event(event));
    }
}

fn is_internal(target: &str) -> bool {
    INTERNAL_TARGETS.iter().any(|internal| {
        target
            .strip_prefix(internal)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// Snapshots a tracing event.
pub(crate) fn log_event(event: &Event<'_>) -> LogEvent {
    let metadata = event.metadata();
    let mut visitor = EventVisitor::default();
    event.record(&mut visitor);

    let mut rendered_message = visitor.message.unwrap_or_default();
    for (name, value) in visitor.fields {
        if !rendered_message.is_empty() {
            rendered_message.push(' ');
        }
        rendered_message.push_str(name);
        rendered_message.push('=');
        rendered_message.push_str(&value);
    }

    let exception = visitor.error.map(|error| ExceptionInfo {
        message: error.message,
        type_name: visitor
            .error_type
            .or(error.type_name)
            .unwrap_or_else(|| "Error".to_string()),
        stack_trace: visitor.stack.or(error.source_chain),
    });

    LogEvent {
        level: metadata.level().as_str().to_string(),
        logger_name: metadata.target().to_string(),
        rendered_message,
        exception,
    }
}

#[derive(Debug)]
struct CapturedError {
    message: String,
    type_name: Option<String>,
    source_chain: Option<String>,
}

#[derive(Debug, Default)]
struct EventVisitor {
    message: Option<String>,
    error: Option<CapturedError>,
    error_type: Option<String>,
    stack: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl EventVisitor {
    fn record_value(&mut self, name: &'static str, value: String) {
        match name {
            "message" => self.message = Some(value),
            "error" | "exception" => {
                self.error.get_or_insert(CapturedError {
                    message: value,
                    type_name: None,
                    source_chain: None,
                });
            }
            "error.type" | "exception.type" => self.error_type = Some(value),
            "error.stack" | "exception.stack" | "backtrace" => self.stack = Some(value),
            _ => self.fields.push((name, value)),
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field.name(), value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        match field.name() {
            "error" | "exception" => {
                self.error = Some(CapturedError {
                    message: value.to_string(),
                    type_name: debug_type_name(value),
                    source_chain: source_chain(value),
                });
            }
            name => self.record_value(name, value.to_string()),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field.name(), format!("{value:?}"));
    }
}

/// Leading identifier of the error's `Debug` output, e.g. `ParseIntError`.
fn debug_type_name(error: &dyn Error) -> Option<String> {
    let debug = format!("{error:?}");
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    (!name.is_empty()).then_some(name)
}

fn source_chain(error: &dyn Error) -> Option<String> {
    let mut lines = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("Caused by: {cause}"));
        source = cause.source();
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}

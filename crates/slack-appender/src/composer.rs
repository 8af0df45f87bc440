// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns one log event into a Slack [`Payload`].
//!
//! Attachment fields always come out in this order:
//!
//! ```text
//! Exception Message | Exception Type | Exception Trace [1..N] | Logger | Process | Machine
//! ```
//!
//! The exception fields only appear when the event carries an error, the trace
//! fields only when trace fields are enabled, and `Logger` only when the logger
//! name is not already appended to the username.

use crate::chunker::chunks;
use crate::palette::SeverityPalette;
use crate::payload::{non_empty, Attachment, Field, Payload};

/// Longest trace chunk, leaving room for the code fences under Slack's field limit.
pub const TRACE_CHUNK_CHARS: usize = 1990;

const CODE_FENCE: &str = "```";
const FENCE_SUBSTITUTE: &str = "'''";

/// Snapshot of one log occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEvent {
    pub level: String,
    pub logger_name: String,
    pub rendered_message: String,
    pub exception: Option<ExceptionInfo>,
}

/// Error attached to a log event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub message: String,
    pub type_name: String,
    pub stack_trace: Option<String>,
}

/// Static settings applied to every composed payload.
#[derive(Debug, Clone, Default)]
pub struct CompositionConfig {
    pub include_attachment: bool,
    /// Only consulted when `include_attachment` is set.
    pub include_exception_trace_field: bool,
    pub append_logger_name_to_username: bool,
    pub username: String,
    pub channel: String,
    pub icon_url: String,
    pub icon_emoji: String,
    pub process_name: String,
    pub machine_name: String,
    pub palette: SeverityPalette,
    /// Message body produced by the layout; the composer never formats it.
    pub rendered_text: String,
}

/// Builds the payload for `event`. Never fails: missing inputs only drop fields.
#[must_use]
pub fn compose(event: &LogEvent, config: &CompositionConfig) -> Payload {
    let mut username = config.username.clone();
    if config.append_logger_name_to_username {
        username.push_str(" - ");
        username.push_str(&event.logger_name);
    }

    let mut payload = Payload {
        channel: non_empty(&config.channel),
        username: non_empty(&username),
        icon_url: non_empty(&config.icon_url),
        icon_emoji: non_empty(&config.icon_emoji),
        text: config.rendered_text.clone(),
        attachments: Vec::new(),
    };

    if config.include_attachment {
        payload.attachments.push(build_attachment(event, config));
    }

    payload
}

fn build_attachment(event: &LogEvent, config: &CompositionConfig) -> Attachment {
    let mut attachment = Attachment::new(format!(
        "[{}] {} in {} on {}",
        event.level, event.logger_name, config.process_name, config.machine_name
    ));
    attachment.color = config.palette.color_for(&event.level);

    let mut fields = FieldList::default();
    if let Some(exception) = &event.exception {
        fields.lead(Field::new("Exception Message", &exception.message, false));
        fields.lead(Field::new("Exception Type", &exception.type_name, true));
        if config.include_exception_trace_field {
            for field in trace_fields(exception.stack_trace.as_deref().unwrap_or_default()) {
                fields.lead(field);
            }
        }
    }
    if !config.append_logger_name_to_username {
        fields.tail(Field::new("Logger", &event.logger_name, true));
    }
    fields.tail(Field::new("Process", &config.process_name, true));
    fields.tail(Field::new("Machine", &config.machine_name, true));

    attachment.fields = fields.build();
    attachment
}

/// Fenced trace fields titled `Exception Trace`, `Exception Trace 2`, ...
fn trace_fields(stack_trace: &str) -> Vec<Field> {
    if stack_trace.trim().is_empty() {
        return Vec::new();
    }

    chunks(stack_trace, TRACE_CHUNK_CHARS)
        .enumerate()
        .map(|(index, chunk)| {
            let title = if index == 0 {
                "Exception Trace".to_string()
            } else {
                format!("Exception Trace {}", index + 1)
            };
            let value = format!(
                "{CODE_FENCE}{}{CODE_FENCE}",
                chunk.replace(CODE_FENCE, FENCE_SUBSTITUTE)
            );
            Field::new(title, value, false)
        })
        .collect()
}

/// Two-part field list: event-specific fields lead, fixed context fields trail.
#[derive(Debug, Default)]
struct FieldList {
    leading: Vec<Field>,
    trailing: Vec<Field>,
}

impl FieldList {
    fn lead(&mut self, field: Field) {
        self.leading.push(field);
    }

    fn tail(&mut self, field: Field) {
        self.trailing.push(field);
    }

    fn build(mut self) -> Vec<Field> {
        self.leading.append(&mut self.trailing);
        self.leading
    }
}

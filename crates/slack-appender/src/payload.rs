// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire model for Slack incoming webhooks.
//!
//! <https://api.slack.com/docs/attachments>

use serde::Serialize;

/// Message posted to the webhook, serialized to JSON before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    /// Always the fully rendered message, attachments or not.
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Richer formatting shown below the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Plain-text summary for clients that do not render attachments.
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// `good`, `warning`, `danger` or a hex color code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub fields: Vec<Field>,
    #[serde(rename = "mrkdwn_in")]
    markdown_in: Vec<&'static str>,
}

impl Attachment {
    #[must_use]
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            pretext: None,
            text: None,
            color: None,
            fields: Vec::new(),
            markdown_in: vec!["fields"],
        }
    }

    /// Attachment sections in which Slack renders markdown. Always `["fields"]`.
    #[must_use]
    pub fn markdown_in(&self) -> &[&'static str] {
        &self.markdown_in
    }
}

/// One row of the attachment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Plain text; Slack escapes any markup.
    pub title: String,
    /// May contain markup and span multiple lines.
    pub value: String,
    /// Whether the value is short enough to sit next to another field.
    pub short: bool,
}

impl Field {
    pub fn new(title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short,
        }
    }
}

/// Client-wide values used when a payload leaves the matching field empty.
#[derive(Debug, Clone, Default)]
pub struct PayloadDefaults {
    pub username: Option<String>,
    pub channel: Option<String>,
    pub icon_url: Option<String>,
}

impl Payload {
    /// Fills each empty field from `defaults`, judging every field on its own.
    #[must_use]
    pub fn with_defaults(mut self, defaults: &PayloadDefaults) -> Self {
        fill(&mut self.username, &defaults.username);
        fill(&mut self.channel, &defaults.channel);
        fill(&mut self.icon_url, &defaults.icon_url);
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn fill(slot: &mut Option<String>, default: &Option<String>) {
    if slot.as_deref().map_or(true, str::is_empty) {
        slot.clone_from(default);
    }
}

/// Maps empty configuration strings to `None` so they are left off the wire.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_payload_json() {
        let payload = Payload {
            text: "hello".to_string(),
            ..Default::default()
        };
        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({ "text": "hello" }));
    }

    #[test]
    fn test_full_payload_json() {
        let mut attachment = Attachment::new("[ERROR] app in svc on host");
        attachment.color = Some("danger".to_string());
        attachment.fields.push(Field::new("Process", "svc", true));

        let payload = Payload {
            channel: Some("#alerts".to_string()),
            username: Some("bot".to_string()),
            icon_url: None,
            icon_emoji: Some(":ghost:".to_string()),
            text: "boom".to_string(),
            attachments: vec![attachment],
        };

        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "channel": "#alerts",
                "username": "bot",
                "icon_emoji": ":ghost:",
                "text": "boom",
                "attachments": [{
                    "fallback": "[ERROR] app in svc on host",
                    "color": "danger",
                    "fields": [{ "title": "Process", "value": "svc", "short": true }],
                    "mrkdwn_in": ["fields"]
                }]
            })
        );
    }

    #[test]
    fn test_defaults_fill_each_field_independently() {
        let defaults = PayloadDefaults {
            username: Some("default-user".to_string()),
            channel: Some("#default".to_string()),
            icon_url: Some("https://example.com/icon.png".to_string()),
        };
        let payload = Payload {
            channel: Some("#explicit".to_string()),
            username: Some(String::new()),
            text: "x".to_string(),
            ..Default::default()
        }
        .with_defaults(&defaults);

        assert_eq!(payload.channel.as_deref(), Some("#explicit"));
        assert_eq!(payload.username.as_deref(), Some("default-user"));
        // icon_url is judged on its own emptiness, not the channel's
        assert_eq!(
            payload.icon_url.as_deref(),
            Some("https://example.com/icon.png")
        );
    }

    #[test]
    fn test_explicit_icon_url_is_kept() {
        let defaults = PayloadDefaults {
            icon_url: Some("https://example.com/default.png".to_string()),
            ..Default::default()
        };
        let payload = Payload {
            icon_url: Some("https://example.com/mine.png".to_string()),
            ..Default::default()
        }
        .with_defaults(&defaults);
        assert_eq!(
            payload.icon_url.as_deref(),
            Some("https://example.com/mine.png")
        );
    }
}

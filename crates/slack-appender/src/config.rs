// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use crate::palette::SeverityColorRule;
use serde::Deserialize;
use std::env;

/// Static settings for the Slack appender, bound once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppenderConfig {
    /// Incoming webhook URL; may contain `${VAR}` placeholders
    pub webhook_url: String,
    pub channel: String,
    pub username: String,
    pub icon_url: String,
    pub icon_emoji: String,
    /// Attach level color, logger, process and machine details
    pub add_attachment: bool,
    /// Add the error trace as attachment fields; requires `add_attachment`
    pub add_exception_trace_field: bool,
    /// Append ` - <logger>` to the username instead of adding a Logger field
    pub username_append_logger_name: bool,
    pub level_colors: Vec<SeverityColorRule>,
    /// Outbound HTTPS proxy
    pub proxy: Option<String>,
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            channel: String::new(),
            username: String::new(),
            icon_url: String::new(),
            icon_emoji: String::new(),
            add_attachment: false,
            add_exception_trace_field: false,
            username_append_logger_name: false,
            level_colors: Vec::new(),
            proxy: None,
        }
    }
}

impl AppenderConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let level_colors = match env::var("SLACK_LEVEL_COLORS") {
            Ok(rules) => SeverityColorRule::parse_list(&rules)?,
            Err(_) => Vec::new(),
        };
        let proxy = env::var("SLACK_PROXY")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok()
            .filter(|proxy| !proxy.trim().is_empty());

        let config = Self {
            webhook_url: env::var("SLACK_WEBHOOK_URL").unwrap_or_default(),
            channel: env::var("SLACK_CHANNEL").unwrap_or_default(),
            username: env::var("SLACK_USERNAME").unwrap_or_default(),
            icon_url: env::var("SLACK_ICON_URL").unwrap_or_default(),
            icon_emoji: env::var("SLACK_ICON_EMOJI").unwrap_or_default(),
            add_attachment: env_flag("SLACK_ADD_ATTACHMENT"),
            add_exception_trace_field: env_flag("SLACK_ADD_EXCEPTION_TRACE"),
            username_append_logger_name: env_flag("SLACK_USERNAME_APPEND_LOGGER_NAME"),
            level_colors,
            proxy,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.webhook_endpoint();
        if endpoint.trim().is_empty() {
            return Err(ConfigError::MissingWebhookUrl);
        }

        match reqwest::Url::parse(&endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidConfig(format!(
                    "webhook URL must use http or https, got '{}'",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfig(format!(
                    "webhook URL is not a valid URL: {e}"
                )));
            }
        }

        Ok(())
    }

    /// The webhook URL with environment placeholders expanded.
    #[must_use]
    pub fn webhook_endpoint(&self) -> String {
        expand_env_vars(&self.webhook_url)
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|val| matches!(val.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Replaces every `${NAME}` with the value of the environment variable `NAME`.
///
/// Unset variables expand to an empty string; an unterminated `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                output.push_str(&env::var(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output
}

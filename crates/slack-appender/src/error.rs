// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Errors that terminate a single delivery attempt.
///
/// None of these ever reach the code that emitted the log event; they are
/// logged and handed to the optional completion callback.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid webhook endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Webhook responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("No async runtime available: {0}")]
    Runtime(String),
}

/// Errors raised while binding appender configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Webhook URL is not set")]
    MissingWebhookUrl,

    #[error("No async runtime available: {0}")]
    NoRuntime(String),
}

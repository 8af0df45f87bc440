// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use slack_appender::{appender::PatternLayout, config::AppenderConfig, SlackLayer};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Console log level from `SLACK_LOG_LEVEL`, `info` when unset.
fn log_level(value: Option<String>) -> Result<String, String> {
    let level = value
        .map(|val| val.trim().to_lowercase())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| "info".to_string());
    if VALID_LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        ))
    }
}

#[derive(Debug)]
struct FieldAccessError {
    source: std::num::ParseIntError,
}

impl fmt::Display for FieldAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "You can't access this field.")
    }
}

impl Error for FieldAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[tokio::main]
pub async fn main() {
    let level = match log_level(env::var("SLACK_LOG_LEVEL").ok()) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    let config = match AppenderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid Slack appender configuration: {e}");
            return;
        }
    };

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", level);
    let filter = match EnvFilter::try_new(env_filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("could not parse log level in configuration: {e}");
            return;
        }
    };

    let slack = match SlackLayer::new(config) {
        Ok(layer) => layer.with_layout(PatternLayout::new("{message}")),
        Err(e) => {
            eprintln!("Unable to start the Slack appender: {e}");
            return;
        }
    };
    let client = slack.client().clone();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_thread_names(false)
                .with_thread_ids(false)
                .with_line_number(false)
                .with_file(false)
                .with_target(true),
        )
        .with(slack)
        .init();

    debug!("Sending sample notifications");

    info!(target: "slack_appender_testing", "I know he can get the job, but can he do the job?");
    debug!(target: "slack_appender_testing", "I'm not arguing that with you.");
    warn!(target: "slack_appender_testing", "Be careful!");

    if let Err(source) = "x".parse::<u32>() {
        let err = FieldAccessError { source };
        error!(
            target: "slack_appender_testing",
            error = &err as &(dyn Error + 'static),
            "Have you used a computer before?"
        );
    }

    error!(
        target: "slack_appender_testing",
        error = %"Could not fall backwards.",
        error.type = "EncoderFallbackException",
        error.stack = "at Program.Main()",
        "That's it. It's over."
    );

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, client.wait_idle())
        .await
        .is_err()
    {
        eprintln!(
            "{} notifications still in flight after {:?}",
            client.in_flight(),
            SHUTDOWN_TIMEOUT
        );
    }
}

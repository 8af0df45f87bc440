// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use mockito::{Matcher, Server};
use slack_appender::{
    config::AppenderConfig, http::get_client, palette::SeverityColorRule, DeliveryClient,
    SlackLayer,
};
use std::error::Error;
use std::fmt;
use tokio::time::{timeout, Duration};
use tracing_subscriber::{filter::LevelFilter, prelude::*};

#[derive(Debug)]
struct FieldAccessError;

impl fmt::Display for FieldAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "You can't access this field.")
    }
}

impl Error for FieldAccessError {}

fn layer_for(url: String, config: AppenderConfig) -> (SlackLayer, DeliveryClient) {
    let client = DeliveryClient::new(get_client(None)).expect("failed to create client");
    let layer = SlackLayer::with_client(
        AppenderConfig {
            webhook_url: url,
            ..config
        },
        client.clone(),
    );
    (layer, client)
}

#[cfg(test)]
#[tokio::test]
async fn error_event_is_posted_with_attachment() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/services/T000/B000/XXXX")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("^payload=".to_string()),
            Matcher::Regex("Have\\+you\\+used\\+a\\+computer\\+before".to_string()),
            Matcher::Regex("Crash\\+Bot\\+-\\+billing".to_string()),
            Matcher::Regex("FieldAccessException".to_string()),
            Matcher::Regex("%23FF0000".to_string()),
        ]))
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create_async()
        .await;

    let (layer, client) = layer_for(
        format!("{}/services/T000/B000/XXXX", server.url()),
        AppenderConfig {
            username: "Crash Bot".to_string(),
            add_attachment: true,
            username_append_logger_name: true,
            level_colors: vec![SeverityColorRule::new("error", "red")],
            ..AppenderConfig::default()
        },
    );

    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(
            target: "billing",
            error = &FieldAccessError as &(dyn Error + 'static),
            error.type = "FieldAccessException",
            "Have you used a computer before?"
        );
    });

    timeout(Duration::from_secs(5), client.wait_idle())
        .await
        .expect("delivery did not finish");
    mock.assert_async().await;
}

#[cfg(test)]
#[tokio::test]
async fn filtered_and_internal_events_are_not_posted() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/hook")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let (layer, client) = layer_for(
        format!("{}/hook", server.url()),
        AppenderConfig::default(),
    );

    let subscriber = tracing_subscriber::registry().with(layer.with_filter(LevelFilter::WARN));
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(target: "billing", "I'm not arguing that with you.");
        tracing::error!(target: "reqwest::connect", "connection refused");
        tracing::error!(target: "slack_appender::client", "SLACK | Failed to deliver");
    });

    assert_eq!(client.in_flight(), 0);
    client.wait_idle().await;
    mock.assert_async().await;
}

#[cfg(test)]
#[tokio::test]
async fn rejected_notification_does_not_reach_the_caller() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/hook")
        .with_status(404)
        .with_body("no_service")
        .expect(1)
        .create_async()
        .await;

    let (layer, client) = layer_for(
        format!("{}/hook", server.url()),
        AppenderConfig::default(),
    );

    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(target: "billing", "Be careful!");
    });

    timeout(Duration::from_secs(5), client.wait_idle())
        .await
        .expect("delivery did not finish");
    assert_eq!(client.in_flight(), 0);
    mock.assert_async().await;
}

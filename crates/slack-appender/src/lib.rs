// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Sends log events to a Slack incoming webhook.
//!
//! Events are composed into a [`payload::Payload`] on the emitting thread and
//! delivered by a [`client::DeliveryClient`] in the background. The
//! [`appender::SlackLayer`] wires both into a `tracing` subscriber.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod appender;
pub mod chunker;
pub mod client;
pub mod composer;
pub mod config;
pub mod error;
pub mod http;
pub mod palette;
pub mod payload;
pub mod proc;

pub use appender::SlackLayer;
pub use client::DeliveryClient;
pub use composer::{compose, CompositionConfig, ExceptionInfo, LogEvent};
pub use error::{ConfigError, DeliveryError};

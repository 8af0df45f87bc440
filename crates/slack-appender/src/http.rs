// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client construction.
//!
//! Webhook posts go through a single pooled `reqwest::Client`. An outbound
//! HTTPS proxy is applied when configured; a proxy address that fails to parse
//! is logged and the client falls back to a direct connection so that a bad
//! setting never disables notifications entirely.

use core::time::Duration;
use std::error::Error;
use tracing::error;

/// Creates the client used for webhook delivery, honoring `proxy` when it parses.
#[must_use]
pub fn get_client(proxy: Option<&str>) -> reqwest::Client {
    match build_client(proxy) {
        Ok(client) => client,
        Err(e) => {
            error!(
                "SLACK | Unable to parse proxy configuration: {}, falling back to direct connection",
                e
            );
            match build_client(None) {
                Ok(client) => client,
                Err(inner) => {
                    error!(
                        "SLACK | Failed to build HTTP client without proxy: {}, using reqwest defaults",
                        inner
                    );
                    reqwest::Client::new()
                }
            }
        }
    }
}

fn build_client(proxy: Option<&str>) -> Result<reqwest::Client, Box<dyn Error>> {
    let mut client = reqwest::Client::builder()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(120)));

    if let Some(proxy) = proxy.filter(|proxy| !proxy.trim().is_empty()) {
        client = client.proxy(reqwest::Proxy::https(proxy)?);
    }

    Ok(client.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_without_proxy() {
        assert!(build_client(None).is_ok());
        assert!(build_client(Some("  ")).is_ok());
    }

    #[test]
    fn test_build_client_with_proxy() {
        assert!(build_client(Some("http://proxy.internal:3128")).is_ok());
    }

    #[test]
    fn test_invalid_proxy_is_rejected() {
        assert!(build_client(Some("not a proxy url")).is_err());
    }

    #[test]
    fn test_get_client_falls_back_on_invalid_proxy() {
        // must not panic; the direct client is returned instead
        let _client = get_client(Some("not a proxy url"));
    }
}

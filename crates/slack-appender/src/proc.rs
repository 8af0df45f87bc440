// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Process and machine name detection

use std::env;
use tracing::warn;

const UNKNOWN: &str = "unknown";

/// Name of the running executable, without extension.
#[must_use]
pub fn process_name() -> String {
    env::current_exe()
        .ok()
        .and_then(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            warn!("SLACK | Could not determine process name, using '{UNKNOWN}'");
            UNKNOWN.to_string()
        })
}

/// Get the machine name
///
/// Checked in order:
/// 1. HOSTNAME environment variable
/// 2. COMPUTERNAME environment variable
/// 3. System hostname
/// 4. Fallback to "unknown"
#[must_use]
pub fn machine_name() -> String {
    for var in ["HOSTNAME", "COMPUTERNAME"] {
        if let Ok(hostname) = env::var(var) {
            if !hostname.is_empty() {
                return hostname;
            }
        }
    }

    if let Some(hostname) = system_hostname() {
        return hostname;
    }

    warn!("SLACK | Could not determine machine name, using '{UNKNOWN}'");
    UNKNOWN.to_string()
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    match nix::unistd::gethostname() {
        Ok(hostname) => hostname
            .to_str()
            .filter(|hostname| !hostname.is_empty())
            .map(str::to_string),
        Err(e) => {
            warn!("SLACK | Failed to get system hostname: {}", e);
            None
        }
    }
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    None
}

// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Severity to attachment color mapping.
//!
//! Slack attachments take either one of the reserved tokens `good`, `warning`
//! and `danger`, or a hex color code. Levels resolve in this order:
//!
//! 1. User supplied [`SeverityColorRule`]s, matched case-insensitively in
//!    configuration order. The first match wins.
//! 2. Built-in defaults: `warn` is `warning`, `error` and `fatal` are `danger`.
//! 3. No color.
//!
//! A rule color naming a standard web color (`red`, `DarkOrange`, ...) is
//! resolved to `#RRGGBB`. Anything else is passed through untouched.

use crate::error::ConfigError;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

/// Overrides the attachment color for one level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeverityColorRule {
    pub level: String,
    pub color: String,
}

impl SeverityColorRule {
    pub fn new(level: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            color: color.into(),
        }
    }

    /// Parses a comma separated `level:color` list, e.g. `warn:orange,error:#FF0000`.
    pub fn parse_list(rules: &str) -> Result<Vec<Self>, ConfigError> {
        rules
            .split(',')
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .map(Self::from_str)
            .collect()
    }
}

impl FromStr for SeverityColorRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (level, color) = s.split_once(':').ok_or_else(|| {
            ConfigError::InvalidConfig(format!(
                "color rule '{s}' must have the form level:color"
            ))
        })?;
        let (level, color) = (level.trim(), color.trim());
        if level.is_empty() || color.is_empty() {
            return Err(ConfigError::InvalidConfig(format!(
                "color rule '{s}' has an empty level or color"
            )));
        }
        Ok(Self::new(level, color))
    }
}

/// Resolves a level label to an attachment color.
#[derive(Debug, Clone, Default)]
pub struct SeverityPalette {
    rules: Vec<SeverityColorRule>,
}

impl SeverityPalette {
    #[must_use]
    pub fn new(rules: Vec<SeverityColorRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|rule| {
                let keep = !rule.color.trim().is_empty();
                if !keep {
                    debug!("SLACK | Ignoring color rule for '{}' without a color", rule.level);
                }
                keep
            })
            .collect();
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[SeverityColorRule] {
        &self.rules
    }

    /// Returns the color for `level`, or `None` when the attachment stays uncolored.
    #[must_use]
    pub fn color_for(&self, level: &str) -> Option<String> {
        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.level.eq_ignore_ascii_case(level))
        {
            let color = rule.color.trim();
            return Some(
                resolve_named_color(color)
                    .map(str::to_string)
                    .unwrap_or_else(|| color.to_string()),
            );
        }

        default_color(level).map(str::to_string)
    }
}

fn default_color(level: &str) -> Option<&'static str> {
    match level.to_ascii_lowercase().as_str() {
        "warn" => Some("warning"),
        "error" | "fatal" => Some("danger"),
        _ => None,
    }
}

/// Looks up a standard web color name, ignoring case.
#[must_use]
pub fn resolve_named_color(name: &str) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, hex)| *hex)
}

const NAMED_COLORS: &[(&str, &str)] = &[
    ("AliceBlue", "#F0F8FF"),
    ("Aqua", "#00FFFF"),
    ("Aquamarine", "#7FFFD4"),
    ("Beige", "#F5F5DC"),
    ("Black", "#000000"),
    ("Blue", "#0000FF"),
    ("BlueViolet", "#8A2BE2"),
    ("Brown", "#A52A2A"),
    ("CadetBlue", "#5F9EA0"),
    ("Chartreuse", "#7FFF00"),
    ("Chocolate", "#D2691E"),
    ("Coral", "#FF7F50"),
    ("CornflowerBlue", "#6495ED"),
    ("Crimson", "#DC143C"),
    ("Cyan", "#00FFFF"),
    ("DarkBlue", "#00008B"),
    ("DarkCyan", "#008B8B"),
    ("DarkGoldenrod", "#B8860B"),
    ("DarkGray", "#A9A9A9"),
    ("DarkGreen", "#006400"),
    ("DarkMagenta", "#8B008B"),
    ("DarkOrange", "#FF8C00"),
    ("DarkRed", "#8B0000"),
    ("DarkViolet", "#9400D3"),
    ("DeepPink", "#FF1493"),
    ("DeepSkyBlue", "#00BFFF"),
    ("DimGray", "#696969"),
    ("DodgerBlue", "#1E90FF"),
    ("FireBrick", "#B22222"),
    ("ForestGreen", "#228B22"),
    ("Fuchsia", "#FF00FF"),
    ("Gold", "#FFD700"),
    ("Goldenrod", "#DAA520"),
    ("Gray", "#808080"),
    ("Green", "#008000"),
    ("GreenYellow", "#ADFF2F"),
    ("HotPink", "#FF69B4"),
    ("IndianRed", "#CD5C5C"),
    ("Indigo", "#4B0082"),
    ("Khaki", "#F0E68C"),
    ("Lavender", "#E6E6FA"),
    ("LawnGreen", "#7CFC00"),
    ("LightBlue", "#ADD8E6"),
    ("LightCoral", "#F08080"),
    ("LightGray", "#D3D3D3"),
    ("LightGreen", "#90EE90"),
    ("LightPink", "#FFB6C1"),
    ("LightSalmon", "#FFA07A"),
    ("LightSkyBlue", "#87CEFA"),
    ("LightYellow", "#FFFFE0"),
    ("Lime", "#00FF00"),
    ("LimeGreen", "#32CD32"),
    ("Magenta", "#FF00FF"),
    ("Maroon", "#800000"),
    ("MediumBlue", "#0000CD"),
    ("MediumPurple", "#9370DB"),
    ("MediumSeaGreen", "#3CB371"),
    ("MidnightBlue", "#191970"),
    ("Navy", "#000080"),
    ("Olive", "#808000"),
    ("OliveDrab", "#6B8E23"),
    ("Orange", "#FFA500"),
    ("OrangeRed", "#FF4500"),
    ("Orchid", "#DA70D6"),
    ("PaleGreen", "#98FB98"),
    ("Pink", "#FFC0CB"),
    ("Plum", "#DDA0DD"),
    ("Purple", "#800080"),
    ("Red", "#FF0000"),
    ("RoyalBlue", "#4169E1"),
    ("Salmon", "#FA8072"),
    ("SeaGreen", "#2E8B57"),
    ("Sienna", "#A0522D"),
    ("Silver", "#C0C0C0"),
    ("SkyBlue", "#87CEEB"),
    ("SlateBlue", "#6A5ACD"),
    ("SlateGray", "#708090"),
    ("SpringGreen", "#00FF7F"),
    ("SteelBlue", "#4682B4"),
    ("Tan", "#D2B48C"),
    ("Teal", "#008080"),
    ("Tomato", "#FF6347"),
    ("Turquoise", "#40E0D0"),
    ("Violet", "#EE82EE"),
    ("Wheat", "#F5DEB3"),
    ("White", "#FFFFFF"),
    ("Yellow", "#FFFF00"),
    ("YellowGreen", "#9ACD32"),
];

//! Configuration of the annotation canvas.
//!
//! Everything the host passes at mount besides the image and annotations:
//! drawing sizes, editing policy, enabled tools, log verbosity and history
//! limits. The whole structure round-trips through JSON.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_NODE_RADIUS, DEFAULT_STROKE_WIDTH};
use crate::error::SiaError;
use crate::model::AnnotationKind;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Drawing sizes, in page pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    pub node_radius: f64,
    pub stroke_width: f64,
    /// Center the fitted image in the container instead of aligning top left
    pub image_centered: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            node_radius: DEFAULT_NODE_RADIUS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            image_centered: true,
        }
    }
}

/// What the user may do with annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotationSettings {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_label: bool,
    pub can_have_multiple_labels: bool,
    /// Smallest accepted area in percentage units. Carried for the host, not enforced
    pub minimal_area: Option<f64>,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            can_create: true,
            can_edit: true,
            can_label: true,
            can_have_multiple_labels: false,
            minimal_area: None,
        }
    }
}

impl AnnotationSettings {
    /// Settings of a canvas that only displays annotations.
    pub fn read_only() -> Self {
        Self {
            can_create: false,
            can_edit: false,
            can_label: false,
            ..Self::default()
        }
    }
}

/// Tools the host enables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowedTools {
    pub point: bool,
    pub line: bool,
    pub bbox: bool,
    pub polygon: bool,
    /// Whether the image may be flagged as junk
    pub junk: bool,
}

impl Default for AllowedTools {
    fn default() -> Self {
        Self {
            point: true,
            line: true,
            bbox: true,
            polygon: true,
            junk: true,
        }
    }
}

impl AllowedTools {
    pub fn allows(&self, kind: AnnotationKind) -> bool {
        match kind {
            AnnotationKind::Point => self.point,
            AnnotationKind::Line => self.line,
            AnnotationKind::BBox => self.bbox,
            AnnotationKind::Polygon => self.polygon,
        }
    }

    /// First enabled drawing tool, used when the requested one is disabled.
    pub fn first_allowed(&self) -> Option<AnnotationKind> {
        AnnotationKind::all().iter().copied().find(|k| self.allows(*k))
    }
}

/// Undo history limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Keep at most this many snapshots; unbounded when absent
    pub max_entries: Option<usize>,
}

/// Canvas configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiaConfig {
    /// Version of the configuration format
    pub version: u32,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub annotation_settings: AnnotationSettings,
    #[serde(default)]
    pub allowed_tools: AllowedTools,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Default for SiaConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: UiConfig::default(),
            annotation_settings: AnnotationSettings::default(),
            allowed_tools: AllowedTools::default(),
            log_level: LogLevel::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl SiaConfig {
    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, SiaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, SiaError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(SiaError::UnsupportedConfigVersion {
                supported: CONFIG_VERSION,
                found: config.version,
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let mut config = SiaConfig::default();
        config.ui.node_radius = 6.0;
        config.allowed_tools.line = false;
        config.log_level = LogLevel::Debug;
        config.history.max_entries = Some(50);

        let json = config.to_json().unwrap();
        let back = SiaConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let config = SiaConfig::from_json(r#"{"version": 1, "ui": {"strokeWidth": 2.0}}"#).unwrap();
        assert_eq!(config.ui.stroke_width, 2.0);
        assert_eq!(config.ui.node_radius, DEFAULT_NODE_RADIUS);
        assert!(config.annotation_settings.can_create);
        assert_eq!(config.history.max_entries, None);
    }

    #[test]
    fn newer_version_is_rejected() {
        let err = SiaConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            SiaError::UnsupportedConfigVersion { supported: CONFIG_VERSION, found: 99 }
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(SiaConfig::from_json("{"), Err(SiaError::Json(_))));
    }

    #[test]
    fn disabled_tools_are_skipped() {
        let tools = AllowedTools {
            point: false,
            line: false,
            ..AllowedTools::default()
        };
        assert!(!tools.allows(AnnotationKind::Point));
        assert_eq!(tools.first_allowed(), Some(AnnotationKind::BBox));
    }

    #[test]
    fn log_level_maps_to_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}

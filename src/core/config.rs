//! Configuration types for the detection engine.
//!
//! One root [`DraupnirConfig`] with per-concern sections. Every section
//! carries its own `validate()`; the root cascades through them so a bad
//! value fails eagerly at startup instead of mid-scan.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{DraupnirError, Result};

/// Main configuration for a detection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraupnirConfig {
    /// Clone detection thresholds and limits
    #[serde(default)]
    pub detection: DetectionConfig,

    /// File discovery settings
    #[serde(default)]
    pub files: FileDiscoveryConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,
}

impl DraupnirConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DraupnirError::io(format!("failed to read config file {}", path.display()), e)
        })?;
        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            DraupnirError::io(format!("failed to write config file {}", path.display()), e)
        })
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.files.validate()?;
        Ok(())
    }
}

/// Thresholds and limits for the clone finder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Shortest run of matching statements worth reporting
    pub min_run_length: usize,

    /// Smallest total weight worth reporting
    pub min_clone_weight: u64,

    /// Wall-clock budget for the comparison phase, in seconds; checked
    /// between function pairs, never mid-pair. Unset means no limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_run_length: 2,
            min_clone_weight: 20,
            deadline_secs: None,
        }
    }
}

impl DetectionConfig {
    /// Validate detection thresholds.
    pub fn validate(&self) -> Result<()> {
        if self.min_run_length == 0 {
            return Err(DraupnirError::config_field(
                "min_run_length must be at least 1",
                "detection.min_run_length",
            ));
        }
        if self.min_clone_weight == 0 {
            return Err(DraupnirError::config_field(
                "min_clone_weight must be at least 1",
                "detection.min_clone_weight",
            ));
        }
        if self.deadline_secs == Some(0) {
            return Err(DraupnirError::config_field(
                "deadline_secs must be positive when set",
                "detection.deadline_secs",
            ));
        }
        Ok(())
    }
}

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscoveryConfig {
    /// Glob patterns for files to analyze
    pub include_patterns: Vec<String>,

    /// Glob patterns for files and directories to skip
    pub exclude_patterns: Vec<String>,

    /// Skip files larger than this
    pub max_file_size_mb: f64,
}

impl Default for FileDiscoveryConfig {
    fn default() -> Self {
        Self {
            include_patterns: vec!["**/*.py".to_string()],
            exclude_patterns: vec![
                "**/__pycache__/**".to_string(),
                "**/venv/**".to_string(),
                "**/.venv/**".to_string(),
                "**/node_modules/**".to_string(),
            ],
            max_file_size_mb: 10.0,
        }
    }
}

impl FileDiscoveryConfig {
    /// Validate discovery patterns.
    pub fn validate(&self) -> Result<()> {
        if self.include_patterns.is_empty() {
            return Err(DraupnirError::config_field(
                "at least one include pattern is required",
                "files.include_patterns",
            ));
        }
        for pattern in self.include_patterns.iter().chain(&self.exclude_patterns) {
            globset::Glob::new(pattern).map_err(|e| {
                DraupnirError::config_field(
                    format!("invalid glob pattern `{pattern}`: {e}"),
                    "files",
                )
            })?;
        }
        if self.max_file_size_mb <= 0.0 {
            return Err(DraupnirError::config_field(
                "max_file_size_mb must be positive",
                "files.max_file_size_mb",
            ));
        }
        Ok(())
    }

    /// Size cap in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        (self.max_file_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format
    pub format: ReportFormat,

    /// Include per-file parse and preparation diagnostics in the report
    pub include_diagnostics: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Json,
            include_diagnostics: true,
        }
    }
}

/// Available report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// JSON format
    #[default]
    Json,
    /// Markdown format
    Markdown,
    /// Standalone HTML page
    Html,
}

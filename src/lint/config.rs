//! Lint configuration

use serde::{Deserialize, Serialize};

/// Lint configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Block structure checks configuration
    pub structure: StructureConfig,
    /// Reference checks configuration
    pub references: ReferencesConfig,
    /// Quality checks configuration
    pub quality: QualityConfig,
    /// Flow analysis configuration
    pub flow: FlowConfig,
}

/// Block structure checking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    pub enabled: bool,
    /// Warn when indent grows by more than one level
    pub check_indent: bool,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_indent: true,
        }
    }
}

/// Reference checking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencesConfig {
    pub enabled: bool,
    /// Warn on labels defined twice on one page
    pub check_duplicate_labels: bool,
}

impl Default for ReferencesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_duplicate_labels: true,
        }
    }
}

/// Quality checking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    pub enabled: bool,
    /// Longest single wait, in frames, before an info note
    pub max_wait_frames: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_wait_frames: 600,
        }
    }
}

/// Flow analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    pub enabled: bool,
    /// Report commands after `exit_event` or a jump that nothing reaches
    pub check_unreachable: bool,
    /// Report loops with no way out
    pub check_infinite_loops: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_unreachable: true,
            check_infinite_loops: true,
        }
    }
}

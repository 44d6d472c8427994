//! Configuration schema definitions
//!
//! Settings shared by the renderer and the Android generator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use whitelabel_template::{ParseOptions, RenderOptions};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub android: AndroidConfig,
}

/// Template rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Fail on names missing from the context
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Drop lines that only hold a section tag
    #[serde(default = "default_true")]
    pub standalone_lines: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strict: true,
            standalone_lines: true,
        }
    }
}

impl RenderConfig {
    /// Parser options derived from this configuration
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default().standalone_lines(self.standalone_lines)
    }

    /// Render options derived from this configuration
    pub fn render_options(&self) -> RenderOptions {
        if self.strict {
            RenderOptions::strict()
        } else {
            RenderOptions::permissive()
        }
    }
}

/// Android build script generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AndroidConfig {
    /// Template replacing the built-in `build.gradle.kts` template
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// Output path relative to the project directory
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            template: None,
            output: default_output(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("android/app/build.gradle.kts")
}

fn default_true() -> bool {
    true
}

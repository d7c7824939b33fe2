//! Configuration for template rendering

use std::fmt;
use std::str::FromStr;

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Indentation-based, intrinsic functions as `!Tag` short forms
    #[default]
    Yaml,
    /// Nested objects, intrinsic functions as single-key objects
    Json,
}

impl Format {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format '{}' (expected yaml or json)", other)),
        }
    }
}

/// Configuration options for rendered output
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub format: Format,

    /// Spaces per indentation level in JSON output
    pub json_indent: usize,

    /// Render YAML intrinsics as `Fn::` mappings instead of `!Tag` short forms
    pub long_form: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: Format::Yaml,
            json_indent: 4,
            long_form: false,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_json_indent(mut self, indent: usize) -> Self {
        self.json_indent = indent;
        self
    }

    pub fn with_long_form(mut self, long_form: bool) -> Self {
        self.long_form = long_form;
        self
    }
}

use crate::color::{ColorAssigner, DEFAULT_PALETTE};
use crate::pattern::PatternCompiler;
use crate::types::{Color, Tab};
use anyhow::Result;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

fn default_export_prefix() -> String {
    "rulebook".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Color tags handed out to new entries, in order
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    /// Prefix for suggested export file names (`<prefix>_<tab>.json`)
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,
    /// Report expressions whose library alias no longer resolves
    #[serde(default = "default_true")]
    pub warn_unresolved_aliases: bool,
    /// Treat the empty pattern as valid (it is also the unresolved-alias marker)
    #[serde(default)]
    pub allow_empty_pattern: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            export_prefix: default_export_prefix(),
            warn_unresolved_aliases: true,
            allow_empty_pattern: false,
        }
    }
}

impl EngineConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!(path = p, error = %e, "failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn color_assigner(&self) -> ColorAssigner {
        ColorAssigner::new(self.palette.iter().map(Color::new).collect())
    }

    pub fn pattern_compiler(&self) -> PatternCompiler {
        PatternCompiler::new(self.allow_empty_pattern)
    }

    pub fn suggested_file_name(&self, tab: Tab) -> String {
        format!("{}_{}.json", self.export_prefix, tab)
    }
}

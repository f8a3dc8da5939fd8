//! Prompt configuration documents.
//!
//! A prompt config supplies default column headers, the system prompt, a user
//! prompt template, per-tone guidance and the sampling temperature. When no
//! document is available the built-in fallback is used instead.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::guidelines;

/// System prompt used when a config does not provide one.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You rewrite UX copy into the requested tone. Return only the rewritten text, nothing else.";

/// User template used when a config does not provide one.
pub const DEFAULT_USER_TEMPLATE: &str =
    "Rewrite this UX copy in a {tone} tone:\n\n{inputText}\n\nReturn only the rewritten text.";

pub const DEFAULT_TEMPERATURE: f32 = 0.85;

const FALLBACK_SYSTEM_PROMPT: &str =
    "You rewrite UX copy. Return only the rewritten text, nothing else.";
const FALLBACK_USER_TEMPLATE: &str =
    "Rewrite this copy:\n\n{inputText}\n\nReturn only the rewritten text.";

/// Errors from loading a prompt configuration document.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to load {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Invalid prompt config {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigMeta {
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Prompts {
    pub system: Option<String>,
    pub user_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { temperature: DEFAULT_TEMPERATURE }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptConfig {
    pub meta: ConfigMeta,
    pub column_headers: Vec<String>,
    pub prompts: Prompts,
    /// Guidance text keyed by lowercased tone name
    pub tone_guidance: HashMap<String, String>,
    pub generation_settings: GenerationSettings,
}

impl PromptConfig {
    /// Minimal configuration used when no document can be loaded.
    pub fn builtin() -> Self {
        Self {
            meta: ConfigMeta::default(),
            column_headers: Vec::new(),
            prompts: Prompts {
                system: Some(FALLBACK_SYSTEM_PROMPT.to_string()),
                user_template: Some(FALLBACK_USER_TEMPLATE.to_string()),
            },
            tone_guidance: HashMap::new(),
            generation_settings: GenerationSettings::default(),
        }
    }

    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: PromptConfig = serde_json::from_str(json)?;
        config.tone_guidance = config
            .tone_guidance
            .into_iter()
            .map(|(tone, guide)| (tone.trim().to_lowercase(), guide))
            .collect();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "prompt config loaded: {} {}",
            config.meta.name.as_deref().unwrap_or("(unnamed)"),
            config.meta.version.as_deref().unwrap_or("")
        );
        Ok(config)
    }

    /// Load a document, substituting the built-in fallback on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; using built-in prompts", e);
                Self::builtin()
            }
        }
    }

    pub fn system_prompt(&self) -> &str {
        self.prompts
            .system
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn user_template(&self) -> &str {
        self.prompts
            .user_template
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_USER_TEMPLATE)
    }

    pub fn temperature(&self) -> f32 {
        self.generation_settings.temperature
    }

    /// Default header for a column (empty past the configured list).
    pub fn column_header(&self, col: usize) -> &str {
        self.column_headers.get(col).map(String::as_str).unwrap_or("")
    }

    pub fn tone_guidance(&self, tone: &str) -> String {
        let key = tone.trim().to_lowercase();
        match self.tone_guidance.get(&key) {
            Some(guide) if !guide.is_empty() => guide.clone(),
            _ => format!("Rewrite in a {} style.", tone),
        }
    }

    /// Fill the user template. Each placeholder is substituted once;
    /// `{writingGuidelines}` only when the template asks for it.
    pub fn build_user_prompt(&self, tone: &str, input_text: &str) -> String {
        let template = self.user_template();
        let mut prompt = template
            .replacen("{tone}", tone, 1)
            .replacen("{toneGuidance}", &self.tone_guidance(tone), 1)
            .replacen("{inputText}", input_text, 1);

        if template.contains("{writingGuidelines}") {
            prompt = prompt.replacen("{writingGuidelines}", &guidelines::summary(), 1);
        }
        prompt
    }
}

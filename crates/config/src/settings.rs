// Application settings
// Loaded from ~/.config/tabtab/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Text-generation provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    /// Locally hosted chat endpoint (Ollama)
    #[default]
    Ollama,
    /// OpenAI API
    #[serde(rename = "openai")]
    OpenAI,
    /// Anthropic API
    Claude,
    /// Google AI (Gemini) API
    Gemini,
}

impl AIProvider {
    /// Stable identifier (settings value, keychain account, env var suffix)
    pub fn name(&self) -> &'static str {
        match self {
            AIProvider::Ollama => "ollama",
            AIProvider::OpenAI => "openai",
            AIProvider::Claude => "claude",
            AIProvider::Gemini => "gemini",
        }
    }

    /// Human-readable name used in messages
    pub fn display_name(&self) -> &'static str {
        match self {
            AIProvider::Ollama => "Ollama",
            AIProvider::OpenAI => "OpenAI",
            AIProvider::Claude => "Claude",
            AIProvider::Gemini => "Gemini",
        }
    }

    /// Hosted providers need an API key; the local endpoint does not
    pub fn needs_api_key(&self) -> bool {
        !matches!(self, AIProvider::Ollama)
    }

    /// Returns the default model for this provider (empty = must be chosen)
    pub fn default_model(&self) -> &'static str {
        match self {
            AIProvider::Ollama => "llama3.2:latest",
            AIProvider::OpenAI => "gpt-4o-mini",
            AIProvider::Claude => "claude-3-5-sonnet-latest",
            AIProvider::Gemini => "",
        }
    }

    /// API base URL used when no override is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            AIProvider::Ollama => "http://localhost:11434",
            AIProvider::OpenAI => "https://api.openai.com",
            AIProvider::Claude => "https://api.anthropic.com",
            AIProvider::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// Who issues the key, for "please enter your ... API key" messages
    pub fn key_vendor(&self) -> &'static str {
        match self {
            AIProvider::Ollama => "Ollama",
            AIProvider::OpenAI => "OpenAI",
            AIProvider::Claude => "Anthropic",
            AIProvider::Gemini => "Google AI",
        }
    }

    /// Alert shown when a hosted provider has no key
    pub fn missing_key_message(&self) -> String {
        format!("Please enter your {} API key.", self.key_vendor())
    }

    /// Alert shown when no model is chosen
    pub fn missing_model_message(&self) -> String {
        let article = match self {
            AIProvider::Ollama | AIProvider::OpenAI => "an",
            AIProvider::Claude | AIProvider::Gemini => "a",
        };
        format!("Please choose {} {} model first.", article, self.display_name())
    }
}

impl std::str::FromStr for AIProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" | "local" => Ok(AIProvider::Ollama),
            "openai" => Ok(AIProvider::OpenAI),
            "claude" | "anthropic" => Ok(AIProvider::Claude),
            "gemini" | "google" => Ok(AIProvider::Gemini),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

impl std::fmt::Display for AIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Provider-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AISettings {
    /// Selected provider
    pub provider: AIProvider,

    /// Model names per provider (empty = use provider default)
    pub ollama_model: String,
    pub openai_model: String,
    pub claude_model: String,
    pub gemini_model: String,

    /// Local chat endpoint (Ollama only)
    pub ollama_endpoint: String,

    /// Override for a hosted provider's API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            provider: AIProvider::Ollama,
            ollama_model: String::new(),
            openai_model: String::new(),
            claude_model: String::new(),
            gemini_model: String::new(),
            ollama_endpoint: AIProvider::Ollama.default_base_url().to_string(),
            base_url: None,
        }
    }
}

impl AISettings {
    fn stored_model(&self, provider: AIProvider) -> &str {
        match provider {
            AIProvider::Ollama => &self.ollama_model,
            AIProvider::OpenAI => &self.openai_model,
            AIProvider::Claude => &self.claude_model,
            AIProvider::Gemini => &self.gemini_model,
        }
    }

    /// Get the effective model for a provider (user-specified or default)
    pub fn model_for(&self, provider: AIProvider) -> &str {
        let stored = self.stored_model(provider).trim();
        // Gemini never accepted "-latest" aliases; treat stale ones as unset
        if provider == AIProvider::Gemini && stored.contains("-latest") {
            return provider.default_model();
        }
        if stored.is_empty() {
            provider.default_model()
        } else {
            stored
        }
    }

    /// Effective model for the selected provider
    pub fn effective_model(&self) -> &str {
        self.model_for(self.provider)
    }

    /// Remember a model choice for a provider
    pub fn set_model(&mut self, provider: AIProvider, model: &str) {
        let model = model.trim().to_string();
        match provider {
            AIProvider::Ollama => self.ollama_model = model,
            AIProvider::OpenAI => self.openai_model = model,
            AIProvider::Claude => self.claude_model = model,
            AIProvider::Gemini => self.gemini_model = model,
        }
    }

    /// Base URL for the selected provider
    pub fn effective_base_url(&self) -> &str {
        let configured = match self.provider {
            AIProvider::Ollama => Some(self.ollama_endpoint.as_str()),
            _ => self.base_url.as_deref(),
        };
        configured
            .map(|s| s.trim().trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Grid
    #[serde(rename = "grid.rows")]
    pub rows: usize,

    // Generation
    #[serde(rename = "generation.minDisplayMs")]
    pub min_display_ms: u64,

    /// Prompt configuration document (None = built-in defaults)
    #[serde(rename = "generation.promptConfig")]
    pub prompt_config: Option<PathBuf>,

    // AI
    #[serde(rename = "ai", default)]
    pub ai: AISettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: 30,
            min_display_ms: 500,
            prompt_config: None,
            ai: AISettings::default(),
        }
    }
}

const DEFAULT_SETTINGS_FILE: &str = r#"{
    // Grid
    "grid.rows": 30,

    // Generation
    // Minimum time a loading placeholder stays visible (milliseconds)
    "generation.minDisplayMs": 500,
    // Path to a prompt configuration JSON document (null = built-in prompts)
    "generation.promptConfig": null,

    // Provider options: "ollama", "openai", "claude", "gemini"
    // API keys are stored in the system keychain or TABTAB_<PROVIDER>_KEY,
    // never in this file
    "ai": {
        "provider": "ollama",
        "ollama_model": "",
        "openai_model": "",
        "claude_model": "",
        "gemini_model": "",
        "ollama_endpoint": "http://localhost:11434"
    }
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabtab");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            Self::create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from an explicit path. Unreadable or malformed files
    /// yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring whole-line `//` comments
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_SETTINGS_FILE) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

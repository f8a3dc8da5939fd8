// Provider configuration and secrets management
//
// API keys are looked up in order:
// 1. System keychain (preferred)
// 2. Environment variables (fallback for CI/headless)
//
// Keys are NEVER stored in settings.json

use std::env;

use serde::Serialize;

use crate::settings::{AIProvider, AISettings};

/// Service name for keychain storage
#[cfg(feature = "keychain")]
const KEYCHAIN_SERVICE: &str = "tabtab";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// Key retrieved from system keychain
    Keychain,
    /// Key retrieved from environment variable
    Environment,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

/// Environment variable holding a provider's key, e.g. `TABTAB_OPENAI_KEY`
pub fn env_var_name(provider: &str) -> String {
    format!("TABTAB_{}_KEY", provider.to_uppercase())
}

#[cfg(feature = "keychain")]
fn keychain_account(provider: &str) -> String {
    format!("provider/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
pub fn get_api_key(provider: &str) -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                if !key.trim().is_empty() {
                    return KeyLookup {
                        key: Some(key.trim().to_string()),
                        source: KeySource::Keychain,
                    };
                }
            }
        }
    }

    let env_name = env_var_name(provider);
    if let Ok(key) = env::var(&env_name) {
        if !key.trim().is_empty() {
            return KeyLookup {
                key: Some(key.trim().to_string()),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Store an API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;

    entry
        .set_password(key.trim())
        .map_err(|e| format!("Failed to store key in keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(_provider: &str, _key: &str) -> Result<(), String> {
    Err("Keychain support not enabled. Set TABTAB_<PROVIDER>_KEY environment variable instead.".to_string())
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "probe").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved provider configuration
// ============================================================================

/// Status of the provider configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Ready,
    /// Hosted provider without an API key
    MissingKey,
    /// No model chosen (Ollama and Gemini have no usable fallback)
    MissingModel,
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
            Self::MissingModel => "missing_model",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The effective provider configuration, resolved from settings, keychain
/// and environment.
#[derive(Debug, Clone)]
pub struct ResolvedProviderConfig {
    pub provider: AIProvider,
    /// Effective model (settings or provider default; may be empty)
    pub model: String,
    /// API base URL (endpoint for Ollama)
    pub base_url: String,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    pub status: ProviderStatus,
    /// Alert text when not ready
    pub blocking_reason: Option<String>,
}

impl ResolvedProviderConfig {
    pub fn from_settings(settings: &AISettings) -> Self {
        let lookup = if settings.provider.needs_api_key() {
            get_api_key(settings.provider.name())
        } else {
            KeyLookup { key: None, source: KeySource::None }
        };
        Self::resolve(settings, lookup)
    }

    /// Resolve with an explicit key lookup (no keychain/env access)
    pub fn resolve(settings: &AISettings, lookup: KeyLookup) -> Self {
        let provider = settings.provider;
        let model = settings.effective_model().to_string();

        let (status, blocking_reason) = if provider.needs_api_key() && lookup.key.is_none() {
            (
                ProviderStatus::MissingKey,
                Some(provider.missing_key_message()),
            )
        } else if model.is_empty() {
            (
                ProviderStatus::MissingModel,
                Some(provider.missing_model_message()),
            )
        } else {
            (ProviderStatus::Ready, None)
        };

        Self {
            provider,
            model,
            base_url: settings.effective_base_url().to_string(),
            api_key: if provider.needs_api_key() { lookup.key } else { None },
            key_source: lookup.source,
            status,
            blocking_reason,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

// ============================================================================
// Diagnostics (for CLI doctor)
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProviderDiagnostics {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub status: ProviderStatus,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
    pub key_env_var: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_reason: Option<String>,
}

impl ProviderDiagnostics {
    pub fn from_resolved(config: &ResolvedProviderConfig) -> Self {
        Self {
            provider: config.provider.name().to_string(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            status: config.status,
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
            key_env_var: env_var_name(config.provider.name()),
            blocking_reason: config.blocking_reason.clone(),
        }
    }

    pub fn from_settings(settings: &AISettings) -> Self {
        Self::from_resolved(&ResolvedProviderConfig::from_settings(settings))
    }
}

impl std::fmt::Display for ProviderDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Provider Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Provider:          {}", self.provider)?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        writeln!(f, "Model:             {}", if self.model.is_empty() { "(none)" } else { &self.model })?;
        writeln!(f, "Base URL:          {}", self.base_url)?;
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        writeln!(f, "Key env var:       {}", self.key_env_var)?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "Blocked:           {}", reason)?;
        }
        Ok(())
    }
}

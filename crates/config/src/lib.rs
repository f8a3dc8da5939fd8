// Configuration loading

pub mod ai;
pub mod guidelines;
pub mod prompts;
pub mod settings;

pub use ai::{ProviderDiagnostics, ProviderStatus, ResolvedProviderConfig};
pub use prompts::{ConfigError, PromptConfig};
pub use settings::{AIProvider, AISettings, Settings};

/// Error from a generation call
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateError {
    /// Provider not usable (missing key or model); carries the alert text
    NotConfigured(String),
    /// Transport failure (connection refused, timeout, TLS)
    Network(String),
    /// Non-2xx response; `message` is the provider's error text or
    /// `Request failed (<status>)`
    Api { status: u16, message: String },
    /// Success response that could not be decoded
    Parse(String),
    /// Completion was empty after cleanup; carries the provider display name
    EmptyResponse(String),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::NotConfigured(msg) => write!(f, "{}", msg),
            GenerateError::Network(msg) => write!(f, "Network error: {}", msg),
            GenerateError::Api { message, .. } => write!(f, "{}", message),
            GenerateError::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
            GenerateError::EmptyResponse(provider) => write!(f, "Empty response from {}", provider),
        }
    }
}

impl std::error::Error for GenerateError {}

impl GenerateError {
    /// True for failures that happen before any request is sent
    pub fn is_configuration(&self) -> bool {
        matches!(self, GenerateError::NotConfigured(_))
    }
}

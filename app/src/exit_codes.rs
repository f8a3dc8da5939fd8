//! CLI exit codes.
//!
//! Scripts branch on these, so a code never changes meaning once shipped.
//!
//! | Range | Domain    | Description                              |
//! |-------|-----------|------------------------------------------|
//! | 0     | Universal | Success                                  |
//! | 1     | Universal | General error (unspecified)              |
//! | 2     | Universal | CLI usage error (bad args, missing file) |
//! | 10-19 | provider  | Provider configuration and request codes |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments, unreadable input, invalid cell address.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Provider (10-19)
// =============================================================================

/// Provider is missing its API key or model; nothing was sent.
pub const EXIT_PROVIDER_NOT_CONFIGURED: u8 = 10;

/// The provider was called and failed (network, HTTP error, empty reply).
/// For batch commands: at least one cell got an error marker.
pub const EXIT_PROVIDER_FAILED: u8 = 11;

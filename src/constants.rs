//! Global constants for httpcheck
//!
//! Centralized location for application-wide constants

/// Well-known file name whose JSON array of relative paths replaces the
/// default directory listing for its containing directory
pub const INCLUDES_FILENAME: &str = "includes.json";

/// Build version injected by build.rs (VERSION env override, Cargo fallback)
pub const VERSION: &str = env!("HTTPCHECK_VERSION");

/// Short git commit hash injected by build.rs
pub const GIT_HASH: &str = env!("GIT_HASH");

// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - local: Resolves local links against static-site routing rules on disk
// - remote: Verifies remote links over HTTP with retry and redirect tolerance
//
// Local checks run first and synchronously; remote checks run afterward,
// once, over the full remote set. Both hand their outcomes back to the
// caller - neither touches the shared counters itself.
// =============================================================================

pub mod local;
pub mod remote;

// Re-export the public API so callers can write checker::check_local_link()
// without knowing the internal organization
pub use local::check_local_link;
pub use remote::{check_remote_links, CheckMode, RemoteConfig};

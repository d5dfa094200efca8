// src/policy/mod.rs
// =============================================================================
// Link classification policy.
//
// Submodules:
// - exclusion: URLs that are never checked (placeholders, local addresses)
// - auth: responses that look broken but are really login walls
//
// Both are data-driven so rules can be added without touching the verifier.
// =============================================================================

mod auth;
mod exclusion;

pub use auth::{AuthHeuristic, PathPattern};
pub use exclusion::{default_rules, ExclusionPolicy, ExclusionRule};

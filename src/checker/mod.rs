// src/checker/mod.rs
// =============================================================================
// This module contains the network side of link checking.
//
// Submodules:
// - probe: makes HTTP requests (the HttpProbe trait and its reqwest version)
// - retry: how often and how long to wait before trying again
// - verify: the per-URL state machine that turns responses into outcomes
//
// Rust concepts:
// - Modules: Organize code into namespaces
// - pub use: Re-export items to simplify imports for users of this module
// =============================================================================

mod probe;
mod retry;
mod verify;

pub use probe::{HttpProbe, Method, ProbeError, ProbeSettings, ReqwestProbe};
pub use retry::{linear_delay, RetryPolicy};
pub use verify::{CheckAttempt, Verifier};

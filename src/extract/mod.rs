// src/extract/mod.rs
// =============================================================================
// This module turns raw lines of text into clean link candidates.
//
// Submodules:
// - patterns: finds link candidates in a line (Markdown, <a>, <img>, bare)
// - normalize: strips markup residue from each candidate
// =============================================================================

mod normalize;
mod patterns;

pub use normalize::{is_http_url, NormalizeMode, Normalizer};
pub use patterns::Extractor;

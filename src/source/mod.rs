// src/source/mod.rs
// =============================================================================
// This module feeds text into the checker.
//
// It knows about the filesystem so the rest of the pipeline does not have
// to: everything downstream only sees (text, file, line) values.
// =============================================================================

mod walk;

pub use walk::{find_markdown_files, load_corpus, read_lines, Corpus};

// src/extract/normalize.rs
// =============================================================================
// This module cleans a raw link capture into a plausible URL.
//
// Captures taken straight out of Markdown/HTML often drag markup along with
// them: a closing quote, half an HTML tag, an image size hint, a title, a
// trailing full stop from the sentence the link sat in. We peel those off
// with a fixed, ordered list of regex trims.
//
// The list is applied repeatedly until the string stops changing. Every
// trim can only shorten the string, so the loop always ends, and the result
// is stable: normalizing twice gives the same answer as normalizing once.
//
// Rust concepts:
// - LazyLock: compile each regex once, on first use
// - Cow: Regex::replace returns a borrowed string when nothing matched
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

/// Which clean-up rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    /// Markdown and HTML residue only
    #[default]
    Standard,
    /// Also strip script fragments (`</script>`, `;// ...`, `',{...`)
    ScriptAware,
}

// Each stage is a list of (pattern -> "") trims, applied in order.
// The patterns are constants, so unwrap() can only fail on a typo here.
fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

// Stage 1: quote-and-tag residue
static TAG_RESIDUE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"\\"[^"]*$"#, // ends in \"...
        r#"\\">.*$"#,   // \"> and everything after
        r"<[^>]*$",     // unterminated <tag
        r">[^>]*$",     // trailing >...
        r#"\\".*$"#,    // any remaining \"
    ])
});

// Stage 2: duplicated markdown link tail, e.g. "url](url2"
static DUPLICATE_LINK_TAIL: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"\]\([^)]*$"]));

// Stage 3: image sizing suffixes (=200x100, =200x, =x100)
static IMAGE_SIZE: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"\s*=(?:[0-9]+x[0-9]*|x[0-9]+)$"]));

// Stage 4: trailing title, then stray quotes and '>'
static TITLE_AND_QUOTES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"\s*"[^"]*"$"#,
        r"\s*'[^']*'$",
        r#""\s*$"#,
        r"'\s*$",
        r">\s*$",
    ])
});

// Stage 5: backticks around inline-code links
static BACKTICKS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(&[r"`+$", r"^`+"]));

// Stage 6: sentence punctuation
static TRAILING_PUNCTUATION: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"[.,;!?]+$"]));

// Script-aware extras, run before stage 1
static SCRIPT_RESIDUE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"["']?\s*>?\s*</[A-Za-z][A-Za-z0-9]*\s*>?.*$"#, // "></script>
        r#"["'],\s*\{.*$"#,                                // ',{ ... } object literal
        r";\s*//.*$",                                      // ;// comment
        r";+\s*$",                                         // statement terminator
    ])
});

// Script-aware extra, run after stage 5 so leading backticks are gone
static BACKTICK_PROSE: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(&[r"`.*$"]));

/// Strips markup noise from raw link captures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    mode: NormalizeMode,
}

impl Normalizer {
    pub fn new(mode: NormalizeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> NormalizeMode {
        self.mode
    }

    /// Cleans `raw` until no rule applies any more.
    ///
    /// Never fails: garbage in gives best-effort trimmed garbage out, and the
    /// caller's scheme check decides whether it is a URL at all.
    pub fn normalize(&self, raw: &str) -> String {
        let mut current = raw.to_string();
        loop {
            let next = self.single_pass(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn single_pass(&self, input: &str) -> String {
        let script = self.mode == NormalizeMode::ScriptAware;
        let mut url = input.to_string();

        if script {
            url = apply(&SCRIPT_RESIDUE, url);
        }
        url = apply(&TAG_RESIDUE, url);
        url = apply(&DUPLICATE_LINK_TAIL, url);
        url = apply(&IMAGE_SIZE, url);
        url = apply(&TITLE_AND_QUOTES, url);
        url = apply(&BACKTICKS, url);
        if script {
            url = apply(&BACKTICK_PROSE, url);
        }
        url = apply(&TRAILING_PUNCTUATION, url);

        url.trim().to_string()
    }
}

// Runs every regex of a stage over the string, in order
fn apply(stage: &[Regex], mut url: String) -> String {
    for re in stage {
        if re.is_match(&url) {
            url = re.replace(&url, "").into_owned();
        }
    }
    url
}

/// True for the two schemes we actually check.
pub fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

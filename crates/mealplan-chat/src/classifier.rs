//! Free-text query classification.
//!
//! Decides whether a message asks for one recipe's ingredients and directions
//! or for general recommendations, and extracts the recipe name from detail
//! requests. Purely lexical: no language understanding.

use regex::Regex;
use std::sync::LazyLock;

// =============================================================================
// Compiled patterns (compiled once, reused across calls)
// =============================================================================

struct DetailPatterns {
    /// Input must start with one of these.
    prefix: Vec<Regex>,
    /// Input may contain one of these anywhere.
    contains: Vec<Regex>,
    /// Leading phrase to strip before the recipe name.
    leading: Regex,
}

static DETAIL_PATTERNS: LazyLock<DetailPatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("Invalid detail regex"))
            .collect()
    };

    DetailPatterns {
        prefix: mk(&[
            r"(?i)^how\s+do\s+i\s+make",
            r"(?i)^how\s+to\s+make",
            r"(?i)^recipe\s+for",
        ]),
        contains: mk(&[r"(?i)ingredients\s+for", r"(?i)directions\s+for"]),
        leading: Regex::new(
            r"(?is)^(?:how\s+do\s+i\s+make|how\s+to\s+make|recipe\s+for|ingredients\s+for|directions\s+for)\b(.*)$",
        )
        .expect("Invalid leading-phrase regex"),
    }
});

// =============================================================================
// QueryClassifier
// =============================================================================

/// Rule-based classifier for freeform chat input.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClassifier;

impl QueryClassifier {
    /// True when the input asks for a specific recipe's details.
    ///
    /// Matches, case-insensitively, input that starts with "how do i make",
    /// "how to make" or "recipe for", or that contains "ingredients for" or
    /// "directions for". Empty input is a general request.
    pub fn is_detail_request(&self, input: &str) -> bool {
        let text = input.trim();
        if text.is_empty() {
            return false;
        }

        let pats = &*DETAIL_PATTERNS;
        pats.prefix.iter().any(|re| re.is_match(text))
            || pats.contains.iter().any(|re| re.is_match(text))
    }

    /// The recipe name to look up for a detail request.
    ///
    /// Strips a recognized leading phrase plus trailing `?`, `.` or `!`.
    /// Returns the whole (trimmed) input when no phrase is stripped or
    /// nothing is left after stripping.
    pub fn detail_query(&self, input: &str) -> String {
        let text = input.trim();

        let stripped = DETAIL_PATTERNS
            .leading
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| {
                m.as_str()
                    .trim()
                    .trim_end_matches(['?', '.', '!'])
                    .trim_end()
            })
            .filter(|rest| !rest.is_empty());

        stripped.unwrap_or(text).to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Prompt-injection sanitizer for user-supplied component descriptions.
//!
//! A fixed, ordered list of case-insensitive patterns is compiled into a single
//! alternation. Matches are found left to right without overlap; when several patterns
//! match at the same position the one listed first wins. Each match is replaced by
//! [`BLOCKED_MARKER`] so the model still sees the rest of the request.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Inert placeholder substituted for every blocked phrase.
pub const BLOCKED_MARKER: &str = "[BLOCKED_INJECTION]";

/// Known override attempts, in match-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionPattern {
    /// "ignore previous instructions", "ignore all prior rules", ...
    IgnoreInstructions,
    /// "disregard the design system", "disregard above"
    DisregardRules,
    /// "override the colors", "override design tokens"
    OverrideTokens,
    /// "use red instead", "use #ff0000 color"
    SubstituteColor,
    /// "forget everything", "forget the rules"
    ForgetRules,
    /// "new rule:"
    NewRule,
    /// "do not follow"
    DoNotFollow,
}

impl InjectionPattern {
    pub const ALL: [Self; 7] = [
        Self::IgnoreInstructions,
        Self::DisregardRules,
        Self::OverrideTokens,
        Self::SubstituteColor,
        Self::ForgetRules,
        Self::NewRule,
        Self::DoNotFollow,
    ];

    /// Stable identifier used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IgnoreInstructions => "ignore_instructions",
            Self::DisregardRules => "disregard_rules",
            Self::OverrideTokens => "override_tokens",
            Self::SubstituteColor => "substitute_color",
            Self::ForgetRules => "forget_rules",
            Self::NewRule => "new_rule",
            Self::DoNotFollow => "do_not_follow",
        }
    }

    // Inner groups must stay non-capturing: group N+1 identifies pattern N.
    fn source(self) -> &'static str {
        match self {
            Self::IgnoreInstructions => {
                r"\bignore\s+(?:all\s+)?(?:the\s+)?(?:previous|prior|above|earlier|system)\s+(?:instructions?|prompts?|rules?)"
            }
            Self::DisregardRules => {
                r"\bdisregard\s+(?:the\s+)?(?:design|system|above|previous|prior)(?:\s+(?:system|rules?|instructions?|prompt))?"
            }
            Self::OverrideTokens => {
                r"\boverride\s+(?:the\s+)?(?:design|colou?rs?|fonts?|radius|spacing)(?:\s+(?:system|tokens?))?"
            }
            Self::SubstituteColor => {
                r"\buse\s+(?:the\s+)?(?:colou?r\s+#?\w+|red|blue|green|black|white|yellow|orange|pink|purple|#[0-9a-f]{3,8})\s+(?:instead|colou?r)"
            }
            Self::ForgetRules => r"\bforget\s+(?:everything|all|the\s+rules)",
            Self::NewRule => r"\bnew\s+rules?\b",
            Self::DoNotFollow => r"\bdo\s+not\s+follow",
        }
    }
}

impl fmt::Display for InjectionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A description with injection phrases neutralized.
///
/// Prompt construction only accepts this type, so raw user text cannot reach the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    text: String,
    matches: Vec<InjectionPattern>,
}

impl Sanitized {
    /// The cleaned, trimmed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Patterns that fired, one entry per replaced phrase, in input order.
    pub fn matches(&self) -> &[InjectionPattern] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_clean(&self) -> bool {
        self.matches.is_empty()
    }
}

fn combined_regex() -> &'static Regex {
    static COMBINED_RE: OnceLock<Regex> = OnceLock::new();
    COMBINED_RE.get_or_init(|| {
        let alternation = InjectionPattern::ALL
            .iter()
            .map(|p| format!("({})", p.source()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i){alternation}")).expect("valid injection regex")
    })
}

/// Replace every known injection phrase in `raw` with [`BLOCKED_MARKER`].
///
/// Finding nothing is the normal case and not an error.
pub fn sanitize(raw: &str) -> Sanitized {
    let re = combined_regex();
    let mut text = String::with_capacity(raw.len());
    let mut matches = Vec::new();
    let mut last = 0;

    for caps in re.captures_iter(raw) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let pattern = InjectionPattern::ALL
            .iter()
            .enumerate()
            .find_map(|(i, p)| caps.get(i + 1).map(|_| *p));
        if let Some(pattern) = pattern {
            matches.push(pattern);
        }
        text.push_str(&raw[last..whole.start()]);
        text.push_str(BLOCKED_MARKER);
        last = whole.end();
    }
    text.push_str(&raw[last..]);

    if !matches.is_empty() {
        tracing::warn!(
            count = matches.len(),
            patterns = %matches.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(","),
            "blocked prompt-injection phrases in description"
        );
    }

    Sanitized {
        text: text.trim().to_string(),
        matches,
    }
}

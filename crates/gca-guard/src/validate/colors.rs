//! Color vocabulary enforcement.
//!
//! Hex literals (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`) and named CSS colors used as
//! property values are collected in source order, normalized to lowercase `#rrggbb[aa]`,
//! and compared against the token set's authorized colors. Each distinct offending
//! color is reported once, at its first occurrence.

use super::{ErrorKind, ValidationError, ValidationWarning, WarningKind};
use gca_core::DesignTokenSet;
use gca_core::tokens::normalize_hex;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Named CSS colors recognized in property values, with their hex equivalents.
const NAMED_COLORS: &[(&str, &str)] = &[
    ("aqua", "#00ffff"),
    ("beige", "#f5f5dc"),
    ("black", "#000000"),
    ("blue", "#0000ff"),
    ("brown", "#a52a2a"),
    ("chocolate", "#d2691e"),
    ("coral", "#ff7f50"),
    ("crimson", "#dc143c"),
    ("cyan", "#00ffff"),
    ("fuchsia", "#ff00ff"),
    ("gold", "#ffd700"),
    ("gray", "#808080"),
    ("green", "#008000"),
    ("grey", "#808080"),
    ("indigo", "#4b0082"),
    ("ivory", "#fffff0"),
    ("khaki", "#f0e68c"),
    ("lavender", "#e6e6fa"),
    ("lime", "#00ff00"),
    ("magenta", "#ff00ff"),
    ("maroon", "#800000"),
    ("navy", "#000080"),
    ("olive", "#808000"),
    ("orange", "#ffa500"),
    ("orchid", "#da70d6"),
    ("pink", "#ffc0cb"),
    ("plum", "#dda0dd"),
    ("purple", "#800080"),
    ("red", "#ff0000"),
    ("salmon", "#fa8072"),
    ("sienna", "#a0522d"),
    ("silver", "#c0c0c0"),
    ("tan", "#d2b48c"),
    ("teal", "#008080"),
    ("tomato", "#ff6347"),
    ("turquoise", "#40e0d0"),
    ("violet", "#ee82ee"),
    ("wheat", "#f5deb3"),
    ("white", "#ffffff"),
    ("yellow", "#ffff00"),
];

fn hex_regex() -> &'static Regex {
    static HEX_RE: OnceLock<Regex> = OnceLock::new();
    HEX_RE.get_or_init(|| Regex::new(r"#[0-9a-fA-F]{3,8}\b").expect("valid hex regex"))
}

/// The value part of a `property: value` declaration, up to `;`, a brace or end of line.
fn declaration_regex() -> &'static Regex {
    static DECLARATION_RE: OnceLock<Regex> = OnceLock::new();
    DECLARATION_RE
        .get_or_init(|| Regex::new(r":([^;:{}\n]*)").expect("valid declaration regex"))
}

/// A color name starting a value or following whitespace, `,` or `(` inside one.
fn named_regex() -> &'static Regex {
    static NAMED_RE: OnceLock<Regex> = OnceLock::new();
    NAMED_RE.get_or_init(|| {
        let names = NAMED_COLORS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)(?:^|[\s,(])({names})\b")).expect("valid named color regex")
    })
}

fn functional_regex() -> &'static Regex {
    static FUNCTIONAL_RE: OnceLock<Regex> = OnceLock::new();
    FUNCTIONAL_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(rgba?|hsla?|hwb)\s*\(").expect("valid functional color regex")
    })
}

/// A color literal found in the source.
struct ColorUse<'a> {
    offset: usize,
    written: &'a str,
    normalized: String,
}

fn hex_uses(code: &str) -> impl Iterator<Item = ColorUse<'_>> {
    hex_regex().find_iter(code).filter_map(|m| {
        // `&#123;` is an HTML entity, `a#abc` is part of an identifier.
        let preceding = code[..m.start()].chars().next_back();
        if preceding.is_some_and(|c| c == '&' || c.is_alphanumeric() || c == '_') {
            return None;
        }
        let normalized = normalize_hex(m.as_str())?;
        Some(ColorUse {
            offset: m.start(),
            written: m.as_str(),
            normalized,
        })
    })
}

fn named_uses(code: &str) -> impl Iterator<Item = ColorUse<'_>> {
    declaration_regex()
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .flat_map(|value| {
            let text = value.as_str();
            named_regex().captures_iter(text).filter_map(move |caps| {
                let m = caps.get(1)?;
                // `: red-button` is an identifier, `'a red card'` is prose.
                if text[m.end()..].starts_with('-') || inside_quotes(&text[..m.start()]) {
                    return None;
                }
                let lower = m.as_str().to_ascii_lowercase();
                let hex = NAMED_COLORS
                    .iter()
                    .find(|(name, _)| *name == lower)
                    .map(|(_, hex)| *hex)?;
                Some(ColorUse {
                    offset: value.start() + m.start(),
                    written: m.as_str(),
                    normalized: hex.to_string(),
                })
            })
        })
}

fn inside_quotes(prefix: &str) -> bool {
    ['\'', '"', '`']
        .iter()
        .any(|q| prefix.chars().filter(|c| c == q).count() % 2 == 1)
}

pub(super) fn check_unauthorized_colors(
    code: &str,
    tokens: &DesignTokenSet,
) -> Vec<ValidationError> {
    let mut uses: Vec<ColorUse<'_>> = hex_uses(code).chain(named_uses(code)).collect();
    uses.sort_by_key(|u| u.offset);

    let authorized = tokens.authorized_colors().join(", ");
    let mut seen: HashSet<String> = HashSet::new();
    let mut errors = Vec::new();

    for color in uses {
        if tokens.is_authorized_hex(&color.normalized) {
            continue;
        }
        if !seen.insert(color.normalized.clone()) {
            continue;
        }
        let message = if color.written.starts_with('#') {
            format!(
                "'{}' is not in the design system. Authorized colors: {authorized}.",
                color.written
            )
        } else {
            format!(
                "Named color '{}' ({}) is not in the design system. \
                 Use only the authorized hex tokens: {authorized}.",
                color.written, color.normalized
            )
        };
        errors.push(ValidationError::new(ErrorKind::UnauthorisedColor, message));
    }

    errors
}

pub(super) fn check_functional_colors(code: &str) -> Option<ValidationWarning> {
    let mut found: Vec<String> = Vec::new();
    for caps in functional_regex().captures_iter(code) {
        if let Some(m) = caps.get(1) {
            let name = m.as_str().to_ascii_lowercase();
            if !found.contains(&name) {
                found.push(name);
            }
        }
    }
    if found.is_empty() {
        return None;
    }
    Some(ValidationWarning {
        kind: WarningKind::FunctionalColor,
        message: format!(
            "Functional color notation ({}) bypasses the hex token vocabulary. \
             Prefer the exact hex tokens.",
            found.join(", ")
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> DesignTokenSet {
        DesignTokenSet::builder("#6366f1", "8px", "Inter")
            .secondary_color("#f1f5f9")
            .build()
            .unwrap()
    }

    #[test]
    fn test_authorized_hex_in_any_form() {
        let tokens = tokens();
        let code = "a { color: #6366F1; background: #F1F5F9; border-color: #fff; fill: #000000 }";
        assert!(check_unauthorized_colors(code, &tokens).is_empty());
    }

    #[test]
    fn test_duplicates_reported_once() {
        let tokens = tokens();
        let code = "a { color: #ff0000 } b { color: #FF0000 } c { color: #f00 } d { color: #00ff00 }";
        let errors = check_unauthorized_colors(code, &tokens);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("'#ff0000'"));
        assert!(errors[1].message.contains("'#00ff00'"));
    }

    #[test]
    fn test_named_colors() {
        let tokens = tokens();
        let code = "a { color: Red; background: white; border-color: tomato; }";
        let errors = check_unauthorized_colors(code, &tokens);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("'Red'"));
        assert!(errors[1].message.contains("'tomato'"));
    }

    #[test]
    fn test_named_colors_inside_values() {
        let tokens = tokens();
        let code = "a { border: 1px solid tomato; background: linear-gradient(red, #6366f1); \
                    box-shadow: 0 0 2px navy,inset 0 0 1px gold }";
        let errors = check_unauthorized_colors(code, &tokens);
        let written: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.message.split('\'').nth(1))
            .collect();
        assert_eq!(written, ["tomato", "red", "navy", "gold"]);
    }

    #[test]
    fn test_named_colors_in_strings_are_prose() {
        let tokens = tokens();
        let code = "title: string = 'A gold star for the red team';\nlabel: `plum pudding`";
        assert!(check_unauthorized_colors(code, &tokens).is_empty());
    }

    #[test]
    fn test_named_and_hex_share_identity() {
        let tokens = tokens();
        let code = "a { color: red; } b { color: #ff0000; }";
        assert_eq!(check_unauthorized_colors(code, &tokens).len(), 1);
    }

    #[test]
    fn test_ignores_identifiers_and_entities() {
        let tokens = tokens();
        let code = "selector: 'app-card', status: red-alert, label: '&#123;', id: x#abc";
        assert!(check_unauthorized_colors(code, &tokens).is_empty());
    }

    #[test]
    fn test_alpha_hex_is_unauthorized() {
        let tokens = tokens();
        let errors = check_unauthorized_colors("a { color: #6366f1cc }", &tokens);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("#6366f1cc"));
    }

    #[test]
    fn test_functional_colors_warning() {
        assert!(check_functional_colors("color: #fff").is_none());
        let warning = check_functional_colors("a { color: RGBA(0, 0, 0, .5); b: hsl(1,2%,3%); c: rgba(1,1,1,1) }")
            .unwrap();
        assert_eq!(warning.kind, WarningKind::FunctionalColor);
        assert!(warning.message.contains("rgba, hsl"));
    }
}

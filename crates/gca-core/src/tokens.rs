//! Design tokens: the immutable visual vocabulary a generated component may use.
//!
//! The set is loaded once at startup from `design-system.json` (or a `.toml` file with
//! the same fields) and then shared read-only by the prompt builder and the validator.
//! Every value is checked for well-formedness on construction, so a `DesignTokenSet`
//! that exists is always valid.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Default token file name, resolved against the project root.
pub const DEFAULT_TOKENS_FILE: &str = "design-system.json";

/// Neutral colors authorized when the token file does not list its own.
pub const DEFAULT_NEUTRAL_COLORS: &[&str] = &["#ffffff", "#000000"];

/// Errors from loading or constructing a token set.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to read token file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse token file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid {field} token '{value}': expected {expected}")]
    Malformed {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// On-disk shape of the token file. Accepts snake_case and camelCase keys.
#[derive(Debug, Deserialize)]
struct RawTokens {
    #[serde(alias = "primaryColor")]
    primary_color: String,
    #[serde(alias = "borderRadius")]
    border_radius: String,
    #[serde(alias = "fontFamily")]
    font_family: String,
    #[serde(default, alias = "secondaryColor")]
    secondary_color: Option<String>,
    #[serde(default)]
    spacing: Option<String>,
    #[serde(default, alias = "neutralColors")]
    neutral_colors: Option<Vec<String>>,
}

/// The immutable design-token set.
///
/// Fields are private; the only way in is [`DesignTokenSet::builder`] or deserialization,
/// both of which validate every value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTokens")]
pub struct DesignTokenSet {
    primary_color: String,
    border_radius: String,
    font_family: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spacing: Option<String>,
    neutral_colors: Vec<String>,
}

impl TryFrom<RawTokens> for DesignTokenSet {
    type Error = TokenError;

    fn try_from(raw: RawTokens) -> Result<Self, Self::Error> {
        let mut builder =
            DesignTokenSet::builder(raw.primary_color, raw.border_radius, raw.font_family);
        if let Some(secondary) = raw.secondary_color {
            builder = builder.secondary_color(secondary);
        }
        if let Some(spacing) = raw.spacing {
            builder = builder.spacing(spacing);
        }
        if let Some(neutrals) = raw.neutral_colors {
            builder = builder.neutral_colors(neutrals);
        }
        builder.build()
    }
}

/// Builder for [`DesignTokenSet`]; validation happens in [`TokenSetBuilder::build`].
#[derive(Debug, Clone)]
pub struct TokenSetBuilder {
    primary_color: String,
    border_radius: String,
    font_family: String,
    secondary_color: Option<String>,
    spacing: Option<String>,
    neutral_colors: Option<Vec<String>>,
}

impl TokenSetBuilder {
    #[must_use]
    pub fn secondary_color(mut self, color: impl Into<String>) -> Self {
        self.secondary_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn spacing(mut self, spacing: impl Into<String>) -> Self {
        self.spacing = Some(spacing.into());
        self
    }

    /// Replace the default neutral colors (`#ffffff`, `#000000`).
    #[must_use]
    pub fn neutral_colors(mut self, colors: Vec<String>) -> Self {
        self.neutral_colors = Some(colors);
        self
    }

    pub fn build(self) -> Result<DesignTokenSet, TokenError> {
        let primary_color = require_hex("primary_color", self.primary_color)?;
        let border_radius = require_length("border_radius", self.border_radius)?;

        let font_family = self.font_family.trim().to_string();
        if font_family.is_empty() {
            return Err(TokenError::Malformed {
                field: "font_family",
                value: self.font_family,
                expected: "a non-empty font family name",
            });
        }

        let secondary_color = self
            .secondary_color
            .map(|c| require_hex("secondary_color", c))
            .transpose()?;
        let spacing = self
            .spacing
            .map(|s| require_length("spacing", s))
            .transpose()?;
        let neutral_colors = match self.neutral_colors {
            Some(colors) => colors
                .into_iter()
                .map(|c| require_hex("neutral_colors", c))
                .collect::<Result<Vec<_>, _>>()?,
            None => DEFAULT_NEUTRAL_COLORS
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        };

        Ok(DesignTokenSet {
            primary_color,
            border_radius,
            font_family,
            secondary_color,
            spacing,
            neutral_colors,
        })
    }
}

impl DesignTokenSet {
    /// Start building a token set from the three required tokens.
    pub fn builder(
        primary_color: impl Into<String>,
        border_radius: impl Into<String>,
        font_family: impl Into<String>,
    ) -> TokenSetBuilder {
        TokenSetBuilder {
            primary_color: primary_color.into(),
            border_radius: border_radius.into(),
            font_family: font_family.into(),
            secondary_color: None,
            spacing: None,
            neutral_colors: None,
        }
    }

    /// Load a token set from a `.json` or `.toml` file (chosen by extension; JSON otherwise).
    pub fn load(path: &Path) -> Result<Self, TokenError> {
        let content = std::fs::read_to_string(path).map_err(|source| TokenError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };
        parsed.map_err(|e| match e {
            TokenError::Parse { message, .. } => TokenError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, TokenError> {
        let raw: RawTokens = serde_json::from_str(content).map_err(|e| TokenError::Parse {
            path: PathBuf::from("<json>"),
            message: e.to_string(),
        })?;
        raw.try_into()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TokenError> {
        let raw: RawTokens = toml::from_str(content).map_err(|e| TokenError::Parse {
            path: PathBuf::from("<toml>"),
            message: e.to_string(),
        })?;
        raw.try_into()
    }

    pub fn primary_color(&self) -> &str {
        &self.primary_color
    }

    pub fn border_radius(&self) -> &str {
        &self.border_radius
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn secondary_color(&self) -> Option<&str> {
        self.secondary_color.as_deref()
    }

    pub fn spacing(&self) -> Option<&str> {
        self.spacing.as_deref()
    }

    pub fn neutral_colors(&self) -> &[String] {
        &self.neutral_colors
    }

    /// Every color the generated code may use, in token order:
    /// primary, secondary (if any), then neutrals. Values are as written in the token file.
    pub fn authorized_colors(&self) -> Vec<&str> {
        let mut colors = vec![self.primary_color.as_str()];
        if let Some(secondary) = &self.secondary_color {
            colors.push(secondary);
        }
        colors.extend(self.neutral_colors.iter().map(String::as_str));
        colors
    }

    /// Whether a hex literal is one of the authorized colors, after normalization.
    pub fn is_authorized_hex(&self, hex: &str) -> bool {
        let Some(candidate) = normalize_hex(hex) else {
            return false;
        };
        self.authorized_colors()
            .into_iter()
            .filter_map(normalize_hex)
            .any(|authorized| authorized == candidate)
    }
}

/// Normalize a hex color to lowercase, expanding `#rgb` to `#rrggbb` and `#rgba` to
/// `#rrggbbaa`. Returns `None` for anything that is not a 3/4/6/8-digit hex literal.
pub fn normalize_hex(value: &str) -> Option<String> {
    let digits = value.strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits = digits.to_ascii_lowercase();
    match digits.len() {
        3 | 4 => Some(format!(
            "#{}",
            digits
                .chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
        )),
        6 | 8 => Some(format!("#{digits}")),
        _ => None,
    }
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|d| matches!(d.len(), 3 | 6) && d.chars().all(|c| c.is_ascii_hexdigit()))
}

/// A CSS length: `0`, or a number followed by a length unit (`8px`, `0.5rem`, `100%`).
pub fn is_css_length(value: &str) -> bool {
    static LENGTH_RE: OnceLock<Regex> = OnceLock::new();
    let re = LENGTH_RE.get_or_init(|| {
        Regex::new(r"^(?:0|\d*\.?\d+(?:px|rem|em|%|vh|vw|vmin|vmax|pt|pc|cm|mm|in|ch|ex))$")
            .expect("valid length regex")
    });
    re.is_match(value)
}

fn require_hex(field: &'static str, value: String) -> Result<String, TokenError> {
    let trimmed = value.trim();
    if is_hex_color(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(TokenError::Malformed {
            field,
            value,
            expected: "a hex color (#rgb or #rrggbb)",
        })
    }
}

fn require_length(field: &'static str, value: String) -> Result<String, TokenError> {
    let trimmed = value.trim();
    if is_css_length(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(TokenError::Malformed {
            field,
            value,
            expected: "a CSS length such as 8px or 0.5rem",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indigo() -> DesignTokenSet {
        DesignTokenSet::builder("#6366f1", "8px", "Inter")
            .secondary_color("#f1f5f9")
            .spacing("16px")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults_neutrals() {
        let tokens = DesignTokenSet::builder("#6366f1", "8px", "Inter")
            .build()
            .unwrap();
        assert_eq!(tokens.neutral_colors(), ["#ffffff", "#000000"]);
        assert_eq!(tokens.secondary_color(), None);
        assert_eq!(tokens.authorized_colors(), vec!["#6366f1", "#ffffff", "#000000"]);
    }

    #[test]
    fn test_rejects_malformed_primary() {
        let err = DesignTokenSet::builder("indigo", "8px", "Inter")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TokenError::Malformed {
                field: "primary_color",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_radius_and_font() {
        assert!(
            DesignTokenSet::builder("#fff", "eight", "Inter")
                .build()
                .is_err()
        );
        assert!(DesignTokenSet::builder("#fff", "8px", "  ").build().is_err());
        assert!(
            DesignTokenSet::builder("#fff", "8px", "Inter")
                .spacing("lots")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_json_accepts_both_key_styles() {
        let snake = r##"{"primary_color": "#6366f1", "border_radius": "8px", "font_family": "Inter"}"##;
        let camel = r##"{"primaryColor": "#6366f1", "borderRadius": "8px", "fontFamily": "Inter"}"##;
        assert_eq!(
            DesignTokenSet::from_json_str(snake).unwrap(),
            DesignTokenSet::from_json_str(camel).unwrap()
        );
    }

    #[test]
    fn test_json_missing_required_field() {
        let err = DesignTokenSet::from_json_str(r##"{"primary_color": "#6366f1"}"##).unwrap_err();
        assert!(matches!(err, TokenError::Parse { .. }));
    }

    #[test]
    fn test_toml_tokens() {
        let toml_str = r##"
primary_color = "#6366f1"
secondary_color = "#f1f5f9"
border_radius = "8px"
font_family = "Inter"
spacing = "16px"
neutral_colors = ["#fff"]
"##;
        let tokens = DesignTokenSet::from_toml_str(toml_str).unwrap();
        assert_eq!(tokens.spacing(), Some("16px"));
        assert_eq!(tokens.neutral_colors(), ["#fff"]);
    }

    #[test]
    fn test_load_by_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let json_path = tmp.path().join("design-system.json");
        std::fs::write(
            &json_path,
            r##"{"primary_color": "#6366f1", "border_radius": "8px", "font_family": "Inter"}"##,
        )
        .unwrap();
        let tokens = DesignTokenSet::load(&json_path).unwrap();
        assert_eq!(tokens.primary_color(), "#6366f1");

        let missing = DesignTokenSet::load(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, TokenError::Io { .. }));

        let bad_path = tmp.path().join("bad.json");
        std::fs::write(&bad_path, "{ not json").unwrap();
        match DesignTokenSet::load(&bad_path).unwrap_err() {
            TokenError::Parse { path, .. } => assert_eq!(path, bad_path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("#FFF").as_deref(), Some("#ffffff"));
        assert_eq!(normalize_hex("#6366F1").as_deref(), Some("#6366f1"));
        assert_eq!(normalize_hex("#abcd").as_deref(), Some("#aabbccdd"));
        assert_eq!(normalize_hex("#12345"), None);
        assert_eq!(normalize_hex("6366f1"), None);
        assert_eq!(normalize_hex("#ggg"), None);
    }

    #[test]
    fn test_is_authorized_hex() {
        let tokens = indigo();
        assert!(tokens.is_authorized_hex("#6366F1"));
        assert!(tokens.is_authorized_hex("#F1F5F9"));
        assert!(tokens.is_authorized_hex("#fff"));
        assert!(tokens.is_authorized_hex("#000"));
        assert!(!tokens.is_authorized_hex("#ff0000"));
        assert!(!tokens.is_authorized_hex("#6366f1cc"));
    }

    #[test]
    fn test_css_length() {
        for ok in ["8px", "0", "0.5rem", ".75em", "100%", "12pt"] {
            assert!(is_css_length(ok), "{ok} should be a length");
        }
        for bad in ["8", "px", "8 px", "eight", "-"] {
            assert!(!is_css_length(bad), "{bad} should not be a length");
        }
    }
}

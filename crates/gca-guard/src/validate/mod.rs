//! Deterministic validation of generated component source.
//!
//! Five independent rules always run, in a fixed order, and their failures accumulate:
//!
//! 1. `MISSING_PRIMARY_COLOR`: primary color present (case-insensitive)
//! 2. `MISSING_BORDER_RADIUS`: radius token present (exact)
//! 3. `MISSING_FONT_FAMILY`: font family present (case-insensitive)
//! 4. `UNAUTHORISED_COLOR`: every hex literal and named color is an authorized token
//! 5. `UNBALANCED_BRACKETS`: `()`, `{}`, `[]` balance outside strings and comments
//!
//! An empty error list means the code passes. Warnings never fail validation.

mod brackets;
mod colors;
mod presence;
mod structure;

use gca_core::DesignTokenSet;
use serde::Serialize;
use std::fmt;

/// Machine-readable identifier of a failed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingPrimaryColor,
    MissingBorderRadius,
    MissingFontFamily,
    UnauthorisedColor,
    UnbalancedBrackets,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingPrimaryColor => "MISSING_PRIMARY_COLOR",
            Self::MissingBorderRadius => "MISSING_BORDER_RADIUS",
            Self::MissingFontFamily => "MISSING_FONT_FAMILY",
            Self::UnauthorisedColor => "UNAUTHORISED_COLOR",
            Self::UnbalancedBrackets => "UNBALANCED_BRACKETS",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A blocking rule failure; the message is written to be echoed into a correction prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Non-blocking advisory categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    /// The spacing token is configured but never used.
    SpacingNotUsed,
    /// `rgb()`, `hsl()` and friends bypass the hex token vocabulary.
    FunctionalColor,
    /// The source does not look like a complete component for its framework.
    IncompleteStructure,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SpacingNotUsed => "SPACING_NOT_USED",
            Self::FunctionalColor => "FUNCTIONAL_COLOR",
            Self::IncompleteStructure => "INCOMPLETE_STRUCTURE",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Errors plus advisory warnings for one piece of code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run the five blocking rules. Empty result means pass.
pub fn validate(code: &str, tokens: &DesignTokenSet) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(presence::check_primary_color(code, tokens));
    errors.extend(presence::check_border_radius(code, tokens));
    errors.extend(presence::check_font_family(code, tokens));
    errors.extend(colors::check_unauthorized_colors(code, tokens));
    errors.extend(brackets::check_brackets(code));
    errors
}

/// Run the blocking rules plus the advisory checks for `framework`.
pub fn validate_report(code: &str, tokens: &DesignTokenSet, framework: &str) -> ValidationReport {
    let errors = validate(code, tokens);

    let mut warnings = Vec::new();
    warnings.extend(presence::check_spacing(code, tokens));
    warnings.extend(colors::check_functional_colors(code));
    warnings.extend(structure::check_structure(code, framework));

    ValidationReport { errors, warnings }
}

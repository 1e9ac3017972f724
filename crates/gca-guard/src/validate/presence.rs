//! Required-token presence checks.

use super::{ErrorKind, ValidationError, ValidationWarning, WarningKind};
use gca_core::DesignTokenSet;

pub(super) fn check_primary_color(code: &str, tokens: &DesignTokenSet) -> Option<ValidationError> {
    let primary = tokens.primary_color();
    if contains_ignore_case(code, primary) {
        return None;
    }
    Some(ValidationError::new(
        ErrorKind::MissingPrimaryColor,
        format!(
            "The primary color '{primary}' was not found in the component. \
             Apply it to at least one interactive or accent element."
        ),
    ))
}

// Case-sensitive on purpose: "8PX" is not the token.
pub(super) fn check_border_radius(code: &str, tokens: &DesignTokenSet) -> Option<ValidationError> {
    let radius = tokens.border_radius();
    if code.contains(radius) {
        return None;
    }
    Some(ValidationError::new(
        ErrorKind::MissingBorderRadius,
        format!(
            "The border-radius token '{radius}' was not found in the component styles. \
             Apply it to cards, inputs, and buttons."
        ),
    ))
}

pub(super) fn check_font_family(code: &str, tokens: &DesignTokenSet) -> Option<ValidationError> {
    let font = tokens.font_family();
    if contains_ignore_case(code, font) {
        return None;
    }
    Some(ValidationError::new(
        ErrorKind::MissingFontFamily,
        format!(
            "The font-family token '{font}' was not found in the component styles. \
             Set font-family: '{font}', sans-serif on the host or wrapper element."
        ),
    ))
}

pub(super) fn check_spacing(code: &str, tokens: &DesignTokenSet) -> Option<ValidationWarning> {
    let spacing = tokens.spacing()?;
    if code.contains(spacing) {
        return None;
    }
    Some(ValidationWarning {
        kind: WarningKind::SpacingNotUsed,
        message: format!(
            "The spacing token '{spacing}' was not detected. \
             Consider using it for padding and margin."
        ),
    })
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

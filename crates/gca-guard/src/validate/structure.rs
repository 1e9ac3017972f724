//! Advisory structural checks for framework output.
//!
//! Only Angular has structural expectations today; other frameworks get no warnings.

use super::{ValidationWarning, WarningKind};
use regex::Regex;
use std::sync::OnceLock;

fn export_class_regex() -> &'static Regex {
    static EXPORT_CLASS_RE: OnceLock<Regex> = OnceLock::new();
    EXPORT_CLASS_RE
        .get_or_init(|| Regex::new(r"\bexport\s+class\b").expect("valid export regex"))
}

fn incomplete(message: &str) -> ValidationWarning {
    ValidationWarning {
        kind: WarningKind::IncompleteStructure,
        message: message.to_string(),
    }
}

pub(super) fn check_structure(code: &str, framework: &str) -> Vec<ValidationWarning> {
    if !framework.eq_ignore_ascii_case("angular") {
        return Vec::new();
    }

    let mut warnings = Vec::new();
    if !code.contains("@Component") {
        warnings.push(incomplete(
            "Missing @Component decorator; the output should be an Angular standalone component.",
        ));
    }
    if !export_class_regex().is_match(code) {
        warnings.push(incomplete(
            "Missing 'export class' declaration; the component class must be exported.",
        ));
    }
    let trimmed = code.trim_end();
    if !trimmed.is_empty() && !trimmed.ends_with('}') {
        warnings.push(incomplete(
            "Source does not end with '}'; the class body may be truncated.",
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_angular_component() {
        let code = "@Component({ selector: 'x' })\nexport class X {}\n";
        assert!(check_structure(code, "Angular").is_empty());
    }

    #[test]
    fn test_truncated_component() {
        let code = "@Component({ selector: 'x' })\nexport class X {\n  name = 'a';";
        let warnings = check_structure(code, "angular");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("truncated"));
    }

    #[test]
    fn test_other_frameworks_skip() {
        assert!(check_structure("function Card() { return null }", "React").is_empty());
    }
}

//! The governance layer around component generation.
//!
//! Everything here is deterministic and performs no I/O:
//!
//! - **sanitize**: neutralizes known prompt-injection phrases in the user's description
//! - **prompt**: composes the system directive and the initial/correction user messages
//! - **validate**: lexical and structural checks of generated source against the tokens

pub mod prompt;
pub mod sanitize;
pub mod validate;

pub use prompt::{Prompt, PromptBuilder};
pub use sanitize::{BLOCKED_MARKER, InjectionPattern, Sanitized, sanitize};
pub use validate::{
    ErrorKind, ValidationError, ValidationReport, ValidationWarning, WarningKind, validate,
    validate_report,
};

//! Token accounting across completion calls.

use crate::provider::LlmResponse;
use serde::Serialize;
use std::fmt;

/// Running totals for one generation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub calls: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Calls whose response did not report usage.
    pub unreported_calls: usize,
}

impl Usage {
    /// Record token usage from a response.
    pub fn record(&mut self, response: &LlmResponse) {
        self.calls += 1;
        if response.input_tokens.is_none() && response.output_tokens.is_none() {
            self.unreported_calls += 1;
        }
        if let Some(t) = response.input_tokens {
            self.input_tokens += t;
        }
        if let Some(t) = response.output_tokens {
            self.output_tokens += t;
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} call(s), {} input + {} output tokens",
            self.calls, self.input_tokens, self.output_tokens
        )?;
        if self.unreported_calls > 0 {
            write!(f, " ({} call(s) without usage data)", self.unreported_calls)?;
        }
        Ok(())
    }
}

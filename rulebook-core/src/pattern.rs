use regex::Regex;

/// Syntax check for patterns in the `regex` crate dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternCompiler {
    allow_empty: bool,
}

impl PatternCompiler {
    pub fn new(allow_empty: bool) -> Self {
        Self { allow_empty }
    }

    /// True when `pattern` compiles. The empty string is rejected unless
    /// configured otherwise, since it is also the unresolved-alias marker.
    pub fn is_valid(&self, pattern: &str) -> bool {
        if pattern.is_empty() {
            return self.allow_empty;
        }
        Regex::new(pattern).is_ok()
    }
}

//! rulex: a capture-aware Thompson NFA matcher for rule patterns.
//!
//! Patterns use a small syntax: literals, `\d`, bracketed classes with
//! ranges, negation and `&&` intersection, capturing groups, and the `+`, `?`
//! and `{m,n}` quantifiers. They are compiled into one shared automaton and
//! matched without backtracking; capture groups are recovered as a side
//! effect of the simulation.
//!
//! ```
//! use rulex::Registry;
//!
//! let mut reg = Registry::new();
//! reg.register(r"(\d+)-(\d+)", "range").unwrap();
//! reg.register(r"[a-z]+", "word").unwrap();
//!
//! let matches = reg.lookup_all("12-345");
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].group(2), Some("345"));
//! ```

pub mod automaton;
pub mod regexp;
mod registry;
mod thread_safe;

use std::fmt;

pub use automaton::{Match, MatchMode};
pub use regexp::{RegexpError, RegexpErrorKind};
pub use registry::{Config, Registry};
pub use thread_safe::SharedRegistry;

/// Errors returned when registering a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulexError {
    InvalidPattern {
        pattern: String,
        source: RegexpError,
    },
}

impl fmt::Display for RulexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulexError::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern {:?}: {}", pattern, source)
            }
        }
    }
}

impl std::error::Error for RulexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RulexError::InvalidPattern { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display_and_source() {
        let mut reg: Registry<u8> = Registry::new();
        let err = reg.register("a{3,1}", 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid pattern \"a{3,1}\": invalid range quantifier {3,1} at offset 1"
        );
        let source = err.source().unwrap().downcast_ref::<RegexpError>().unwrap();
        assert_eq!(source.kind, RegexpErrorKind::Validation);
    }

    #[test]
    fn test_end_to_end_examples() {
        let mut reg = Registry::new();
        reg.register("a{2,3}", "a").unwrap();
        assert_eq!(reg.lookup("aaa").unwrap().group(0), Some("aaa"));
        assert!(reg.lookup("a").is_none());
        assert!(reg.lookup("aaaa").is_none());

        let mut reg = Registry::new();
        reg.register(r"(\d+)-(\d+)", "r").unwrap();
        let m = reg.lookup("12-345").unwrap();
        assert_eq!((m.group(1), m.group(2)), (Some("12"), Some("345")));

        let config = Config::default().with_match_mode(MatchMode::LongestPrefix);
        let mut reg = Registry::with_config(config);
        reg.register("[a-c]+", "c").unwrap();
        assert_eq!(reg.lookup("abcx").unwrap().group(0), Some("abc"));
        reg.register("", "P").unwrap();
        let m = reg.lookup_all("xyz");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].payload(), &"P");
        assert_eq!(m[0].group(0), Some(""));
    }
}

//! Booleans that remember how they were computed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of comparing scores; only used to gate `ensure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedBool {
    pub value: bool,
    /// Human-readable account of the comparison
    pub trace: String,
}

impl ValidatedBool {
    pub fn new(value: bool, trace: impl Into<String>) -> Self {
        Self {
            value,
            trace: trace.into(),
        }
    }

    pub fn and(&self, other: &ValidatedBool) -> ValidatedBool {
        ValidatedBool::new(
            self.value && other.value,
            format!("({}) and ({})", self.trace, other.trace),
        )
    }

    pub fn or(&self, other: &ValidatedBool) -> ValidatedBool {
        ValidatedBool::new(
            self.value || other.value,
            format!("({}) or ({})", self.trace, other.trace),
        )
    }

    pub fn not(&self) -> ValidatedBool {
        ValidatedBool::new(!self.value, format!("not ({})", self.trace))
    }

    /// Numeric view used when compared against plain numbers.
    pub fn as_number(&self) -> f64 {
        if self.value {
            1.0
        } else {
            0.0
        }
    }
}

impl From<bool> for ValidatedBool {
    fn from(value: bool) -> Self {
        ValidatedBool::new(value, value.to_string())
    }
}

impl fmt::Display for ValidatedBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.value, self.trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logic_combines_traces() {
        let a = ValidatedBool::new(true, "a");
        let b = ValidatedBool::new(false, "b");
        let both = a.and(&b);
        assert!(!both.value);
        assert_eq!(both.trace, "(a) and (b)");
        assert!(a.or(&b).value);
        assert!(b.not().value);
        assert_eq!(b.not().as_number(), 1.0);
    }
}

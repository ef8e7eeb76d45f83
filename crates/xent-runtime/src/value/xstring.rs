//! Decorated strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text plus the context it is meant to be read in.
///
/// The `prefix` decoration is only set by [`XString::decorate`] and is only
/// consumed by scoring; it never leaks into `primary`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XString {
    pub primary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
}

impl XString {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            prefix: String::new(),
        }
    }

    pub fn decorated(primary: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            prefix: prefix.into(),
        }
    }

    pub fn is_decorated(&self) -> bool {
        !self.prefix.is_empty()
    }

    /// Length of the primary text in characters.
    pub fn len(&self) -> usize {
        self.primary.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// The same text with its decoration removed.
    pub fn plain(&self) -> XString {
        XString::new(self.primary.clone())
    }

    /// `self | context`: read `self` in the context of `context`.
    pub fn decorate(&self, context: &XString) -> XString {
        XString::decorated(self.primary.clone(), context.primary.clone())
    }

    /// `self + other`: joined primaries, keeping `self`'s decoration.
    pub fn concat(&self, other: &XString) -> XString {
        XString::decorated(
            format!("{}{}", self.primary, other.primary),
            self.prefix.clone(),
        )
    }

    /// `self // delimiter`: text before the first occurrence of `delimiter`.
    ///
    /// An empty or absent delimiter yields the whole text.
    pub fn cut_before(&self, delimiter: &str) -> XString {
        let primary = match self.find(delimiter) {
            Some(idx) => &self.primary[..idx],
            None => self.primary.as_str(),
        };
        XString::decorated(primary, self.prefix.clone())
    }

    /// `self % delimiter`: text after the first occurrence of `delimiter`.
    ///
    /// An absent delimiter yields empty text; an empty one yields the whole text.
    pub fn cut_after(&self, delimiter: &str) -> XString {
        let primary = if delimiter.is_empty() {
            self.primary.as_str()
        } else {
            match self.find(delimiter) {
                Some(idx) => &self.primary[idx + delimiter.len()..],
                None => "",
            }
        };
        XString::decorated(primary, self.prefix.clone())
    }

    fn find(&self, delimiter: &str) -> Option<usize> {
        if delimiter.is_empty() {
            return None;
        }
        self.primary.find(delimiter)
    }
}

impl From<&str> for XString {
    fn from(s: &str) -> Self {
        XString::new(s)
    }
}

impl fmt::Display for XString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.primary)
    }
}

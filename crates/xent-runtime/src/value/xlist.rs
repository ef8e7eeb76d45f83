//! Ordered string lists.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::XString;

/// An ordered sequence of decorated strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct XList {
    items: Vec<XString>,
}

impl XList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &XString> {
        self.items.iter()
    }

    pub fn push(&mut self, item: XString) {
        self.items.push(item);
    }

    /// `self + other`; the result length is the sum of both lengths.
    pub fn concat(&self, other: &XList) -> XList {
        let mut items = Vec::with_capacity(self.len() + other.len());
        items.extend(self.items.iter().cloned());
        items.extend(other.items.iter().cloned());
        XList { items }
    }
}

impl From<Vec<XString>> for XList {
    fn from(items: Vec<XString>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a XList {
    type Item = &'a XString;
    type IntoIter = std::slice::Iter<'a, XString>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for XList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", item.primary)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_is_length_additive() {
        let a = XList::from(vec![XString::new("a"), XString::new("b")]);
        let b = XList::from(vec![XString::new("c")]);
        let joined = a.concat(&b);
        assert_eq!(joined.len(), a.len() + b.len());
        let texts: Vec<_> = joined.iter().map(|s| s.primary.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_display() {
        let list = XList::from(vec![XString::new("a"), XString::new("b c")]);
        assert_eq!(list.to_string(), r#"["a", "b c"]"#);
    }
}

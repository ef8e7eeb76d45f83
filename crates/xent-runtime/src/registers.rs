//! Register catalogue and store
//!
//! Registers are named by a family letter and an instance number. The bare
//! letter is instance 0, so `s` and `s0` are the same slot.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{Value, XList, XString};

/// Number of instances per family (`s`, `s1`, `s2`, `s3`).
pub const INSTANCES_PER_FAMILY: u8 = 4;

/// What a register holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterKind {
    Scalar,
    List,
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterKind::Scalar => write!(f, "string"),
            RegisterKind::List => write!(f, "list"),
        }
    }
}

/// Static attributes of a register family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFamily {
    pub letter: char,
    pub kind: RegisterKind,
    /// Cannot be the target of `assign` or `elicit`
    pub is_static: bool,
    /// Included in the snapshot handed to players
    pub public: bool,
}

const fn family(letter: char, kind: RegisterKind, is_static: bool, public: bool) -> RegisterFamily {
    RegisterFamily {
        letter,
        kind,
        is_static,
        public,
    }
}

/// Every declared register family.
pub const REGISTER_FAMILIES: &[RegisterFamily] = &[
    family('a', RegisterKind::Scalar, false, true),
    family('b', RegisterKind::Scalar, false, true),
    family('c', RegisterKind::Scalar, false, true),
    family('s', RegisterKind::Scalar, false, true),
    family('t', RegisterKind::Scalar, false, true),
    family('x', RegisterKind::Scalar, false, false),
    family('y', RegisterKind::Scalar, false, false),
    family('p', RegisterKind::Scalar, true, true),
    family('l', RegisterKind::List, false, true),
];

/// Register identifier: family letter plus instance number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegisterId {
    family: char,
    index: u8,
}

impl RegisterId {
    /// Resolve a register name such as `s`, `s0` or `l3`.
    pub fn parse(name: &str) -> Option<RegisterId> {
        let mut chars = name.chars();
        let letter = chars.next()?;
        let digits = chars.as_str();
        let index = if digits.is_empty() {
            0
        } else if digits.bytes().all(|b| b.is_ascii_digit()) && digits.len() <= 3 {
            digits.parse::<u8>().ok()?
        } else {
            return None;
        };
        let id = RegisterId {
            family: letter,
            index,
        };
        id.family_info()?;
        (index < INSTANCES_PER_FAMILY).then_some(id)
    }

    /// Whether `name` has register shape (a single letter, then digits),
    /// declared or not.
    pub fn looks_like_register(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => chars.all(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    pub fn family_info(&self) -> Option<&'static RegisterFamily> {
        REGISTER_FAMILIES.iter().find(|f| f.letter == self.family)
    }

    pub fn kind(&self) -> RegisterKind {
        self.family_info()
            .map(|f| f.kind)
            .unwrap_or(RegisterKind::Scalar)
    }

    pub fn is_static(&self) -> bool {
        self.family_info().is_some_and(|f| f.is_static)
    }

    pub fn is_public(&self) -> bool {
        self.family_info().is_some_and(|f| f.public)
    }

    /// Every declared register, in catalogue order.
    pub fn all() -> impl Iterator<Item = RegisterId> {
        REGISTER_FAMILIES.iter().flat_map(|f| {
            (0..INSTANCES_PER_FAMILY).map(move |index| RegisterId {
                family: f.letter,
                index,
            })
        })
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.family)
        } else {
            write!(f, "{}{}", self.family, self.index)
        }
    }
}

impl TryFrom<String> for RegisterId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RegisterId::parse(&value).ok_or_else(|| format!("unknown register '{}'", value))
    }
}

impl From<RegisterId> for String {
    fn from(id: RegisterId) -> Self {
        id.to_string()
    }
}

/// Rejected register write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("register '{0}' is static")]
    Static(RegisterId),
    #[error("register '{register}' holds a {expected}, cannot store a {found}")]
    KindMismatch {
        register: RegisterId,
        expected: RegisterKind,
        found: &'static str,
    },
}

/// Contents of every declared register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterStore {
    slots: IndexMap<RegisterId, Value>,
}

impl RegisterStore {
    /// Fresh store: statics seeded from `presets`, everything else empty.
    pub fn new(presets: &IndexMap<String, String>) -> Self {
        let slots = RegisterId::all()
            .map(|id| {
                let value = match id.kind() {
                    RegisterKind::List => Value::List(XList::new()),
                    RegisterKind::Scalar => {
                        let text = if id.is_static() {
                            presets.get(&id.to_string()).cloned().unwrap_or_default()
                        } else {
                            String::new()
                        };
                        Value::Str(XString::new(text))
                    }
                };
                (id, value)
            })
            .collect();
        Self { slots }
    }

    pub fn get(&self, id: RegisterId) -> Option<&Value> {
        self.slots.get(&id)
    }

    /// Write a register, enforcing mutability and kind.
    pub fn set(&mut self, id: RegisterId, value: Value) -> Result<(), StoreError> {
        if id.is_static() {
            return Err(StoreError::Static(id));
        }
        let fits = matches!(
            (id.kind(), &value),
            (RegisterKind::Scalar, Value::Str(_)) | (RegisterKind::List, Value::List(_))
        );
        if !fits {
            return Err(StoreError::KindMismatch {
                register: id,
                expected: id.kind(),
                found: value.kind_name(),
            });
        }
        self.slots.insert(id, value);
        Ok(())
    }

    /// Public registers by name, in catalogue order.
    pub fn public_snapshot(&self) -> IndexMap<String, Value> {
        self.slots
            .iter()
            .filter(|(id, _)| id.is_public())
            .map(|(id, value)| (id.to_string(), value.clone()))
            .collect()
    }

    /// Clear list registers; scalars persist across rounds.
    pub fn reset_round(&mut self) {
        for (id, value) in self.slots.iter_mut() {
            if id.kind() == RegisterKind::List {
                *value = Value::List(XList::new());
            }
        }
    }
}

impl Default for RegisterStore {
    fn default() -> Self {
        Self::new(&IndexMap::new())
    }
}

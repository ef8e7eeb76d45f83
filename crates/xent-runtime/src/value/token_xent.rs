//! Per-token cross-entropy vectors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValueError;

/// Ordered `(token, cost)` pairs with a scalar multiplier.
///
/// Costs are in bits. Arithmetic between two vectors is only defined when
/// their token sequences line up exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenXentList {
    pub pairs: Vec<(String, f64)>,
    pub scale: f64,
}

impl TokenXentList {
    pub fn new(pairs: Vec<(String, f64)>) -> Self {
        Self { pairs, scale: 1.0 }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(token, _)| token.as_str())
    }

    /// Per-token costs with the multiplier applied.
    pub fn scaled_costs(&self) -> impl Iterator<Item = f64> + '_ {
        self.pairs.iter().map(move |(_, cost)| cost * self.scale)
    }

    /// Multiplier times the sum of per-token costs.
    pub fn total(&self) -> f64 {
        self.scale * self.pairs.iter().map(|(_, cost)| cost).sum::<f64>()
    }

    /// Whether the multiplier, every cost and the total are finite.
    pub fn is_finite(&self) -> bool {
        self.scale.is_finite()
            && self.pairs.iter().all(|(_, cost)| cost.is_finite())
            && self.total().is_finite()
    }

    /// Check that `other` has the same token sequence.
    pub fn check_aligned(&self, other: &TokenXentList) -> Result<(), ValueError> {
        if self.len() != other.len() {
            return Err(ValueError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        for (position, (left, right)) in self.tokens().zip(other.tokens()).enumerate() {
            if left != right {
                return Err(ValueError::TokenMismatch {
                    position,
                    left: left.to_string(),
                    right: right.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Position-wise sum of two aligned vectors.
    pub fn add_aligned(&self, other: &TokenXentList) -> Result<TokenXentList, ValueError> {
        self.combine(other, 1.0)
    }

    /// Position-wise difference of two aligned vectors.
    pub fn sub_aligned(&self, other: &TokenXentList) -> Result<TokenXentList, ValueError> {
        self.combine(other, -1.0)
    }

    fn combine(&self, other: &TokenXentList, sign: f64) -> Result<TokenXentList, ValueError> {
        self.check_aligned(other)?;
        let pairs = self
            .pairs
            .iter()
            .zip(&other.pairs)
            .map(|((token, left), (_, right))| {
                (
                    token.clone(),
                    self.scale * left + sign * other.scale * right,
                )
            })
            .collect();
        Ok(TokenXentList::new(pairs))
    }

    /// Scale the multiplier by `factor`.
    pub fn scale(&self, factor: f64) -> TokenXentList {
        TokenXentList {
            pairs: self.pairs.clone(),
            scale: self.scale * factor,
        }
    }

    pub fn neg(&self) -> TokenXentList {
        self.scale(-1.0)
    }
}

impl fmt::Display for TokenXentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xent[")?;
        for (i, ((token, _), cost)) in self.pairs.iter().zip(self.scaled_costs()).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {:.3}", token, cost)?;
        }
        write!(f, "] = {:.3}", self.total())
    }
}

//! The closed set of incident categories the classifier can emit.
//!
//! The declaration order of [`CrimeType`] is the model's output order: index 0
//! is `abuse`, index 3 is `arrest`. Tie-breaking during result composition
//! relies on this order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of labels in the classifier's output.
pub const LABEL_COUNT: usize = 4;

/// An incident category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrimeType {
    Abuse,
    Assault,
    Arson,
    Arrest,
}

impl CrimeType {
    /// All labels in model output order.
    pub const ALL: [CrimeType; LABEL_COUNT] = [
        CrimeType::Abuse,
        CrimeType::Assault,
        CrimeType::Arson,
        CrimeType::Arrest,
    ];

    /// Position of this label in the model's output vector.
    pub fn index(self) -> usize {
        match self {
            CrimeType::Abuse => 0,
            CrimeType::Assault => 1,
            CrimeType::Arson => 2,
            CrimeType::Arrest => 3,
        }
    }

    /// Wire name, e.g. `"assault"`.
    pub fn as_str(self) -> &'static str {
        match self {
            CrimeType::Abuse => "abuse",
            CrimeType::Assault => "assault",
            CrimeType::Arson => "arson",
            CrimeType::Arrest => "arrest",
        }
    }
}

impl fmt::Display for CrimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrimeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrimeType::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = CrimeType::ALL.iter().map(|l| l.as_str()).collect();
                CoreError::Validation(format!(
                    "Unknown crime type: '{s}'. Valid types: {}",
                    valid.join(", ")
                ))
            })
    }
}

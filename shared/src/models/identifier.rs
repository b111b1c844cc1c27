//! Identifier Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record type that owns an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    User,
    Order,
}

impl OwnerKind {
    /// Stable key used in storage rows
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::User => "user",
            OwnerKind::Order => "order",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(OwnerKind::User),
            "order" => Ok(OwnerKind::Order),
            other => Err(format!("Unknown owner kind: {}", other)),
        }
    }
}

/// Generation rule that produced an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// prefix + base-36 timestamp + random suffix
    Random,
    /// prefix + YYYYMMDD + per-day ordinal
    Sequential,
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdScheme::Random => f.write_str("random"),
            IdScheme::Sequential => f.write_str("sequential"),
        }
    }
}

/// An allocated, store-unique identifier
///
/// Never mutated or reused once assigned to its owning record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub value: String,
    pub scheme: IdScheme,
    pub owner: OwnerKind,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

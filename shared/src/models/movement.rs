//! Stock movement models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }

    /// Signed effect of `quantity` units on stock
    pub fn signed(&self, quantity: i32) -> i64 {
        match self {
            MovementType::In => i64::from(quantity),
            MovementType::Out => -i64::from(quantity),
        }
    }

    /// Spanish label used in reports and exports
    pub fn label(&self) -> &'static str {
        match self {
            MovementType::In => "Entrada",
            MovementType::Out => "Salida",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown movement type: {0}")]
pub struct UnknownMovementType(pub String);

impl FromStr for MovementType {
    type Err = UnknownMovementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            other => Err(UnknownMovementType(other.to_string())),
        }
    }
}

impl TryFrom<String> for MovementType {
    type Error = UnknownMovementType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

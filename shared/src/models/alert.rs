//! Stock alert models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of alert raised by an outgoing movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    LowStock,
    OutOfStock,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "LOW_STOCK",
            AlertKind::OutOfStock => "OUT_OF_STOCK",
        }
    }

    /// Human readable message stored with the alert row
    pub fn message(&self, product_name: &str, new_stock: i32) -> String {
        match self {
            AlertKind::LowStock => {
                format!("{} tiene stock bajo ({} unidades)", product_name, new_stock)
            }
            AlertKind::OutOfStock => format!("{} está sin stock", product_name),
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown alert type: {0}")]
pub struct UnknownAlertKind(pub String);

impl FromStr for AlertKind {
    type Err = UnknownAlertKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW_STOCK" => Ok(AlertKind::LowStock),
            "OUT_OF_STOCK" => Ok(AlertKind::OutOfStock),
            other => Err(UnknownAlertKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for AlertKind {
    type Error = UnknownAlertKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

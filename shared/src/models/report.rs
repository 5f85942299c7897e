//! Report models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::MovementType;

/// Placeholder shown in JSON reports for a product without categories
pub const NO_CATEGORY_DASH: &str = "-";

/// Report shapes served by the reporting engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportType {
    Stock,
    Movements,
    LowStock,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Stock => "stock",
            ReportType::Movements => "movements",
            ReportType::LowStock => "lowStock",
        }
    }

    /// Worksheet name used when exporting
    pub fn sheet_name(&self) -> &'static str {
        match self {
            ReportType::Stock => "Stock Actual",
            ReportType::Movements => "Movimientos",
            ReportType::LowStock => "Stock Bajo",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid report type: {0}")]
pub struct UnknownReportType(pub String);

impl FromStr for ReportType {
    type Err = UnknownReportType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stock" => Ok(ReportType::Stock),
            "movements" => Ok(ReportType::Movements),
            "lowStock" => Ok(ReportType::LowStock),
            other => Err(UnknownReportType(other.to_string())),
        }
    }
}

/// Sign of a product's net movement over a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NetDirection {
    In,
    Out,
    Neutral,
}

impl NetDirection {
    pub fn from_net(net: i64) -> Self {
        match net.signum() {
            1 => NetDirection::In,
            -1 => NetDirection::Out,
            _ => NetDirection::Neutral,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NetDirection::In => MovementType::In.label(),
            NetDirection::Out => MovementType::Out.label(),
            NetDirection::Neutral => "Neutro",
        }
    }
}

/// One product line of the stock snapshot and low-stock reports
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub current_stock: i32,
    pub min_stock: i32,
    pub categories: Vec<String>,
    /// Comma-joined category names, `-` when there are none
    pub category: String,
}

impl StockRow {
    pub fn new(
        id: Uuid,
        code: String,
        name: String,
        unit: String,
        current_stock: i32,
        min_stock: i32,
        categories: Vec<String>,
    ) -> Self {
        let category = crate::reporting::join_categories(&categories, NO_CATEGORY_DASH);
        Self {
            id,
            code,
            name,
            unit,
            current_stock,
            min_stock,
            categories,
            category,
        }
    }
}

/// A movement joined with its product, as read for the movements report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovementEntry {
    pub id: Uuid,
    pub product_id: Uuid,
    pub code: String,
    pub name: String,
    pub categories: Vec<String>,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub description: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
}

/// Detail-mode row: a movement plus the product's running balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovementDetailRow {
    #[serde(flatten)]
    pub entry: MovementEntry,
    pub category: String,
    pub balance: i64,
}

/// Grouped-mode row: every movement of one product in the range folded together
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupedMovementRow {
    pub product_id: Uuid,
    pub code: String,
    pub name: String,
    pub categories: Vec<String>,
    pub category: String,
    pub total_in: i64,
    pub total_out: i64,
    pub movement_count: i64,
    pub last_movement_date: DateTime<Utc>,
    pub net: i64,
    #[serde(rename = "type")]
    pub direction: NetDirection,
    pub quantity: i64,
    pub balance: i64,
}

//! Column layout and cell formatting for report exports
//!
//! Every report type has a static table of columns. Rows turn themselves into
//! cells through [`ExportRow`]; the backend only decides which file format the
//! cells are written to.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GroupedMovementRow, MovementDetailRow, ReportType, StockRow};
use crate::reporting::join_categories;

/// Placeholder for products without categories in exported files
pub const NO_CATEGORY: &str = "Sin categoría";

/// Minute precision, day first
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Source field a column reads from a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Code,
    Name,
    CurrentStock,
    MinStock,
    Categories,
    Date,
    Type,
    Quantity,
    Balance,
    Description,
    User,
    TotalIn,
    TotalOut,
    MovementCount,
}

/// One exported column: source field, header label and display width
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub field: Field,
    pub header: &'static str,
    pub width: Option<u16>,
}

const fn col(field: Field, header: &'static str, width: u16) -> Column {
    Column {
        field,
        header,
        width: Some(width),
    }
}

const STOCK_COLUMNS: &[Column] = &[
    col(Field::Code, "Código", 12),
    col(Field::Name, "Nombre", 30),
    col(Field::CurrentStock, "Stock Actual", 15),
    col(Field::MinStock, "Stock Mínimo", 15),
    col(Field::Categories, "Categoría", 20),
];

const MOVEMENT_COLUMNS: &[Column] = &[
    col(Field::Date, "Fecha", 18),
    col(Field::Code, "Código", 12),
    col(Field::Name, "Nombre", 30),
    col(Field::Type, "Tipo", 10),
    col(Field::Quantity, "Cantidad", 12),
    col(Field::Balance, "Saldo", 12),
    col(Field::Categories, "Categoría", 20),
    col(Field::Description, "Descripción", 40),
    col(Field::User, "Usuario", 20),
];

const GROUPED_MOVEMENT_COLUMNS: &[Column] = &[
    col(Field::Code, "Código", 12),
    col(Field::Name, "Nombre", 30),
    col(Field::Categories, "Categoría", 20),
    col(Field::Type, "Tipo", 10),
    col(Field::Quantity, "Cantidad", 12),
    col(Field::TotalIn, "Entradas", 12),
    col(Field::TotalOut, "Salidas", 12),
    col(Field::MovementCount, "Movimientos", 14),
    col(Field::Balance, "Saldo", 12),
    col(Field::Date, "Último Movimiento", 18),
];

/// Column table for a report
pub fn columns_for(report: ReportType, grouped: bool) -> &'static [Column] {
    match report {
        ReportType::Stock | ReportType::LowStock => STOCK_COLUMNS,
        ReportType::Movements if grouped => GROUPED_MOVEMENT_COLUMNS,
        ReportType::Movements => MOVEMENT_COLUMNS,
    }
}

/// Supported export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// Attachment filename, stamped with the export date and report type
pub fn export_filename(report: ReportType, date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "reporte-{}-{}.{}",
        report.as_str(),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// A single exported value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    fn int(n: impl Into<i64>) -> Self {
        Cell::Number(n.into() as f64)
    }
}

/// Render a timestamp in `tz` using [`DATE_FORMAT`]
pub fn format_datetime<Tz>(value: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    value.with_timezone(tz).format(DATE_FORMAT).to_string()
}

/// A report row that can be written to an export
pub trait ExportRow {
    /// Value for `field`, with dates rendered in `tz`. Fields a row does not
    /// carry come back as empty text.
    fn cell<Tz>(&self, field: Field, tz: &Tz) -> Cell
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display;
}

impl ExportRow for StockRow {
    fn cell<Tz>(&self, field: Field, _tz: &Tz) -> Cell
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match field {
            Field::Code => Cell::text(self.code.as_str()),
            Field::Name => Cell::text(self.name.as_str()),
            Field::CurrentStock => Cell::int(self.current_stock),
            Field::MinStock => Cell::int(self.min_stock),
            Field::Categories => Cell::text(join_categories(&self.categories, NO_CATEGORY)),
            _ => Cell::text(""),
        }
    }
}

impl ExportRow for MovementDetailRow {
    fn cell<Tz>(&self, field: Field, tz: &Tz) -> Cell
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let entry = &self.entry;
        match field {
            Field::Date => Cell::text(format_datetime(&entry.date, tz)),
            Field::Code => Cell::text(entry.code.as_str()),
            Field::Name => Cell::text(entry.name.as_str()),
            Field::Type => Cell::text(entry.movement_type.label()),
            Field::Quantity => Cell::int(entry.quantity),
            Field::Balance => Cell::int(self.balance),
            Field::Categories => Cell::text(join_categories(&entry.categories, NO_CATEGORY)),
            Field::Description => Cell::text(entry.description.as_str()),
            Field::User => Cell::text(entry.user_name.clone().unwrap_or_default()),
            _ => Cell::text(""),
        }
    }
}

impl ExportRow for GroupedMovementRow {
    fn cell<Tz>(&self, field: Field, tz: &Tz) -> Cell
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match field {
            Field::Code => Cell::text(self.code.as_str()),
            Field::Name => Cell::text(self.name.as_str()),
            Field::Categories => Cell::text(join_categories(&self.categories, NO_CATEGORY)),
            Field::Type => Cell::text(self.direction.label()),
            Field::Quantity => Cell::int(self.quantity),
            Field::TotalIn => Cell::int(self.total_in),
            Field::TotalOut => Cell::int(self.total_out),
            Field::MovementCount => Cell::int(self.movement_count),
            Field::Balance => Cell::int(self.balance),
            Field::Date => Cell::text(format_datetime(&self.last_movement_date, tz)),
            _ => Cell::text(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_filename_is_stamped() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 23).unwrap();
        assert_eq!(
            export_filename(ReportType::LowStock, date, ExportFormat::Xlsx),
            "reporte-lowStock-2024-12-23.xlsx"
        );
        assert_eq!(
            export_filename(ReportType::Stock, date, ExportFormat::Csv),
            "reporte-stock-2024-12-23.csv"
        );
    }

    #[test]
    fn test_stock_row_without_categories_uses_placeholder() {
        let row = StockRow::new(
            Uuid::new_v4(),
            "HERR001".into(),
            "Martillo".into(),
            "unidad".into(),
            3,
            5,
            vec![],
        );
        assert_eq!(row.cell(Field::Categories, &Utc), Cell::text(NO_CATEGORY));
        assert_eq!(row.cell(Field::CurrentStock, &Utc), Cell::Number(3.0));
        assert_eq!(row.cell(Field::Date, &Utc), Cell::text(""));
    }

    #[test]
    fn test_format_datetime_minute_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 14, 7, 59).unwrap();
        assert_eq!(format_datetime(&ts, &Utc), "05/01/2024 14:07");
    }

    #[test]
    fn test_every_table_has_widths() {
        for (report, grouped) in [
            (ReportType::Stock, false),
            (ReportType::LowStock, false),
            (ReportType::Movements, false),
            (ReportType::Movements, true),
        ] {
            let columns = columns_for(report, grouped);
            assert!(!columns.is_empty());
            assert!(columns.iter().all(|c| c.width.is_some()));
        }
    }
}

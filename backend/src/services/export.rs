//! Report export to spreadsheet workbooks and CSV

use std::fmt::Display;

use chrono::TimeZone;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::{AppError, AppResult};
use crate::services::reporting::ReportData;
use shared::export::{columns_for, Cell, Column, ExportFormat, ExportRow};
use shared::ReportType;

/// Parse the `format` query value; xlsx when absent
pub fn parse_format(raw: Option<&str>) -> AppResult<ExportFormat> {
    match raw.map(str::trim) {
        None | Some("") | Some("xlsx") => Ok(ExportFormat::Xlsx),
        Some("csv") => Ok(ExportFormat::Csv),
        Some(_) => Err(AppError::invalid(
            "format",
            "Format must be xlsx or csv",
            "El formato debe ser xlsx o csv",
        )),
    }
}

/// Render report rows into the bytes of an export file.
/// Dates are written in `tz`.
pub fn render<Tz>(
    data: &ReportData,
    report: ReportType,
    format: ExportFormat,
    tz: &Tz,
) -> AppResult<Vec<u8>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let columns = columns_for(report, data.is_grouped());
    let cells = match data {
        ReportData::Products { products } => to_cells(products, columns, tz),
        ReportData::Movements { movements } => to_cells(movements, columns, tz),
        ReportData::Grouped { movements } => to_cells(movements, columns, tz),
    };

    match format {
        ExportFormat::Xlsx => write_xlsx(report.sheet_name(), columns, &cells),
        ExportFormat::Csv => write_csv(columns, &cells),
    }
}

fn to_cells<R, Tz>(rows: &[R], columns: &[Column], tz: &Tz) -> Vec<Vec<Cell>>
where
    R: ExportRow,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    rows.iter()
        .map(|row| columns.iter().map(|c| row.cell(c.field, tz)).collect())
        .collect()
}

/// Single-sheet workbook with a bold header row
fn write_xlsx(sheet_name: &str, columns: &[Column], rows: &[Vec<Cell>]) -> AppResult<Vec<u8>> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| AppError::Internal(format!("XLSX export error: {}", e));

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(xlsx_err)?;

    for (col, column) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, column.header, &header_format)
            .map_err(xlsx_err)?;
        if let Some(width) = column.width {
            worksheet.set_column_width(col, width).map_err(xlsx_err)?;
        }
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => worksheet.write_string(row_num, col, text),
                Cell::Number(n) => worksheet.write_number(row_num, col, *n),
            }
            .map_err(xlsx_err)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

/// Comma separated text with a header line
fn write_csv(columns: &[Column], rows: &[Vec<Cell>]) -> AppResult<Vec<u8>> {
    let csv_err = |e: csv::Error| AppError::Internal(format!("CSV export error: {}", e));

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(columns.iter().map(|c| c.header))
        .map_err(csv_err)?;
    for row in rows {
        wtr.write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(csv_err)?;
    }

    wtr.into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))
}

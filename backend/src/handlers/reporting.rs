//! Reporting handlers for report queries and file export

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;

use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::services::export::{parse_format, render};
use crate::services::reporting::{ReportData, ReportQuery, ReportRequest};
use crate::services::ReportingService;
use crate::AppState;
use shared::export::export_filename;

/// Report rows as JSON
pub async fn get_report(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> AppResult<Json<ReportData>> {
    let request = ReportRequest::try_from(&query)?;

    let service = ReportingService::new(state.db.clone());
    let data = service.generate(&request).await?;

    Ok(Json(data))
}

/// Report rows as a downloadable xlsx or csv file
pub async fn export_report(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> AppResult<Response> {
    let request = ReportRequest::try_from(&query)?;
    let format = parse_format(query.format.as_deref())?;

    let service = ReportingService::new(state.db.clone());
    let data = service.generate(&request).await?;

    let bytes = render(&data, request.report_type, format, &Local)?;
    let filename = export_filename(request.report_type, Local::now().date_naive(), format);

    tracing::info!(
        report_type = %request.report_type,
        format = format.extension(),
        rows = data.row_count(),
        size = bytes.len(),
        "report exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

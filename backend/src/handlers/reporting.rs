//! Reporting handlers for the ingredient usage report

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::models::capability;
use shared::validation::{parse_report_date, resolve_report_range};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct UsageReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

/// Get the ingredient usage report
pub async fn get_ingredient_usage_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<UsageReportQuery>,
) -> AppResult<impl IntoResponse> {
    current_user.0.require(capability::REPORTS_VIEW)?;

    for (name, value) in [("from", &query.from), ("to", &query.to)] {
        if let Some(raw) = value.as_deref().filter(|v| parse_report_date(v).is_none()) {
            tracing::warn!(param = name, value = raw, "Ignoring malformed report date");
        }
    }

    let today = chrono::Utc::now().date_naive();
    let range = resolve_report_range(query.from.as_deref(), query.to.as_deref(), today);

    let service = ReportingService::new(state.db.clone());
    let report = service.ingredient_usage_report(range).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&report.rows)?;
        let disposition = format!(
            "attachment; filename=\"ingredient_usage_{}_{}.csv\"",
            report.from, report.to
        );
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(report).into_response())
    }
}

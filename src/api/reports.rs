use crate::error::LedgerError;
use crate::model::event::{EventAction, EventRecord};
use crate::report::{ReportAggregator, format_duration};
use crate::storage::codec::TIME_FORMAT;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct SummaryRow {
    #[schema(example = "Alice Carter")]
    pub name: String,
    #[schema(example = 600)]
    pub total_secs: u64,
    #[schema(example = "00:10:00")]
    pub total_display: String,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    #[schema(example = "2026-03-14", value_type = String)]
    pub date: String,
    pub rows: Vec<SummaryRow>,
}

#[derive(Serialize, ToSchema)]
pub struct DetailRow {
    #[schema(example = "09:10:00", value_type = String)]
    pub time: String,
    pub action: EventAction,
    #[schema(example = "04:A3:1B:2F")]
    pub uid: String,
    #[schema(example = "Alice Carter")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 600)]
    pub duration_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "00:10:00")]
    pub duration_display: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DetailResponse {
    #[schema(example = "2026-03-14", value_type = String)]
    pub date: String,
    pub records: Vec<DetailRow>,
}

impl From<EventRecord> for DetailRow {
    fn from(record: EventRecord) -> Self {
        DetailRow {
            time: record.time.format(TIME_FORMAT).to_string(),
            action: record.action,
            uid: record.uid,
            name: record.name,
            duration_secs: record.duration_secs,
            duration_display: record.duration_secs.map(format_duration),
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| LedgerError::Validation(format!("bad date '{raw}', expected YYYY-MM-DD")))
}

/// Daily summary: total time inside per name
#[utoipa::path(
    get,
    path = "/api/reports/{date}/summary",
    params(
        ("date", Path, description = "Calendar date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Per-name totals for the day; only completed sessions count", body = SummaryResponse),
        (status = 400, description = "Unparseable date"),
        (status = 503, description = "Storage busy, retry shortly"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Reports"
)]
pub async fn daily_summary(
    reports: web::Data<ReportAggregator>,
    path: web::Path<String>,
) -> Result<impl Responder, LedgerError> {
    let date = parse_date(&path)?;
    let totals = reports.summarize(date).await?;

    let rows = totals
        .into_iter()
        .map(|(name, total_secs)| SummaryRow {
            name,
            total_secs,
            total_display: format_duration(total_secs),
        })
        .collect();

    Ok(HttpResponse::Ok().json(SummaryResponse {
        date: date.to_string(),
        rows,
    }))
}

/// Detailed log: the day's events in append order
#[utoipa::path(
    get,
    path = "/api/reports/{date}/detail",
    params(
        ("date", Path, description = "Calendar date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Ordered event records for the day", body = DetailResponse),
        (status = 400, description = "Unparseable date"),
        (status = 503, description = "Storage busy, retry shortly"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Reports"
)]
pub async fn daily_detail(
    reports: web::Data<ReportAggregator>,
    path: web::Path<String>,
) -> Result<impl Responder, LedgerError> {
    let date = parse_date(&path)?;
    let records = reports.detail(date).await?;

    Ok(HttpResponse::Ok().json(DetailResponse {
        date: date.to_string(),
        records: records.into_iter().map(DetailRow::from).collect(),
    }))
}

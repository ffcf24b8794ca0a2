use crate::error::LedgerError;
use crate::ledger::{LiveFeed, ScanOutcome, SessionLedger};
use crate::model::event::EventAction;
use crate::storage::codec::TIME_FORMAT;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct ScanRequest {
    #[schema(example = "04:A3:1B:2F")]
    pub uid: String,
}

#[derive(Serialize, ToSchema)]
pub struct ScanResponse {
    pub accepted: bool,
    #[schema(example = "04:A3:1B:2F")]
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<EventAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Alice Carter")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "09:10:00", value_type = String)]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 600)]
    pub duration_secs: Option<u64>,
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Accepted(record) => ScanResponse {
                accepted: true,
                uid: record.uid,
                action: Some(record.action),
                name: Some(record.name),
                time: Some(record.time.format(TIME_FORMAT).to_string()),
                duration_secs: record.duration_secs,
            },
            ScanOutcome::UnknownCard { uid } => ScanResponse {
                accepted: false,
                uid,
                action: None,
                name: None,
                time: None,
                duration_secs: None,
            },
        }
    }
}

/// Badge scan endpoint, the software twin of the hardware reader feed.
#[utoipa::path(
    post,
    path = "/api/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan processed; accepted=false means the badge is not registered", body = ScanResponse),
        (status = 400, description = "Empty uid"),
        (status = 503, description = "Storage busy, retry shortly"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Scan"
)]
pub async fn scan_card(
    ledger: web::Data<SessionLedger>,
    feed: web::Data<LiveFeed>,
    payload: web::Json<ScanRequest>,
) -> Result<impl Responder, LedgerError> {
    let uid = payload.uid.trim();
    if uid.is_empty() {
        return Err(LedgerError::Validation("uid must not be empty".into()));
    }

    let outcome = ledger.scan(uid).await?;
    feed.record(uid, &outcome);

    Ok(HttpResponse::Ok().json(ScanResponse::from(outcome)))
}

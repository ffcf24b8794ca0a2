use crate::ledger::LiveFeed;
use crate::storage::codec::TIME_FORMAT;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Shape the dashboard polls; `-` placeholders match the display defaults.
#[derive(Serialize, ToSchema)]
pub struct LastEventResponse {
    #[schema(example = "09:10:00")]
    pub time: String,
    #[schema(example = "04:A3:1B:2F")]
    pub uid: String,
    #[schema(example = "Alice Carter")]
    pub name: String,
    #[schema(example = "EXIT")]
    pub action: String,
}

/// Most recent accepted event
#[utoipa::path(
    get,
    path = "/api/events/last",
    responses(
        (status = 200, description = "Most recent accepted event, '-' fields before the first one", body = LastEventResponse)
    ),
    tag = "Events"
)]
pub async fn last_event(feed: web::Data<LiveFeed>) -> impl Responder {
    let response = match feed.last_event() {
        Some(record) => LastEventResponse {
            time: record.time.format(TIME_FORMAT).to_string(),
            uid: record.uid,
            name: record.name,
            action: record.action.to_string(),
        },
        None => LastEventResponse {
            time: "-".to_string(),
            uid: "-".to_string(),
            name: "-".to_string(),
            action: "-".to_string(),
        },
    };
    HttpResponse::Ok().json(response)
}

/// Most recent raw UID seen by any scan source
///
/// Rejected scans count too: the registration page polls this to pick up
/// the uid of a card that is not in the directory yet.
#[utoipa::path(
    get,
    path = "/api/events/last-uid",
    responses(
        (status = 200, description = "Last seen uid as plain text, N/A before the first scan")
    ),
    tag = "Events"
)]
pub async fn last_uid(feed: web::Data<LiveFeed>) -> impl Responder {
    feed.last_uid().unwrap_or_else(|| "N/A".to_string())
}

use crate::config::Config;
use crate::error::LedgerError;
use crate::ledger::SessionLedger;
use crate::model::user::UserRecord;
use crate::storage::directory::UserDirectory;
use crate::utils::sheets_sync;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct AddUser {
    #[schema(example = "04:A3:1B:2F")]
    pub uid: String,
    #[schema(example = "Alice Carter")]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserStatus {
    #[schema(example = "04:A3:1B:2F")]
    pub uid: String,
    #[schema(example = "Alice Carter")]
    pub name: String,
    #[schema(example = true)]
    pub inside: bool,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserStatus>,
    #[schema(example = 12)]
    pub total: usize,
}

/// Register a badge
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = AddUser,
    responses(
        (status = 201, description = "User registered successfully", body = UserRecord),
        (status = 400, description = "Empty field or embedded comma", body = Object, example = json!({
            "error": "invalid input: name must not contain commas or line breaks"
        })),
        (status = 503, description = "Storage busy, retry shortly"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Users"
)]
pub async fn add_user(
    directory: web::Data<UserDirectory>,
    config: web::Data<Config>,
    payload: web::Json<AddUser>,
) -> Result<impl Responder, LedgerError> {
    let record = directory.add(&payload.uid, &payload.name).await?;
    info!(uid = %record.uid, name = %record.name, "user registered");

    sheets_sync::notify_user_list(config.sheets_sync_url.as_deref(), directory.snapshot());

    Ok(HttpResponse::Created().json(record))
}

/// List registered badges with their current inside/outside status
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Registered users", body = UserListResponse)
    ),
    tag = "Users"
)]
pub async fn list_users(
    directory: web::Data<UserDirectory>,
    ledger: web::Data<SessionLedger>,
) -> Result<impl Responder, LedgerError> {
    let mut data = Vec::new();
    for record in directory.snapshot() {
        let inside = ledger.is_inside(&record.uid).await;
        data.push(UserStatus {
            uid: record.uid,
            name: record.name,
            inside,
        });
    }

    let total = data.len();
    Ok(HttpResponse::Ok().json(UserListResponse { data, total }))
}

/// Delete a badge registration
#[utoipa::path(
    delete,
    path = "/api/users/{uid}",
    params(
        ("uid", Path, description = "Badge UID to remove")
    ),
    responses(
        (status = 200, description = "Every matching directory line removed", body = Object, example = json!({
            "message": "User removed"
        })),
        (status = 503, description = "Storage busy, retry shortly"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Users"
)]
pub async fn remove_user(
    directory: web::Data<UserDirectory>,
    ledger: web::Data<SessionLedger>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<impl Responder, LedgerError> {
    let uid = path.into_inner();

    // the badge reverts to OUTSIDE before its record disappears
    ledger.forget(&uid).await;
    directory.remove(&uid).await?;

    sheets_sync::notify_user_list(config.sheets_sync_url.as_deref(), directory.snapshot());

    Ok(HttpResponse::Ok().json(json!({
        "message": "User removed"
    })))
}

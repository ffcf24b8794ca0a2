use crate::api::events::LastEventResponse;
use crate::api::reports::{DetailResponse, DetailRow, SummaryResponse, SummaryRow};
use crate::api::scan::{ScanRequest, ScanResponse};
use crate::api::users::{AddUser, UserListResponse, UserStatus};
use crate::model::event::EventAction;
use crate::model::user::UserRecord;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RFID Access Control API",
        version = "1.0.0",
        description = r#"
## RFID Access Control System

This API fronts the access-ledger: badge scans, the user directory, and the
daily reports, all backed by flat files behind a single storage lock.

### 🔹 Key Features
- **Badge Scans**
  - Entry/exit toggling per badge, durably logged before state changes
- **User Management**
  - Register and delete badges; list with live inside/outside status
- **Reports**
  - Per-day totals per person and the full ordered event log
- **Live Events**
  - Last accepted event and last raw UID for the dashboard and the
    registration page

### 📦 Storage
- Flat `users.csv` directory and one append-only CSV log per calendar day
- Reader hardware feeds scans over a TCP line protocol, concurrently with
  this API

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::scan::scan_card,

        crate::api::users::add_user,
        crate::api::users::list_users,
        crate::api::users::remove_user,

        crate::api::reports::daily_summary,
        crate::api::reports::daily_detail,

        crate::api::events::last_event,
        crate::api::events::last_uid,
    ),
    components(
        schemas(
            ScanRequest,
            ScanResponse,
            AddUser,
            UserRecord,
            UserStatus,
            UserListResponse,
            SummaryRow,
            SummaryResponse,
            DetailRow,
            DetailResponse,
            LastEventResponse,
            EventAction
        )
    ),
    tags(
        (name = "Scan", description = "Badge scan APIs"),
        (name = "Users", description = "Badge directory APIs"),
        (name = "Reports", description = "Daily report APIs"),
        (name = "Events", description = "Live event feed APIs"),
    )
)]
pub struct ApiDoc;

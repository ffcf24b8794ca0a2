use crate::model::user::UserRecord;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

static HTTP: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Pushes the full user list to the configured sheet-sync webhook after a
/// directory mutation. Best-effort and fire-and-forget: the request runs on
/// a detached task, failures are logged and otherwise ignored, and the
/// mutation's result never depends on it. No URL configured means no-op.
pub fn notify_user_list(sync_url: Option<&str>, users: Vec<UserRecord>) {
    let Some(url) = sync_url else {
        return;
    };
    let url = url.to_string();

    tokio::spawn(async move {
        let count = users.len();
        let payload = serde_json::json!({ "users": users });
        match HTTP.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(users = count, "user list synced");
            }
            Ok(response) => {
                warn!(status = %response.status(), "user list sync rejected");
            }
            Err(e) => {
                warn!(error = %e, "user list sync failed");
            }
        }
    });
}

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wire form of the two log actions. The log and the API both carry the
/// uppercase form, so Display/FromStr and serde all agree on ENTRY/EXIT.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EventAction {
    Entry,
    Exit,
}

/// One row of a daily log, immutable once appended. `duration_secs` is
/// present exactly when the action is EXIT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub time: NaiveTime,
    pub action: EventAction,
    pub uid: String,
    pub name: String,
    pub duration_secs: Option<u64>,
}

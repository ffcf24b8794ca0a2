use crate::model::event::{EventAction, EventRecord};
use chrono::NaiveTime;

/// Fixed five-column row schema of the daily log:
/// `HH:MM:SS,ACTION,uid,name,duration_or_blank`. Encoding is unescaped, so
/// uids and names must not contain commas; the directory rejects such input
/// before it can ever reach an encoder.
pub const LOG_HEADER: &str = "time,action,uid,name,duration";

pub const TIME_FORMAT: &str = "%H:%M:%S";

pub fn encode_row(record: &EventRecord) -> String {
    let duration = record
        .duration_secs
        .map(|d| d.to_string())
        .unwrap_or_default();
    format!(
        "{},{},{},{},{}",
        record.time.format(TIME_FORMAT),
        record.action,
        record.uid,
        record.name,
        duration
    )
}

/// Decodes one log row. `None` means the line does not match the schema and
/// is skipped by readers; a damaged row never fails a whole report.
pub fn decode_row(line: &str) -> Option<EventRecord> {
    let cols: Vec<&str> = line.trim_end().split(',').collect();
    if cols.len() != 5 {
        return None;
    }

    let time = NaiveTime::parse_from_str(cols[0], TIME_FORMAT).ok()?;
    let action = cols[1].parse::<EventAction>().ok()?;
    let duration_secs = match action {
        EventAction::Entry => {
            if !cols[4].is_empty() {
                return None;
            }
            None
        }
        EventAction::Exit => Some(cols[4].parse::<u64>().ok()?),
    };

    Some(EventRecord {
        time,
        action,
        uid: cols[2].to_string(),
        name: cols[3].to_string(),
        duration_secs,
    })
}

use crate::error::LedgerError;
use crate::model::event::{EventAction, EventRecord};
use crate::storage::codec;
use crate::storage::daily_log::DailyLogStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

/// Read-only report computation over one day's log. Each view is its own
/// pass over the file; nothing is cached between calls, so a report always
/// reflects whatever the log held at read time.
pub struct ReportAggregator {
    log: DailyLogStore,
}

impl ReportAggregator {
    pub fn new(log: DailyLogStore) -> Self {
        Self { log }
    }

    /// Per-name total seconds inside for the given day. Only EXIT rows
    /// contribute; a badge currently inside counts zero until it exits.
    /// Unparseable rows are skipped.
    pub async fn summarize(&self, date: NaiveDate) -> Result<BTreeMap<String, u64>, LedgerError> {
        let lines = self.log.read_lines(date).await?;
        let mut totals = BTreeMap::new();
        for line in lines.iter().skip(1) {
            match codec::decode_row(line) {
                Some(record) if record.action == EventAction::Exit => {
                    *totals.entry(record.name).or_insert(0) +=
                        record.duration_secs.unwrap_or(0);
                }
                Some(_) => {}
                None => warn!(%line, "skipping unparseable log row"),
            }
        }
        Ok(totals)
    }

    /// The day's records in append order, for the detailed history view.
    /// Deliberately an independent pass, not derived from `summarize`.
    pub async fn detail(&self, date: NaiveDate) -> Result<Vec<EventRecord>, LedgerError> {
        let lines = self.log.read_lines(date).await?;
        let records = lines
            .iter()
            .skip(1)
            .filter_map(|line| {
                let record = codec::decode_row(line);
                if record.is_none() {
                    warn!(%line, "skipping unparseable log row");
                }
                record
            })
            .collect();
        Ok(records)
    }
}

/// Renders a second count as `HH:MM:SS`; hours are unbounded.
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::guard::StorageGuard;
    use chrono::NaiveTime;
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;

    fn aggregator() -> (tempfile::TempDir, DailyLogStore, ReportAggregator) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(
            StorageGuard::new(dir.path().to_path_buf(), Duration::from_millis(200)).unwrap(),
        );
        let log = DailyLogStore::new(storage);
        let reports = ReportAggregator::new(log.clone());
        (dir, log, reports)
    }

    fn record(
        hms: (u32, u32, u32),
        action: EventAction,
        uid: &str,
        name: &str,
        duration_secs: Option<u64>,
    ) -> EventRecord {
        EventRecord {
            time: NaiveTime::from_hms_opt(hms.0, hms.1, hms.2).unwrap(),
            action,
            uid: uid.to_string(),
            name: name.to_string(),
            duration_secs,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[tokio::test]
    async fn summarize_totals_exit_durations_per_name() {
        let (_dir, log, reports) = aggregator();
        let date = day();
        log.append(date, &record((9, 0, 0), EventAction::Entry, "A1", "Alice", None))
            .await
            .unwrap();
        log.append(date, &record((9, 5, 0), EventAction::Entry, "B2", "Bob", None))
            .await
            .unwrap();
        log.append(date, &record((9, 7, 0), EventAction::Exit, "B2", "Bob", Some(120)))
            .await
            .unwrap();
        log.append(date, &record((9, 10, 0), EventAction::Exit, "A1", "Alice", Some(600)))
            .await
            .unwrap();

        let totals = reports.summarize(date).await.unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Alice"], 600);
        assert_eq!(totals["Bob"], 120);
    }

    #[tokio::test]
    async fn open_sessions_do_not_contribute() {
        let (_dir, log, reports) = aggregator();
        let date = day();
        log.append(date, &record((9, 0, 0), EventAction::Entry, "C3", "Cara", None))
            .await
            .unwrap();

        let totals = reports.summarize(date).await.unwrap();
        assert!(totals.is_empty());
    }

    #[tokio::test]
    async fn repeat_visits_accumulate() {
        let (_dir, log, reports) = aggregator();
        let date = day();
        for (time, duration) in [((9, 10, 0), 600), ((14, 0, 0), 300)] {
            log.append(date, &record(time, EventAction::Exit, "A1", "Alice", Some(duration)))
                .await
                .unwrap();
        }
        let totals = reports.summarize(date).await.unwrap();
        assert_eq!(totals["Alice"], 900);
    }

    #[tokio::test]
    async fn detail_preserves_append_order() {
        let (_dir, log, reports) = aggregator();
        let date = day();
        let rows = [
            record((9, 0, 0), EventAction::Entry, "A1", "Alice", None),
            record((9, 5, 0), EventAction::Entry, "B2", "Bob", None),
            record((9, 7, 0), EventAction::Exit, "B2", "Bob", Some(120)),
        ];
        for row in &rows {
            log.append(date, row).await.unwrap();
        }

        let detail = reports.detail(date).await.unwrap();
        assert_eq!(detail, rows);
    }

    #[tokio::test]
    async fn damaged_rows_are_skipped_not_fatal() {
        let (dir, log, reports) = aggregator();
        let date = day();
        log.append(date, &record((9, 10, 0), EventAction::Exit, "A1", "Alice", Some(600)))
            .await
            .unwrap();

        // corrupt the file the way a torn write would
        let path = dir.path().join("logs/2026/03/14.csv");
        let mut contents = fs::read_to_string(&path).unwrap();
        contents.push_str("09:11:0\n");
        contents.push_str("09:12:00,EXIT,B2,Bob,120\n");
        fs::write(&path, contents).unwrap();

        let totals = reports.summarize(date).await.unwrap();
        assert_eq!(totals["Alice"], 600);
        assert_eq!(totals["Bob"], 120);
        assert_eq!(reports.detail(date).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_day_yields_empty_report() {
        let (_dir, _log, reports) = aggregator();
        assert!(reports.summarize(day()).await.unwrap().is_empty());
        assert!(reports.detail(day()).await.unwrap().is_empty());
    }

    #[test]
    fn format_duration_renders_hms() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(59), "00:00:59");
        assert_eq!(format_duration(600), "00:10:00");
        assert_eq!(format_duration(3661), "01:01:01");
        assert_eq!(format_duration(90_000), "25:00:00");
    }
}

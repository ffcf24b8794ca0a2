use crate::error::LedgerError;
use crate::model::event::{EventAction, EventRecord};
use crate::storage::daily_log::DailyLogStore;
use crate::storage::directory::UserDirectory;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::info;

/// Result of one badge scan. Unknown cards are a normal negative outcome,
/// not an error: nothing is logged and no state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Accepted(EventRecord),
    UnknownCard { uid: String },
}

/// In-memory inside/outside state machine per badge. Every uid starts
/// OUTSIDE; a scan toggles it, ENTRY then EXIT then ENTRY. State is not
/// persisted, so a restart resets every badge to OUTSIDE — the daily log is
/// the authoritative record.
pub struct SessionLedger {
    directory: Arc<UserDirectory>,
    log: DailyLogStore,
    /// uid → entry timestamp; present exactly while the badge is INSIDE.
    sessions: Mutex<HashMap<String, DateTime<Local>>>,
}

impl SessionLedger {
    pub fn new(directory: Arc<UserDirectory>, log: DailyLogStore) -> Self {
        Self {
            directory,
            log,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Processes one badge scan. The event row is durably appended to the
    /// day's log *before* the in-memory transition completes, so a crash
    /// between the two leaves the log authoritative; the worst case on
    /// restart is a duplicated ENTRY/EXIT pair on the next scan, never a
    /// lost one. The session map's lock is held across the append so scans
    /// of the same uid serialize.
    pub async fn scan(&self, uid: &str) -> Result<ScanOutcome, LedgerError> {
        let uid = uid.trim();
        let Some(name) = self.directory.name_of(uid) else {
            info!(uid, "scan rejected, badge not registered");
            return Ok(ScanOutcome::UnknownCard {
                uid: uid.to_string(),
            });
        };

        let mut sessions = self.sessions.lock().await;
        let now = Local::now();
        let record = match sessions.get(uid) {
            Some(entered_at) => EventRecord {
                time: now.time(),
                action: EventAction::Exit,
                uid: uid.to_string(),
                name,
                duration_secs: Some((now - *entered_at).num_seconds().max(0) as u64),
            },
            None => EventRecord {
                time: now.time(),
                action: EventAction::Entry,
                uid: uid.to_string(),
                name,
                duration_secs: None,
            },
        };

        self.log.append(now.date_naive(), &record).await?;

        match record.action {
            EventAction::Entry => {
                sessions.insert(uid.to_string(), now);
            }
            EventAction::Exit => {
                sessions.remove(uid);
            }
        }

        info!(
            uid,
            name = %record.name,
            action = %record.action,
            duration_secs = record.duration_secs,
            "scan accepted"
        );
        Ok(ScanOutcome::Accepted(record))
    }

    /// Drops a badge's session state, reverting it to the OUTSIDE default.
    /// Called when its user record is deleted from the directory.
    pub async fn forget(&self, uid: &str) {
        self.sessions.lock().await.remove(uid.trim());
    }

    pub async fn is_inside(&self, uid: &str) -> bool {
        self.sessions.lock().await.contains_key(uid)
    }
}

/// Most recent activity, polled by the dashboard and the registration page.
/// `last_uid` is updated for every scan, accepted or not — the registration
/// flow relies on it to capture the uid of a brand-new card.
#[derive(Default)]
pub struct LiveFeed {
    last_event: RwLock<Option<EventRecord>>,
    last_uid: RwLock<Option<String>>,
}

impl LiveFeed {
    pub fn record(&self, uid: &str, outcome: &ScanOutcome) {
        *self.last_uid.write().unwrap() = Some(uid.to_string());
        if let ScanOutcome::Accepted(record) = outcome {
            *self.last_event.write().unwrap() = Some(record.clone());
        }
    }

    pub fn last_event(&self) -> Option<EventRecord> {
        self.last_event.read().unwrap().clone()
    }

    pub fn last_uid(&self) -> Option<String> {
        self.last_uid.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::guard::StorageGuard;
    use std::time::Duration;

    async fn ledger_with_user(uid: &str, name: &str) -> (tempfile::TempDir, SessionLedger) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(
            StorageGuard::new(dir.path().to_path_buf(), Duration::from_millis(200)).unwrap(),
        );
        let directory = Arc::new(UserDirectory::new(storage.clone()));
        directory.add(uid, name).await.unwrap();
        let ledger = SessionLedger::new(directory, DailyLogStore::new(storage));
        (dir, ledger)
    }

    fn accepted(outcome: ScanOutcome) -> EventRecord {
        match outcome {
            ScanOutcome::Accepted(record) => record,
            other => panic!("expected accepted scan, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn scans_alternate_entry_exit_entry() {
        let (_dir, ledger) = ledger_with_user("04A3", "Alice").await;

        let first = accepted(ledger.scan("04A3").await.unwrap());
        assert_eq!(first.action, EventAction::Entry);
        assert_eq!(first.duration_secs, None);
        assert!(ledger.is_inside("04A3").await);

        let second = accepted(ledger.scan("04A3").await.unwrap());
        assert_eq!(second.action, EventAction::Exit);
        assert!(second.duration_secs.is_some());
        assert!(!ledger.is_inside("04A3").await);

        let third = accepted(ledger.scan("04A3").await.unwrap());
        assert_eq!(third.action, EventAction::Entry);
    }

    #[tokio::test]
    async fn unknown_card_logs_nothing() {
        let (_dir, ledger) = ledger_with_user("04A3", "Alice").await;
        ledger.scan("04A3").await.unwrap();

        let today = Local::now().date_naive();
        let before = ledger.log.read_lines(today).await.unwrap().len();

        let outcome = ledger.scan("FFFF").await.unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::UnknownCard {
                uid: "FFFF".to_string()
            }
        );
        let after = ledger.log.read_lines(today).await.unwrap().len();
        assert_eq!(before, after);
        assert!(!ledger.is_inside("FFFF").await);
    }

    #[tokio::test]
    async fn scan_trims_reader_whitespace() {
        let (_dir, ledger) = ledger_with_user("04A3", "Alice").await;
        let record = accepted(ledger.scan(" 04A3\r").await.unwrap());
        assert_eq!(record.uid, "04A3");
    }

    #[tokio::test]
    async fn forget_reverts_badge_to_outside() {
        let (_dir, ledger) = ledger_with_user("04A3", "Alice").await;
        accepted(ledger.scan("04A3").await.unwrap());
        assert!(ledger.is_inside("04A3").await);

        ledger.forget("04A3").await;
        assert!(!ledger.is_inside("04A3").await);

        // the next scan starts a fresh session rather than closing one
        let record = accepted(ledger.scan("04A3").await.unwrap());
        assert_eq!(record.action, EventAction::Entry);
    }

    #[tokio::test]
    async fn exit_duration_is_non_negative() {
        let (_dir, ledger) = ledger_with_user("04A3", "Alice").await;
        accepted(ledger.scan("04A3").await.unwrap());
        let exit = accepted(ledger.scan("04A3").await.unwrap());
        assert!(exit.duration_secs.unwrap() < 60);
    }

    #[tokio::test]
    async fn live_feed_tracks_rejected_uids_too() {
        let feed = LiveFeed::default();
        assert_eq!(feed.last_uid(), None);

        feed.record(
            "FFFF",
            &ScanOutcome::UnknownCard {
                uid: "FFFF".to_string(),
            },
        );
        assert_eq!(feed.last_uid().as_deref(), Some("FFFF"));
        assert!(feed.last_event().is_none());
    }
}

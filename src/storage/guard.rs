use crate::error::LedgerError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;

/// The single mutual-exclusion wrapper around the storage medium. Every
/// filesystem touch in the service happens while holding the guard returned
/// by [`StorageGuard::acquire`]; the lock is released when that guard drops,
/// on every exit path. Multi-step operations (read-filter-rewrite) run
/// inside one acquisition so they act as one logical unit.
pub struct StorageGuard {
    medium: Mutex<StorageMedium>,
    wait: Duration,
}

/// Path layout of the storage medium. Holding a `&StorageMedium` (only
/// reachable through an acquired guard) is the permission to touch the files
/// it points at.
#[derive(Debug)]
pub struct StorageMedium {
    root: PathBuf,
}

impl StorageMedium {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Flat user-directory file, `uid,name` per line.
    pub fn users_path(&self) -> PathBuf {
        self.root.join("users.csv")
    }

    /// Scratch file used by the copy-filter-rename delete.
    pub fn users_tmp_path(&self) -> PathBuf {
        self.root.join("users.tmp")
    }

    /// One log file per calendar day, grouped by year and month.
    pub fn day_log_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join("logs")
            .join(date.format("%Y").to_string())
            .join(date.format("%m").to_string())
            .join(format!("{}.csv", date.format("%d")))
    }
}

impl StorageGuard {
    pub fn new(root: PathBuf, wait: Duration) -> std::io::Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            medium: Mutex::new(StorageMedium { root }),
            wait,
        })
    }

    /// Exclusive access to the medium, or `Busy` after the bounded wait.
    /// Never held across sending a response; callers retry on `Busy`.
    pub async fn acquire(&self) -> Result<MutexGuard<'_, StorageMedium>, LedgerError> {
        timeout(self.wait, self.medium.lock())
            .await
            .map_err(|_| LedgerError::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard_with_wait(ms: u64) -> (tempfile::TempDir, StorageGuard) {
        let dir = tempfile::tempdir().unwrap();
        let guard = StorageGuard::new(dir.path().to_path_buf(), Duration::from_millis(ms)).unwrap();
        (dir, guard)
    }

    #[tokio::test]
    async fn second_acquire_fails_busy_while_held() {
        let (_dir, guard) = guard_with_wait(50);
        let held = guard.acquire().await.unwrap();
        let err = guard.acquire().await.unwrap_err();
        assert!(matches!(err, LedgerError::Busy));
        drop(held);
    }

    #[tokio::test]
    async fn released_guard_can_be_reacquired() {
        let (_dir, guard) = guard_with_wait(50);
        drop(guard.acquire().await.unwrap());
        assert!(guard.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn day_log_paths_group_by_year_and_month() {
        let (_dir, guard) = guard_with_wait(50);
        let medium = guard.acquire().await.unwrap();
        let path = medium.day_log_path(NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert!(path.ends_with("logs/2026/03/07.csv"));
    }
}

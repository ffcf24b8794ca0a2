use crate::error::LedgerError;
use crate::model::user::UserRecord;
use crate::storage::guard::StorageGuard;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Persistent uid→name directory backed by the flat `users.csv` file. The
/// in-memory map is a derived cache rebuilt by [`load`](Self::load) after
/// every mutation; the file stays the sole source of truth.
pub struct UserDirectory {
    storage: Arc<StorageGuard>,
    users: RwLock<HashMap<String, String>>,
}

impl UserDirectory {
    pub fn new(storage: Arc<StorageGuard>) -> Self {
        Self {
            storage,
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuilds the in-memory map from the backing file. A missing file is
    /// an empty directory. Lines without a separator are skipped; a uid
    /// appearing on several lines resolves last-write-wins. The file itself
    /// is never deduplicated here.
    pub async fn load(&self) -> Result<usize, LedgerError> {
        let parsed = {
            let medium = self.storage.acquire().await?;
            let path = medium.users_path();
            if path.exists() {
                Self::parse_file(&path)?
            } else {
                HashMap::new()
            }
        };

        let count = parsed.len();
        *self.users.write().unwrap() = parsed;
        info!(users = count, "user directory loaded");
        Ok(count)
    }

    fn parse_file(path: &Path) -> Result<HashMap<String, String>, LedgerError> {
        let file = File::open(path)?;
        let mut map = HashMap::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(',') {
                Some((uid, name)) => {
                    map.insert(uid.to_string(), name.to_string());
                }
                None => warn!(line, "skipping malformed directory line"),
            }
        }
        Ok(map)
    }

    /// Appends `uid,name` to the directory file and reloads the map. Both
    /// fields are trimmed; empty results and embedded commas or newlines are
    /// rejected before storage is touched. No existing-uid check is made, so
    /// the file may accumulate duplicate uids (last line wins at load time).
    pub async fn add(&self, uid: &str, name: &str) -> Result<UserRecord, LedgerError> {
        let uid = validate_field("uid", uid)?;
        let name = validate_field("name", name)?;

        {
            let medium = self.storage.acquire().await?;
            let mut file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(medium.users_path())?;
            // one write call per record keeps the line whole at any point
            // the lock is released
            file.write_all(format!("{uid},{name}\n").as_bytes())?;
        }

        self.load().await?;
        Ok(UserRecord { uid, name })
    }

    /// Removes every line whose uid-prefix matches, via copy-filter-rename
    /// under one guard acquisition: both files must open or the operation
    /// aborts untouched; the temp file is cleaned up on every failure path.
    /// Atomic with respect to other storage operations, not with respect to
    /// power loss mid-rename.
    pub async fn remove(&self, uid: &str) -> Result<(), LedgerError> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(LedgerError::Validation("uid must not be empty".into()));
        }

        {
            let medium = self.storage.acquire().await?;
            let users_path = medium.users_path();
            let tmp_path = medium.users_tmp_path();

            let original = File::open(&users_path)?;
            let tmp = File::create(&tmp_path)?;

            let swapped = filter_into(original, tmp, uid)
                .and_then(|_| fs::remove_file(&users_path))
                .and_then(|_| fs::rename(&tmp_path, &users_path));
            if let Err(e) = swapped {
                let _ = fs::remove_file(&tmp_path);
                return Err(e.into());
            }
        }

        self.load().await?;
        info!(uid, "user removed from directory");
        Ok(())
    }

    /// Lookup against the derived cache.
    pub fn name_of(&self, uid: &str) -> Option<String> {
        self.users.read().unwrap().get(uid).cloned()
    }

    /// Current directory contents, sorted by name for display.
    pub fn snapshot(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self
            .users
            .read()
            .unwrap()
            .iter()
            .map(|(uid, name)| UserRecord {
                uid: uid.clone(),
                name: name.clone(),
            })
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.uid.cmp(&b.uid)));
        users
    }
}

/// Streams every line of `original` except those belonging to `uid` into
/// `tmp`, then flushes. Rows are matched on the `uid,` prefix only.
fn filter_into(original: File, tmp: File, uid: &str) -> std::io::Result<()> {
    let target = format!("{uid},");
    let mut writer = BufWriter::new(tmp);
    for line in BufReader::new(original).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(&target) {
            continue;
        }
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

fn validate_field(field: &'static str, value: &str) -> Result<String, LedgerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LedgerError::Validation(format!("{field} must not be empty")));
    }
    // the log row format is unescaped CSV
    if value.contains(',') || value.contains('\n') || value.contains('\r') {
        return Err(LedgerError::Validation(format!(
            "{field} must not contain commas or line breaks"
        )));
    }
    Ok(value.to_string())
}

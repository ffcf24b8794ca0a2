use crate::error::LedgerError;
use crate::ledger::{LiveFeed, ScanOutcome, SessionLedger};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

/// How often a single scan is retried when the storage lock times out.
/// Retrying here keeps the core free of retry loops while still honoring
/// the callers-must-retry contract for the hardware path.
const BUSY_RETRIES: u32 = 3;
const BUSY_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Card-scan source: reader bridges connect over TCP and send one badge UID
/// per line. Each accepted connection gets its own task; every line is
/// scanned through the ledger and acknowledged on the socket.
pub async fn run(
    addr: String,
    ledger: Arc<SessionLedger>,
    feed: Arc<LiveFeed>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "scan listener ready");
    serve(listener, ledger, feed).await
}

pub async fn serve(
    listener: TcpListener,
    ledger: Arc<SessionLedger>,
    feed: Arc<LiveFeed>,
) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!(%peer, "reader connected");
        let ledger = ledger.clone();
        let feed = feed.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_reader(stream, ledger, feed).await {
                warn!(%peer, error = %e, "reader connection ended with error");
            } else {
                info!(%peer, "reader disconnected");
            }
        });
    }
}

async fn handle_reader(
    stream: TcpStream,
    ledger: Arc<SessionLedger>,
    feed: Arc<LiveFeed>,
) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    while let Some(line) = lines.next_line().await? {
        let uid = line.trim();
        if uid.is_empty() {
            continue;
        }
        let ack = process_scan(uid, &ledger, &feed).await;
        write_half.write_all(ack.as_bytes()).await?;
    }
    Ok(())
}

/// Scans one uid, retrying briefly when storage is busy, and renders the
/// line-oriented acknowledgement sent back to the reader.
async fn process_scan(uid: &str, ledger: &SessionLedger, feed: &LiveFeed) -> String {
    for attempt in 0..BUSY_RETRIES {
        match ledger.scan(uid).await {
            Ok(outcome) => {
                feed.record(uid, &outcome);
                return match outcome {
                    ScanOutcome::Accepted(record) => {
                        format!("OK,{},{}\n", record.action, record.name)
                    }
                    ScanOutcome::UnknownCard { .. } => "DENY,unknown card\n".to_string(),
                };
            }
            Err(LedgerError::Busy) => {
                warn!(uid, attempt, "storage busy, retrying scan");
                tokio::time::sleep(BUSY_RETRY_DELAY).await;
            }
            Err(e) => {
                error!(uid, error = %e, "scan failed");
                return "ERR,storage\n".to_string();
            }
        }
    }
    "ERR,busy\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::daily_log::DailyLogStore;
    use crate::storage::directory::UserDirectory;
    use crate::storage::guard::StorageGuard;

    async fn listener_fixture() -> (tempfile::TempDir, std::net::SocketAddr, Arc<LiveFeed>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(
            StorageGuard::new(dir.path().to_path_buf(), Duration::from_millis(200)).unwrap(),
        );
        let directory = Arc::new(UserDirectory::new(storage.clone()));
        directory.add("04A3", "Alice").await.unwrap();
        let ledger = Arc::new(SessionLedger::new(directory, DailyLogStore::new(storage)));
        let feed = Arc::new(LiveFeed::default());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (ledger_task, feed_task) = (ledger.clone(), feed.clone());
        tokio::spawn(async move {
            let _ = serve(listener, ledger_task, feed_task).await;
        });
        (dir, addr, feed)
    }

    #[tokio::test]
    async fn reader_lines_are_scanned_and_acked() {
        let (_dir, addr, feed) = listener_fixture().await;

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut responses = BufReader::new(read_half).lines();

        write_half.write_all(b"04A3\n").await.unwrap();
        assert_eq!(
            responses.next_line().await.unwrap().unwrap(),
            "OK,ENTRY,Alice"
        );

        write_half.write_all(b"04A3\n").await.unwrap();
        let exit_ack = responses.next_line().await.unwrap().unwrap();
        assert_eq!(exit_ack, "OK,EXIT,Alice");

        write_half.write_all(b"FFFF\n").await.unwrap();
        assert_eq!(
            responses.next_line().await.unwrap().unwrap(),
            "DENY,unknown card"
        );
        assert_eq!(feed.last_uid().as_deref(), Some("FFFF"));
    }

    #[tokio::test]
    async fn blank_lines_are_ignored() {
        let (_dir, addr, _feed) = listener_fixture().await;

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut responses = BufReader::new(read_half).lines();

        write_half.write_all(b"\n  \n04A3\n").await.unwrap();
        assert_eq!(
            responses.next_line().await.unwrap().unwrap(),
            "OK,ENTRY,Alice"
        );
    }
}

use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub scanner_addr: String,
    pub data_dir: String,
    pub storage_wait_ms: u64,

    /// Webhook receiving the full user list after every directory mutation.
    /// Unset disables the sync.
    pub sheets_sync_url: Option<String>,

    // Rate limiting
    pub rate_scan_per_min: u32,
    pub rate_admin_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            scanner_addr: env::var("SCANNER_ADDR").unwrap_or_else(|_| "0.0.0.0:7070".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            storage_wait_ms: env::var("STORAGE_WAIT_MS")
                .unwrap_or_else(|_| "2000".to_string()) // default 2s bounded wait
                .parse()
                .unwrap(),

            sheets_sync_url: env::var("SHEETS_SYNC_URL").ok(),

            rate_scan_per_min: env::var("RATE_SCAN_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_admin_per_min: env::var("RATE_ADMIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }
}

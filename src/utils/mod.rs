pub mod sheets_sync;

pub mod codec;
pub mod daily_log;
pub mod directory;
pub mod guard;

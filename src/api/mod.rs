pub mod events;
pub mod reports;
pub mod scan;
pub mod users;

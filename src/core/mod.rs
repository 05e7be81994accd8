pub mod dates;
pub mod export;
pub mod notify;
pub mod store;

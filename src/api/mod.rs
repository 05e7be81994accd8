pub mod client;
pub mod reports;
pub mod resources;

pub use client::ApiClient;

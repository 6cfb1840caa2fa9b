pub mod accounts;
pub mod bank;
pub mod coins;
pub mod error;
pub mod msg;
pub mod percentage;
pub mod rfc3339;
pub mod types;

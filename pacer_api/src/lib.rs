mod client;
mod config;
pub mod courts;
mod endpoint;
mod errors;
mod query;
pub mod types;
mod user_agent;
pub use self::client::{Client, Session};
pub use self::config::{ClientConfig, DayFailurePolicy};
pub use self::endpoint::{report_path, EndpointResolver};
pub use self::errors::Error;
pub use self::query::{format_day, ReportQuery, SessionCredential};
pub use self::user_agent::DEFAULT_USER_AGENT;

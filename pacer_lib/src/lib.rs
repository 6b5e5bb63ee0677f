//! Library layer for the PACER written opinions ("free documents") report.
//!
//! Wraps the `pacer_api` dispatcher with schema-adaptive row parsing,
//! report assembly, settings loading, whole-query retry, and input validation.

pub mod config;
pub mod dates;
pub mod error;
pub mod free_documents;
pub mod identifiers;
pub mod report;
pub mod row;
pub mod validation;

pub use pacer_api;
pub use pacer_api::types;
pub use pacer_api::{ClientConfig, DayFailurePolicy, ReportQuery, SessionCredential};

pub use config::{RetryConfig, Settings};
pub use error::{FreeDocumentsError, Phase};
pub use free_documents::{FreeDocumentsClient, FreeDocumentsReport};
pub use report::{assemble, Assembly, SkippedRow};
pub use row::{parse_row, parse_row_html, CaseIdentity, ColumnSchema, OpinionRecord, RowError};

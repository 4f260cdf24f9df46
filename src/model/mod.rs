mod config;
mod date_range;
mod report;
mod repository;
mod result;

pub use config::Config;
pub use date_range::{DateRange, DATE_FORMAT};
pub use report::{AggregateReport, CommitRecord, RepositorySummary};
pub use repository::Repository;
pub use result::{ReportError, Result};

use crate::model::{ReportError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive window between two midnights.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub struct DateRange {
    since: NaiveDate,
    until: NaiveDate,
}

// New
impl DateRange {
    pub fn new(since: NaiveDate, until: NaiveDate) -> Result<Self> {
        if since > until {
            return Err(ReportError::InvalidDate(format!(
                "range starts after it ends: {} > {}",
                since.format(DATE_FORMAT),
                until.format(DATE_FORMAT)
            )));
        }
        Ok(Self { since, until })
    }

    pub fn parse(since: &str, until: &str) -> Result<Self> {
        Self::new(parse_date(since)?, parse_date(until)?)
    }
}

impl DateRange {
    pub fn since(&self) -> NaiveDate {
        self.since
    }

    pub fn until(&self) -> NaiveDate {
        self.until
    }

    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        let since = NaiveDateTime::from(self.since);
        let until = NaiveDateTime::from(self.until);
        since <= *instant && *instant <= until
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.since.format(DATE_FORMAT),
            self.until.format(DATE_FORMAT)
        )
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|err| ReportError::InvalidDate(format!("`{value}`: {err}")))
}

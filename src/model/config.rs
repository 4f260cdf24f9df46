use crate::model::{DateRange, ReportError, Repository, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::{from_str, Value};
use std::fs;
use std::path::Path;

/// Everything a run needs: who to report on, when, and where to look.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    pub developer: String,
    pub author: String,
    pub date_range: DateRange,
    pub repositories: Vec<Repository>,
}

// New
impl Config {
    pub fn from_config(path: &Path) -> Result<Self> {
        let json_str = fs::read_to_string(path)?;
        Self::parse(&json_str)
    }
}

// Parser
impl Config {
    pub fn parse(json_str: &str) -> Result<Self> {
        let elements: IndexMap<String, Value> = from_str(json_str)?;
        let developer = string_field(&elements, "developer")?;
        let author = string_field(&elements, "author")?;
        if author.is_empty() {
            return Err(ReportError::Config("'author' must not be empty".into()));
        }
        let since = string_field(&elements, "since")?;
        let until = string_field(&elements, "until")?;
        let date_range = DateRange::parse(&since, &until)?;
        let Some(repositories) = elements.get("repositories") else {
            return Err(ReportError::Config("Not found 'repositories' field".into()));
        };
        let repositories = Repository::parse(repositories)?;
        if let Some(name) = repositories.iter().map(|r| &r.name).duplicates().next() {
            return Err(ReportError::Config(format!(
                "Repository name `{name}` is used more than once"
            )));
        }
        Ok(Self {
            developer,
            author,
            date_range,
            repositories,
        })
    }
}

fn string_field(elements: &IndexMap<String, Value>, key: &str) -> Result<String> {
    let Some(value) = elements.get(key) else {
        return Err(ReportError::Config(format!("Not found '{key}' field")));
    };
    let Some(value) = value.as_str() else {
        return Err(ReportError::Config(format!("'{key}' must be a string")));
    };
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CONFIG: &str = r#"{
        "developer": "Jane Doe",
        "author": "janedoe",
        "since": "2024-01-01",
        "until": "2025-02-15",
        "repositories": [
            "git@github.com:janedoe/my_website.git",
            "git@github.com:janedoe/cash_table.git"
        ]
    }"#;

    #[test]
    fn parses_full_config() {
        let config = Config::parse(CONFIG).unwrap();
        assert_eq!(config.developer, "Jane Doe");
        assert_eq!(config.author, "janedoe");
        assert_eq!(
            config.date_range.since(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            config.date_range.until(),
            NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()
        );
        let names = config
            .repositories
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["my_website", "cash_table"]);
    }

    #[test]
    fn missing_field_is_reported() {
        let err = Config::parse(r#"{"developer": "x", "author": "y"}"#).unwrap_err();
        assert!(err.to_string().contains("'since'"), "{err}");
    }

    #[test]
    fn rejects_empty_author() {
        let json = CONFIG.replace(r#""author": "janedoe""#, r#""author": """#);
        assert!(matches!(Config::parse(&json), Err(ReportError::Config(_))));
    }

    #[test]
    fn rejects_bad_dates_before_any_io() {
        let json = CONFIG.replace("2025-02-15", "2025-02-30");
        assert!(matches!(Config::parse(&json), Err(ReportError::InvalidDate(_))));
    }

    #[test]
    fn rejects_duplicate_repository_names() {
        let json = CONFIG.replace("cash_table", "my_website");
        let err = Config::parse(&json).unwrap_err();
        assert!(err.to_string().contains("my_website"), "{err}");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Config::parse("{"), Err(ReportError::Json(_))));
    }

    #[test]
    fn rejects_repository_names_outside_the_cache() {
        let json = CONFIG.replace(
            r#"[
            "git@github.com:janedoe/my_website.git",
            "git@github.com:janedoe/cash_table.git"
        ]"#,
            r#"{"../escaped": "https://x/one.git", "/abs/victim": "https://x/two.git"}"#,
        );
        assert_ne!(json, CONFIG);
        assert!(matches!(Config::parse(&json), Err(ReportError::Config(_))));
    }
}

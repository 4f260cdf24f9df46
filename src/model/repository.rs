use crate::model::{ReportError, Result};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct Repository {
    pub name: String,
    pub url: String,
}

// New
impl Repository {
    pub fn from_url(url: impl ToString) -> Result<Self> {
        let url = url.to_string();
        let Some(name) = repo_name(&url) else {
            return Err(ReportError::Config(format!(
                "Cannot derive a repository name from `{url}`"
            )));
        };
        Ok(Self::new(name, url))
    }

    fn new(name: impl ToString, url: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

// Parser
impl Repository {
    /// Accepts either a list of URLs or an object mapping names to URLs.
    pub(crate) fn parse(value: &Value) -> Result<Vec<Self>> {
        match value {
            Value::Array(urls) => urls
                .iter()
                .map(|url| match url.as_str() {
                    Some(url) => Self::from_url(url),
                    None => Err(ReportError::Config(format!(
                        "Repository url is not a string: {url}"
                    ))),
                })
                .collect(),
            Value::Object(elements) => {
                let mut result = Vec::new();
                for (name, url) in elements {
                    let Some(url) = url.as_str() else {
                        return Err(ReportError::Config(format!(
                            "Repository `{name}` url is not a string"
                        )));
                    };
                    if !is_directory_name(name) {
                        return Err(ReportError::Config(format!(
                            "Repository name `{name}` for `{url}` must be a single directory name"
                        )));
                    }
                    result.push(Self::new(name, url));
                }
                Ok(result)
            }
            _ => Err(ReportError::Config(
                "'repositories' must be a list or an object".into(),
            )),
        }
    }
}

/// Last path segment of the url without a `.git` suffix.
pub fn repo_name(url: &str) -> Option<String> {
    let last = url.trim_end_matches(['/', '\\']).rsplit(['/', ':', '\\']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if is_directory_name(name) {
        Some(name.to_string())
    } else {
        None
    }
}

/// A name that stays inside the cache directory when joined onto it.
fn is_directory_name(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && name != "."
        && !Path::new(name).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_from_scp_like_url() {
        assert_eq!(
            repo_name("git@github.com:someone/my_website.git").as_deref(),
            Some("my_website")
        );
    }

    #[test]
    fn name_from_https_and_paths() {
        assert_eq!(
            repo_name("https://example.com/org/cash_table").as_deref(),
            Some("cash_table")
        );
        assert_eq!(repo_name("/tmp/source/java_lld/").as_deref(), Some("java_lld"));
        assert_eq!(repo_name("git@host:solo.git").as_deref(), Some("solo"));
    }

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(repo_name("https://example.com/.git"), None);
        assert_eq!(repo_name(""), None);
        assert!(Repository::from_url("git@host:").is_err());
    }

    #[test]
    fn parses_list_in_order() {
        let repos = Repository::parse(&json!([
            "git@github.com:a/zeta.git",
            "git@github.com:a/alpha.git"
        ]))
        .unwrap();
        let names = repos.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn parses_named_object_in_order() {
        let value: Value =
            serde_json::from_str(r#"{"zeta": "https://x/one.git", "alpha": "https://x/two.git"}"#)
                .unwrap();
        let repos = Repository::parse(&value).unwrap();
        assert_eq!(repos[0].name, "zeta");
        assert_eq!(repos[0].url, "https://x/one.git");
        assert_eq!(repos[1].name, "alpha");
    }

    #[test]
    fn rejects_non_string_urls() {
        assert!(Repository::parse(&json!([42])).is_err());
        assert!(Repository::parse(&json!({"a": 1})).is_err());
        assert!(Repository::parse(&json!("single")).is_err());
    }

    #[test]
    fn named_object_rejects_names_leaving_the_cache() {
        for name in ["../escaped", "/abs/victim", "nested/name", r"win\name", "..", ".", " "] {
            let mut elements = serde_json::Map::new();
            elements.insert(name.to_string(), json!("https://x/one.git"));
            assert!(
                matches!(
                    Repository::parse(&Value::Object(elements)),
                    Err(ReportError::Config(_))
                ),
                "{name}"
            );
        }
    }

    #[test]
    fn url_ending_in_parent_segment_has_no_name() {
        assert_eq!(repo_name("https://example.com/org/.."), None);
        assert_eq!(repo_name("/srv/git/."), None);
    }
}

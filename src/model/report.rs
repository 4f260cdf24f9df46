use crate::model::DateRange;
use chrono::NaiveDateTime;

const SHORT_HASH_LEN: usize = 7;

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct CommitRecord {
    date: NaiveDateTime,
    short_hash: String,
    message: String,
}

impl CommitRecord {
    pub fn new(date: NaiveDateTime, hash: &str, message: &str) -> Self {
        Self {
            date,
            short_hash: hash.chars().take(SHORT_HASH_LEN).collect(),
            message: message.trim().to_string(),
        }
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn short_hash(&self) -> &str {
        &self.short_hash
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct RepositorySummary {
    repo_name: String,
    commits: Vec<CommitRecord>,
    total_commits: usize,
}

impl RepositorySummary {
    pub fn new(repo_name: impl ToString, commits: Vec<CommitRecord>) -> Self {
        Self {
            repo_name: repo_name.to_string(),
            total_commits: commits.len(),
            commits,
        }
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    pub fn total_commits(&self) -> usize {
        self.total_commits
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AggregateReport {
    developer_name: String,
    generated_at: NaiveDateTime,
    date_range: DateRange,
    summaries: Vec<RepositorySummary>,
    overall_commit_count: usize,
}

impl AggregateReport {
    pub fn new(
        developer_name: impl ToString,
        generated_at: NaiveDateTime,
        date_range: DateRange,
        summaries: Vec<RepositorySummary>,
    ) -> Self {
        Self {
            developer_name: developer_name.to_string(),
            generated_at,
            date_range,
            overall_commit_count: summaries.iter().map(|s| s.total_commits()).sum(),
            summaries,
        }
    }

    pub fn developer_name(&self) -> &str {
        &self.developer_name
    }

    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    pub fn date_range(&self) -> &DateRange {
        &self.date_range
    }

    pub fn summaries(&self) -> &[RepositorySummary] {
        &self.summaries
    }

    pub fn overall_commit_count(&self) -> usize {
        self.overall_commit_count
    }
}

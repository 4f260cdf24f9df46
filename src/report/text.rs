use crate::model::{AggregateReport, RepositorySummary, Result, DATE_FORMAT};
use itertools::Itertools;
use std::fs;
use std::path::Path;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const NO_COMMITS: &str = "No commits found in this date range for the specified author.";

const BANNER_WIDTH: usize = 50;

pub trait TextReport {
    fn render_text(&self) -> String;
    fn write_text(&self, path: &Path) -> Result<String>;
}

impl TextReport for AggregateReport {
    fn render_text(&self) -> String {
        let banner = "=".repeat(BANNER_WIDTH);
        let mut lines = vec![
            banner.clone(),
            format!("Developer Name           : {}", self.developer_name()),
            format!(
                "Report Generated On      : {}",
                self.generated_at().format(DATETIME_FORMAT)
            ),
            format!(
                "Date Range               : {} to {}",
                self.date_range().since().format(DATE_FORMAT),
                self.date_range().until().format(DATE_FORMAT)
            ),
            format!("Total Repositories Worked: {}", self.summaries().len()),
            format!("Total Commits            : {}", self.overall_commit_count()),
            banner,
            String::new(),
            "===== OVERALL REPORT =====".to_string(),
            format!("Total Commits: {}", self.overall_commit_count()),
            String::new(),
        ];
        for summary in self.summaries() {
            lines.extend(repository_block(summary));
        }
        lines.iter().join("\n")
    }

    fn write_text(&self, path: &Path) -> Result<String> {
        let text = self.render_text();
        fs::write(path, &text)?;
        Ok(text)
    }
}

fn repository_block(summary: &RepositorySummary) -> Vec<String> {
    let mut lines = vec![
        format!("===== Repository: {} =====", summary.repo_name()),
        format!("Total Commits: {}", summary.total_commits()),
        "Commits:".to_string(),
    ];
    if summary.commits().is_empty() {
        lines.push(format!("  {NO_COMMITS}"));
    } else {
        lines.extend(summary.commits().iter().enumerate().map(|(idx, commit)| {
            format!(
                "{}.  {} ::[{}]:: {}",
                idx + 1,
                commit.message(),
                commit.date().format(DATETIME_FORMAT),
                commit.short_hash()
            )
        }));
    }
    lines.push(String::new());
    lines
}

use crate::model::{CommitRecord, DateRange, ReportError, Result};
use chrono::{DateTime, NaiveDateTime};
use git2::{ErrorCode, Repository, Sort};

/// Author and window a commit has to match to be reported.
#[derive(Debug, Clone)]
pub struct CommitFilter {
    pub author: String,
    pub date_range: DateRange,
}

impl CommitFilter {
    pub fn new(author: impl ToString, date_range: DateRange) -> Self {
        Self {
            author: author.to_string(),
            date_range,
        }
    }

    pub fn matches(&self, author: &str, datetime: &NaiveDateTime) -> bool {
        author == self.author && self.date_range.contains(datetime)
    }
}

pub trait GitCommitRepository {
    fn get_commits(&self, filter: &CommitFilter) -> Result<Vec<CommitRecord>>;
}

impl GitCommitRepository for Repository {
    fn get_commits(&self, filter: &CommitFilter) -> Result<Vec<CommitRecord>> {
        let mut revwalk = self.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        if let Err(err) = revwalk.push_head() {
            // No commit on HEAD yet: an empty history, not a failure.
            if matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) {
                return Ok(Vec::new());
            }
            return Err(err.into());
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let git_commit = self.find_commit(oid?)?;
            let author = git_commit.author();
            let author = String::from_utf8_lossy(author.name_bytes());
            let datetime = local_datetime(&git_commit)?;
            if filter.matches(&author, &datetime) {
                commits.push(git_commit_to_record(&git_commit, datetime));
            }
        }
        Ok(commits)
    }
}

/// Committer wall-clock time in the commit's own offset, with the offset dropped.
fn local_datetime(git_commit: &git2::Commit<'_>) -> Result<NaiveDateTime> {
    let time = git_commit.time();
    let seconds = time
        .seconds()
        .checked_add(i64::from(time.offset_minutes()) * 60);
    seconds
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .map(|datetime| datetime.naive_utc())
        .ok_or_else(|| {
            ReportError::MalformedCommit(format!(
                "{}: timestamp {} is out of range",
                git_commit.id(),
                time.seconds()
            ))
        })
}

fn git_commit_to_record(git_commit: &git2::Commit<'_>, datetime: NaiveDateTime) -> CommitRecord {
    let message = String::from_utf8_lossy(git_commit.message_bytes());
    CommitRecord::new(datetime, &git_commit.id().to_string(), &message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use git2::{Signature, Time};
    use tempfile::tempdir;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn filter() -> CommitFilter {
        CommitFilter::new(
            "janedoe",
            DateRange::parse("2024-01-01", "2025-02-15").unwrap(),
        )
    }

    fn commit(repo: &Repository, name: &str, time: Time, message: &str) {
        let sig = Signature::new(name, "dev@example.com", &time).unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo.head().ok().map(|h| h.peel_to_commit().unwrap());
        let parents = parent.iter().collect::<Vec<_>>();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    #[test]
    fn matches_exact_author_only() {
        let filter = filter();
        let inside = at(2024, 6, 1, 10, 0, 0);
        assert!(filter.matches("janedoe", &inside));
        assert!(!filter.matches("JaneDoe", &inside));
        assert!(!filter.matches("janedoe ", &inside));
        assert!(!filter.matches("jane", &inside));
    }

    #[test]
    fn matches_inclusive_window() {
        let filter = filter();
        assert!(filter.matches("janedoe", &at(2024, 1, 1, 0, 0, 0)));
        assert!(filter.matches("janedoe", &at(2025, 2, 15, 0, 0, 0)));
        assert!(!filter.matches("janedoe", &at(2023, 12, 31, 23, 59, 59)));
        assert!(!filter.matches("janedoe", &at(2025, 2, 15, 0, 0, 1)));
    }

    #[test]
    fn walks_history_newest_first_and_filters() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        // 2023-12-31 23:59:59, 2024-02-01, someone else, 2024-02-15, 2025-03-01
        commit(&repo, "janedoe", Time::new(1_704_067_199, 0), "too early");
        commit(&repo, "janedoe", Time::new(1_706_745_600, 0), "first\n");
        commit(&repo, "someone", Time::new(1_707_000_000, 0), "not mine");
        commit(&repo, "janedoe", Time::new(1_707_955_200, 0), "  second  ");
        commit(&repo, "janedoe", Time::new(1_740_787_200, 0), "too late");

        let commits = repo.get_commits(&filter()).unwrap();
        let messages = commits.iter().map(|c| c.message()).collect::<Vec<_>>();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(commits[0].date(), at(2024, 2, 15, 0, 0, 0));
        assert_eq!(commits[0].short_hash().len(), 7);
    }

    #[test]
    fn repository_without_commits_has_empty_history() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let commits = repo.get_commits(&filter()).unwrap();
        assert!(commits.is_empty());
    }

    #[test]
    fn uses_the_commit_offset_for_the_naive_time() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        // 2023-12-31 23:30:00 UTC is 2024-01-01 01:30:00 at +02:00
        commit(&repo, "janedoe", Time::new(1_704_065_400, 120), "new year");

        let commits = repo.get_commits(&filter()).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].date(), at(2024, 1, 1, 1, 30, 0));
    }
}

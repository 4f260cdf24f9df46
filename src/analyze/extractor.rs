use crate::git::{CommitFilter, GitCommitRepository, GitRepository};
use crate::model::{Repository, RepositorySummary, Result};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FetchKind {
    Clone,
    Pull,
}

/// Called with the fetch kind and the transferred percentage.
pub type FetchProgress<'a> = Box<dyn FnMut(FetchKind, usize, usize) + 'a>;

/// Clones or pulls `repo` into `local_path`, then collects the commits matching `filter`.
pub fn extract<'a>(
    repo: &Repository,
    local_path: &Path,
    filter: &CommitFilter,
    mut progress: FetchProgress<'a>,
) -> Result<RepositorySummary> {
    let kind = if repo.repo_exists(local_path) {
        FetchKind::Pull
    } else {
        FetchKind::Clone
    };
    progress(kind, 0, 100);
    debug!(repo = %repo.name, path = %local_path.display(), ?kind, "updating local copy");

    let on_transfer =
        Box::new(move |current: usize, total: usize| progress(kind, current, total));
    let git_repo = match kind {
        FetchKind::Clone => repo.repo_clone(local_path, on_transfer)?,
        FetchKind::Pull => repo.repo_pull(local_path, on_transfer)?,
    };

    let commits = git_repo.get_commits(filter)?;
    debug!(repo = %repo.name, matched = commits.len(), "read git history");
    Ok(RepositorySummary::new(&repo.name, commits))
}

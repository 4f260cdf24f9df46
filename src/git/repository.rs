use crate::model;
use git2::build::CheckoutBuilder;
use git2::{
    build::RepoBuilder, Config, Error, ErrorCode, FetchOptions, RemoteCallbacks, Repository,
    Signature, Status, StatusOptions,
};
use git2_credentials::CredentialHandler;
use model::Repository as Repo;
use std::path::Path;

pub type PercentProgress<'a> = Box<dyn FnMut(usize, usize) + 'a>;

const MERGE_SIGNATURE: (&str, &str) = ("commit-report", "commit-report@localhost");

pub trait GitRepository {
    fn repo_exists(&self, local_path: &Path) -> bool;
    fn repo_clone<'a>(&self, local_path: &Path, cb: PercentProgress<'a>) -> Result<Repository, Error>;
    fn repo_pull<'a>(&self, local_path: &Path, cb: PercentProgress<'a>) -> Result<Repository, Error>;
}

impl GitRepository for Repo {
    fn repo_exists(&self, local_path: &Path) -> bool {
        local_path.exists()
    }

    fn repo_clone<'a>(
        &self,
        local_path: &Path,
        cb: PercentProgress<'a>,
    ) -> Result<Repository, Error> {
        let options = fetch_options(cb)?;
        RepoBuilder::new()
            .fetch_options(options)
            .clone(&self.url, local_path)
    }

    /// Fetches upstream and fast-forwards or merges it into the checked out branch.
    /// A local copy with uncommitted changes to tracked files is left alone.
    fn repo_pull<'a>(
        &self,
        local_path: &Path,
        cb: PercentProgress<'a>,
    ) -> Result<Repository, Error> {
        let mut options = fetch_options(cb)?;

        let repo = Repository::open(local_path)?;
        ensure_clean(&repo)?;
        let mut remote = repo.find_remote("origin")?;
        match current_branch(&repo)? {
            Head::Branch(branch) => {
                remote.fetch(&[&branch], Some(&mut options), None)?;
                drop(remote);
                let fetch_head = repo.find_reference("FETCH_HEAD")?;
                let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
                merge(&repo, &branch, fetch_commit)?;
            }
            Head::Unborn(head_ref) => {
                remote.fetch(&[] as &[&str], Some(&mut options), None)?;
                drop(remote);
                adopt_upstream(&repo, &head_ref)?;
            }
        }

        Repository::open(local_path)
    }
}

fn fetch_options<'a>(mut cb: PercentProgress<'a>) -> Result<FetchOptions<'a>, Error> {
    let git_config = Config::open_default()?;
    let mut credential_handler = CredentialHandler::new(git_config);

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username, allowed| {
        credential_handler.try_next_credential(url, username, allowed)
    });
    callbacks.transfer_progress(move |stats| {
        if stats.total_objects() > 0 {
            let current = 100 * stats.received_objects() / stats.total_objects();
            cb(current, 100);
        }
        true
    });

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    Ok(options)
}

fn ensure_clean(repo: &Repository) -> Result<(), Error> {
    let mut options = StatusOptions::new();
    options.include_untracked(false).include_ignored(false);
    let statuses = repo.statuses(Some(&mut options))?;
    if statuses.iter().any(|entry| entry.status() != Status::CURRENT) {
        return Err(Error::from_str(
            "Local copy has uncommitted changes to tracked files",
        ));
    }
    Ok(())
}

enum Head {
    Branch(String),
    /// Full name of the branch HEAD points at before its first commit.
    Unborn(String),
}

fn is_unborn(err: &Error) -> bool {
    matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

fn current_branch(repo: &Repository) -> Result<Head, Error> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(err) if is_unborn(&err) => {
            let head = repo.find_reference("HEAD")?;
            return match head.symbolic_target() {
                Some(target) => Ok(Head::Unborn(target.to_string())),
                None => Err(err),
            };
        }
        Err(err) => return Err(err),
    };
    if !head.is_branch() {
        return Err(Error::from_str("HEAD is detached, nothing to pull"));
    }
    match head.shorthand() {
        Some(name) => Ok(Head::Branch(name.to_string())),
        None => Err(Error::from_str("HEAD branch name is not valid UTF-8")),
    }
}

// Empty clone: start the local branch once upstream has its first commit.
fn adopt_upstream(repo: &Repository, head_ref: &str) -> Result<(), Error> {
    let Some(branch) = head_ref.strip_prefix("refs/heads/") else {
        return Ok(());
    };
    let upstream = match repo.find_reference(&format!("refs/remotes/origin/{branch}")) {
        Ok(upstream) => upstream,
        Err(err) if err.code() == ErrorCode::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    let commit = upstream.peel_to_commit()?;
    repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::default().safe()))?;
    repo.reference(head_ref, commit.id(), false, "Pull: first upstream commit")?;
    Ok(())
}

fn merge<'a>(
    repo: &'a Repository,
    branch: &str,
    fetch_commit: git2::AnnotatedCommit<'a>,
) -> Result<(), Error> {
    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        Ok(())
    } else if analysis.is_fast_forward() {
        let mut local = repo.find_reference(&format!("refs/heads/{}", branch))?;
        fast_forward(repo, &mut local, &fetch_commit)
    } else if analysis.is_normal() {
        let head_commit = repo.reference_to_annotated_commit(&repo.head()?)?;
        normal_merge(repo, &head_commit, &fetch_commit)
    } else {
        Err(Error::from_str("Upstream cannot be merged into the local copy"))
    }
}

fn fast_forward(
    repo: &Repository,
    lb: &mut git2::Reference,
    rc: &git2::AnnotatedCommit,
) -> Result<(), Error> {
    let name = match lb.name() {
        Some(s) => s.to_string(),
        None => String::from_utf8_lossy(lb.name_bytes()).to_string(),
    };
    let target = repo.find_object(rc.id(), None)?;
    repo.checkout_tree(&target, Some(CheckoutBuilder::default().safe()))?;
    let msg = format!("Fast-Forward: Setting {} to id: {}", name, rc.id());
    lb.set_target(rc.id(), &msg)?;
    repo.set_head(&name)?;
    Ok(())
}

// Diverged cache: merge upstream into the local branch, refusing on conflicts.
fn normal_merge(
    repo: &Repository,
    local: &git2::AnnotatedCommit,
    remote: &git2::AnnotatedCommit,
) -> Result<(), Error> {
    let local_tree = repo.find_commit(local.id())?.tree()?;
    let remote_tree = repo.find_commit(remote.id())?.tree()?;
    let ancestor = repo
        .find_commit(repo.merge_base(local.id(), remote.id())?)?
        .tree()?;
    let mut idx = repo.merge_trees(&ancestor, &local_tree, &remote_tree, None)?;

    if idx.has_conflicts() {
        return Err(Error::from_str("Merge with upstream has conflicts"));
    }
    let result_tree = repo.find_tree(idx.write_tree_to(repo)?)?;
    repo.checkout_tree(
        result_tree.as_object(),
        Some(CheckoutBuilder::default().safe()),
    )?;
    let msg = format!("Merge: {} into {}", remote.id(), local.id());
    let sig = match repo.signature() {
        Ok(sig) => sig,
        Err(_) => Signature::now(MERGE_SIGNATURE.0, MERGE_SIGNATURE.1)?,
    };
    let local_commit = repo.find_commit(local.id())?;
    let remote_commit = repo.find_commit(remote.id())?;
    repo.commit(
        Some("HEAD"),
        &sig,
        &sig,
        &msg,
        &result_tree,
        &[&local_commit, &remote_commit],
    )?;
    Ok(())
}

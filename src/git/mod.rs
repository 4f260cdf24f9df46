pub mod commit;
pub mod repository;

pub use commit::CommitFilter;
pub use commit::GitCommitRepository;
pub use repository::GitRepository;

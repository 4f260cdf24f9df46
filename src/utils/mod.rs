mod progress_style;
mod repo_progress;

pub use progress_style::ProgressStyleTemplate;
pub use repo_progress::RepoProgress;

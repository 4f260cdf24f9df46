use crate::analyze::FetchKind;
use crate::model::{ReportError, RepositorySummary};
use crate::utils::ProgressStyleTemplate;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::cell::Cell;
use std::time::Duration;
use tracing::{debug, info};

/// Console progress for one repository: a transfer bar and a history line.
pub struct RepoProgress {
    name: String,
    fetch: ProgressBar,
    history: ProgressBar,
    kind: Cell<Option<FetchKind>>,
}

impl RepoProgress {
    pub fn new(name: &str) -> Self {
        let multi_progress = MultiProgress::new();
        if let Err(err) = multi_progress.println(format!("# {name}")) {
            debug!(repo = name, "cannot print progress header: {err}");
        }

        let fetch = add_with_style(
            &multi_progress,
            ProgressBar::no_length(),
            ProgressStyleTemplate::percent_bar(),
        );
        fetch.set_message("Waiting");
        let history = add_with_style(
            &multi_progress,
            ProgressBar::new_spinner(),
            ProgressStyleTemplate::only_message(),
        );
        history.set_message("Waiting fetch");

        Self {
            name: name.to_string(),
            fetch,
            history,
            kind: Cell::new(None),
        }
    }

    pub fn on_fetch(&self, kind: FetchKind, current: usize, total: usize) {
        if self.kind.replace(Some(kind)).is_none() {
            match kind {
                FetchKind::Clone => info!("Cloning repository {}...", self.name),
                FetchKind::Pull => info!("Fetching latest changes for repository {}...", self.name),
            }
            self.history.set_message("Read git history ...");
        }
        self.fetch.set_message(match kind {
            FetchKind::Clone => "Cloning",
            FetchKind::Pull => "Pulling",
        });
        self.fetch.set_length(total as u64);
        self.fetch.set_position(current as u64);
    }

    pub fn finish(&self, summary: &RepositorySummary) {
        self.fetch.set_style(ProgressStyleTemplate::only_message());
        self.fetch.finish_with_message(match self.kind.get() {
            Some(FetchKind::Pull) => "✅ Fetched",
            _ => "✅ Cloned",
        });
        self.history.finish_with_message(format!(
            "✅ Completed read git history (find {} commits)",
            summary.total_commits()
        ));
    }

    pub fn fail(&self, err: &ReportError) {
        self.fetch.set_style(ProgressStyleTemplate::only_message());
        self.fetch.abandon_with_message(format!("❌ Skipped: {err}"));
        self.history.finish_and_clear();
    }
}

fn add_with_style(multi_progress: &MultiProgress, pb: ProgressBar, style: ProgressStyle) -> ProgressBar {
    let pb = multi_progress.add(pb);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

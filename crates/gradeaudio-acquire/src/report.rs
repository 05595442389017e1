use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of visiting one secondary page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    AlreadyPresent { path: PathBuf },
    NoAudio { title: String },
    PageFailed { reason: String },
    DownloadFailed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub url: String,
    #[serde(flatten)]
    pub outcome: LinkOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub label: String,
    pub directory: PathBuf,
    /// Set when the whole section was skipped (no links, folder not creatable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    pub links: Vec<LinkReport>,
}

impl GradeReport {
    pub fn new(label: String, directory: PathBuf) -> Self {
        Self {
            label,
            directory,
            skipped: None,
            links: Vec::new(),
        }
    }
}

/// Everything one crawl did, in processing order.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub main_url: String,
    pub root_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub grades: Vec<GradeReport>,
}

impl RunSummary {
    pub fn new(main_url: &str, root_dir: &Path) -> Self {
        Self {
            main_url: main_url.to_string(),
            root_dir: root_dir.to_path_buf(),
            started_at: Utc::now(),
            finished_at: None,
            grades: Vec::new(),
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    fn outcomes(&self) -> impl Iterator<Item = &LinkOutcome> {
        self.grades.iter().flat_map(|g| g.links.iter().map(|l| &l.outcome))
    }

    pub fn downloaded(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, LinkOutcome::Downloaded { .. }))
            .count()
    }

    pub fn already_present(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, LinkOutcome::AlreadyPresent { .. }))
            .count()
    }

    pub fn without_audio(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, LinkOutcome::NoAudio { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes()
            .filter(|o| {
                matches!(
                    o,
                    LinkOutcome::PageFailed { .. } | LinkOutcome::DownloadFailed { .. }
                )
            })
            .count()
    }
}

/// Write the run summary as pretty JSON.
pub fn write_report(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, &json)?;
    tracing::info!(
        path = %path.display(),
        grades = summary.grades.len(),
        "Wrote run report"
    );
    Ok(())
}

use crate::config::CrawlConfig;
use crate::download::{self, DownloadOutcome};
use crate::extract;
use crate::fetch::{FetchError, HttpFetcher};
use crate::links::collect_links;
use crate::locate::{GradeSection, SectionLocator};
use crate::report::{GradeReport, LinkOutcome, LinkReport, RunSummary};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Failures that end a crawl. Everything below the main page is logged and
/// recorded in the [`RunSummary`] instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to create root directory {path}: {source}")]
    RootDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to set up HTTP client: {0}")]
    Setup(#[source] FetchError),

    #[error("failed to fetch main page: {0}")]
    MainPage(#[source] FetchError),
}

/// Crawl the main article and download every grade's audio.
///
/// Runs strictly in sequence: one section, one link, one request at a time.
/// Returns a summary even when every individual item failed; only a root
/// directory or main page failure is an error.
pub async fn crawl(
    config: &CrawlConfig,
    locator: &dyn SectionLocator,
) -> Result<RunSummary, CrawlError> {
    let root = config.root_dir.as_path();
    fs::create_dir_all(root)
        .await
        .map_err(|source| CrawlError::RootDir {
            path: root.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %root.display(), "Root save directory ready");

    let fetcher = HttpFetcher::new(config).map_err(CrawlError::Setup)?;

    tracing::info!(url = %config.main_url, "Fetching main article");
    let html = fetcher
        .get_page(&config.main_url)
        .await
        .map_err(CrawlError::MainPage)?;
    tracing::debug!(bytes = html.len(), "Received main article");

    let mut summary = RunSummary::new(&config.main_url, root);

    let sections = locator.locate(&html);
    if sections.is_empty() {
        tracing::warn!("No grade sections found on the main article");
        return Ok(summary.finish());
    }
    tracing::info!(sections = sections.len(), "Found unique grade sections");

    for section in &sections {
        let report = process_section(&fetcher, config, root, section).await;
        summary.grades.push(report);
    }

    let summary = summary.finish();
    tracing::info!(
        root = %root.display(),
        downloaded = summary.downloaded(),
        already_present = summary.already_present(),
        without_audio = summary.without_audio(),
        failed = summary.failed(),
        "All grade audio processed"
    );
    Ok(summary)
}

async fn process_section(
    fetcher: &HttpFetcher,
    config: &CrawlConfig,
    root: &Path,
    section: &GradeSection,
) -> GradeReport {
    let label = section.label.to_string();
    let dir = root.join(section.label.folder_name());
    let mut report = GradeReport::new(label.clone(), dir.clone());

    tracing::info!(grade = %label, "Processing grade section");

    if let Err(e) = fs::create_dir_all(&dir).await {
        tracing::warn!(
            grade = %label,
            path = %dir.display(),
            error = %e,
            "Cannot create grade folder, skipping"
        );
        report.skipped = Some(format!("cannot create folder: {e}"));
        return report;
    }

    let links = collect_links(&section.table_html);
    if links.is_empty() {
        tracing::warn!(grade = %label, "Grade table has no usable links");
        report.skipped = Some("no links".to_string());
        return report;
    }
    tracing::info!(grade = %label, links = links.len(), "Found secondary page links");

    let total = links.len();
    for (idx, url) in links.into_iter().enumerate() {
        tracing::info!(
            grade = %label,
            link = idx + 1,
            total,
            url = %url,
            "Processing secondary page"
        );
        let outcome = fetch_secondary_audio(fetcher, &config.audio_host, &url, &dir).await;
        report.links.push(LinkReport { url, outcome });
    }

    report
}

/// Visit one secondary page and download its embedded audio into `dir`.
///
/// Never fails: every branch ends in a logged [`LinkOutcome`].
pub async fn fetch_secondary_audio(
    fetcher: &HttpFetcher,
    audio_host: &str,
    url: &str,
    dir: &Path,
) -> LinkOutcome {
    let html = match fetcher.get_page(url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to fetch secondary page");
            return LinkOutcome::PageFailed {
                reason: e.to_string(),
            };
        }
    };

    let page = extract::parse_article(&html);

    let Some(file_id) = page.file_id.as_deref() else {
        tracing::warn!(title = %page.title, "Secondary page has no audio resource");
        return LinkOutcome::NoAudio { title: page.title };
    };

    let audio_url = extract::audio_url(audio_host, file_id);
    let path = dir.join(page.file_name());
    tracing::debug!(title = %page.title, audio_url = %audio_url, "Found embedded audio");

    match download::download_audio(fetcher, &audio_url, &path).await {
        DownloadOutcome::Downloaded { bytes } => LinkOutcome::Downloaded { path, bytes },
        DownloadOutcome::AlreadyPresent => LinkOutcome::AlreadyPresent { path },
        DownloadOutcome::Failed(reason) => LinkOutcome::DownloadFailed { path, reason },
    }
}

pub mod config;
pub mod crawl;
pub mod download;
pub mod extract;
pub mod fetch;
pub mod links;
pub mod locate;
pub mod report;

pub use config::CrawlConfig;
pub use crawl::{crawl, CrawlError};
pub use locate::{GradeHeadingLocator, GradeSection, SectionLocator};
pub use report::{write_report, LinkOutcome, RunSummary};

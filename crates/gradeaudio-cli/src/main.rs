use anyhow::Result;
use clap::{Parser, Subcommand};
use gradeaudio_acquire::config::{AUDIO_HOST, MAIN_ARTICLE_URL};
use gradeaudio_acquire::{CrawlConfig, GradeHeadingLocator};
use gradeaudio_catalog::CatalogQuery;
use gradeaudio_model::{Category, Grade, Unit};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gradeaudio")]
#[command(about = "Download and catalogue primary-school English textbook audio")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ", built ", env!("BUILD_DATE"), ")"
))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CategoryArg {
    /// 课本
    Textbook,
    /// 单词
    Vocabulary,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Textbook => Category::Textbook,
            CategoryArg::Vocabulary => Category::Vocabulary,
        }
    }
}

fn parse_unit_arg(value: &str) -> Result<Unit, String> {
    gradeaudio_catalog::parse_unit(value)
        .ok_or_else(|| format!("expected \"Unit <n>\" or \"Project <n>\", got '{value}'"))
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the index article and download every grade's audio
    Crawl {
        /// Index article listing the grade sections
        #[arg(short, long, default_value = MAIN_ARTICLE_URL)]
        url: String,

        /// Directory that receives one folder per grade section
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Session cookie, needed once the article host starts answering 403
        #[arg(long, env = "GRADEAUDIO_COOKIE", default_value = "", hide_env_values = true)]
        cookie: String,

        /// Host serving voice/getvoice downloads
        #[arg(long, default_value = AUDIO_HOST)]
        audio_host: String,

        /// Write a JSON report of every link's outcome to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the recordings already downloaded under a library root
    Catalog {
        /// Library root (the crawl's --root)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Only list this grade (1-6)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=6))]
        grade: Option<u8>,

        /// Only list this category
        #[arg(short, long, value_enum)]
        category: Option<CategoryArg>,

        /// Only list this unit, e.g. "Unit 3" or "project2"
        #[arg(short, long, value_parser = parse_unit_arg)]
        unit: Option<Unit>,

        /// Write the listed entries as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,hyper_util=info",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,hyper_util=info",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    match cli.command {
        Commands::Crawl {
            url,
            root,
            cookie,
            audio_host,
            report,
        } => {
            tracing::info!(url = %url, root = %root.display(), "Crawling grade audio");
            let config = CrawlConfig {
                main_url: url,
                root_dir: root,
                audio_host,
                cookie,
                ..CrawlConfig::default()
            };

            // A failed crawl is reported, not turned into an exit status.
            match gradeaudio_acquire::crawl(&config, &GradeHeadingLocator::new()).await {
                Ok(summary) => {
                    if let Some(report) = report {
                        gradeaudio_acquire::write_report(&summary, &report)?;
                    }
                }
                Err(e) => tracing::error!("{e}"),
            }
        }
        Commands::Catalog {
            root,
            grade,
            category,
            unit,
            output,
        } => {
            tracing::info!(root = %root.display(), "Cataloguing library");
            let query = CatalogQuery {
                grade: grade.and_then(Grade::from_number),
                category: category.map(Category::from),
                unit,
            };
            let listed = gradeaudio_catalog::catalog(&root, &query, output.as_deref())?;
            if listed.is_empty() {
                tracing::warn!(root = %root.display(), "No matching recordings found");
            }
        }
    }

    Ok(())
}

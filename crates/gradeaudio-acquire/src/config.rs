use std::path::PathBuf;
use std::time::Duration;

/// Article that indexes every grade's secondary pages.
pub const MAIN_ARTICLE_URL: &str = "https://mp.weixin.qq.com/s/1sdIH_nKmo5qT4p61waqwQ";

/// Host serving `voice/getvoice` downloads for embedded article audio.
pub const AUDIO_HOST: &str = "https://res.wx.qq.com";

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/124.0.0.0 Safari/537.36";

pub const REFERER: &str = "https://mp.weixin.qq.com/";

const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub main_url: String,
    /// Grade folders are created directly under this directory.
    pub root_dir: PathBuf,
    pub audio_host: String,
    pub user_agent: String,
    pub referer: String,
    /// Session cookie for the article host. Sent only when non-empty; needed
    /// when the site starts answering 403.
    pub cookie: String,
    /// Whole-request limit for article pages.
    pub page_timeout: Duration,
    /// Connect and per-read limit for audio streams.
    pub download_timeout: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            main_url: MAIN_ARTICLE_URL.to_string(),
            root_dir: PathBuf::from("."),
            audio_host: AUDIO_HOST.to_string(),
            user_agent: USER_AGENT.to_string(),
            referer: REFERER.to_string(),
            cookie: String::new(),
            page_timeout: PAGE_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
        }
    }
}

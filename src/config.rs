use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

use crate::error::{Result, ScrapeError};

pub const DEFAULT_BASE_URL: &str = "https://cafef.vn/du-lieu/";
pub const RANKING_PATH: &str =
    "Ajax/CongTy/GetListNopNganSachGroup.ashx?type=vntax200&tab=top-200-doanh-nghiep";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXTRACTOR_CMD: &str = "node script.js";

/// Which `DetailExtractor` the pipeline runs after fetching pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorKind {
    /// In-process HTML parsing
    Native,
    /// External program that writes `company_details.json`
    Script(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub base_url: String,
    pub timeout: Duration,
    pub extractor: ExtractorKind,
    pub force_fetch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            work_dir: PathBuf::from("."),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            extractor: ExtractorKind::Native,
            force_fetch: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with `SCRAPER_*` environment variables (a `.env` file is honoured).
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let mut config = Config::default();

        if let Ok(dir) = env::var("SCRAPER_WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }
        if let Ok(base) = env::var("SCRAPER_BASE_URL") {
            config.base_url = base;
        }
        if let Ok(secs) = env::var("SCRAPER_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ScrapeError::Config(format!("SCRAPER_TIMEOUT_SECS must be a number, got '{}'", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }

        let cmd = env::var("SCRAPER_EXTRACTOR_CMD").unwrap_or_else(|_| DEFAULT_EXTRACTOR_CMD.to_string());
        config.extractor = match env::var("SCRAPER_EXTRACTOR").as_deref() {
            Ok("script") => ExtractorKind::Script(split_command(&cmd)?),
            Ok("native") | Err(_) => ExtractorKind::Native,
            Ok(other) => {
                return Err(ScrapeError::Config(format!(
                    "SCRAPER_EXTRACTOR must be 'native' or 'script', got '{}'",
                    other
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_force_fetch(mut self, force_fetch: bool) -> Self {
        self.force_fetch = force_fetch;
        self
    }

    /// The base URL must be absolute; detail links are appended to it verbatim.
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ScrapeError::Config(format!("base URL '{}' cannot be a base", self.base_url)));
        }
        Ok(())
    }

    pub fn ranking_url(&self) -> String {
        format!("{}{}", self.base_url, RANKING_PATH)
    }

    pub fn detail_url(&self, link: &str) -> String {
        format!("{}{}", self.base_url, link)
    }
}

fn split_command(cmd: &str) -> Result<Vec<String>> {
    let parts: Vec<String> = cmd.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        return Err(ScrapeError::Config("SCRAPER_EXTRACTOR_CMD is empty".to_string()));
    }
    Ok(parts)
}

use crate::analyze::{DEFAULT_HASHTAGS_FILE, DEFAULT_USERS_FILE};
use crate::deletion_log::DEFAULT_LOG_PATH;
use crate::oauth::Credentials;
use crate::twitter::DEFAULT_API_BASE;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "./config.json";
pub const CONFIG_ENV: &str = "TWEETS_CLEANER_CONFIG";

/// Run options, read once from a JSON config file. Keys are camelCase except the
/// four credential fields, which keep their snake_case names.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanerOptions {
    /// Archive file (CSV, JSON array, or tweets.js).
    pub path: PathBuf,
    /// Deletion log location.
    pub log: PathBuf,
    /// Only posts strictly older than this are candidates; None = now.
    pub max_date: Option<String>,
    /// Retention patterns; a match keeps the post.
    pub save_regexp: Vec<String>,
    /// Milliseconds between calls.
    pub calls_interval: u64,
    /// Analysis mode instead of deletion.
    pub analyze: bool,
    pub hashtags_file: PathBuf,
    pub users_file: PathBuf,
    pub progress: bool,
    pub api_base: String,
    pub request_timeout_secs: u64,
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl Default for CleanerOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            log: PathBuf::from(DEFAULT_LOG_PATH),
            max_date: None,
            save_regexp: Vec::new(),
            calls_interval: 1000,
            analyze: false,
            hashtags_file: PathBuf::from(DEFAULT_HASHTAGS_FILE),
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            progress: false,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 30,
            credentials: Credentials::default(),
        }
    }
}

impl CleanerOptions {
    /// Read options from `path`, then apply credential overrides from the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let mut opts: CleanerOptions =
            serde_json::from_str(&raw).with_context(|| format!("parse config {}", path.display()))?;
        opts.merge_env_credentials();
        Ok(opts)
    }

    /// TWEETS_CLEANER_{CONSUMER_KEY,CONSUMER_SECRET,ACCESS_TOKEN_KEY,ACCESS_TOKEN_SECRET}
    /// override the file values when set and non-empty.
    pub fn merge_env_credentials(&mut self) {
        let c = &mut self.credentials;
        for (var, slot) in [
            ("TWEETS_CLEANER_CONSUMER_KEY", &mut c.consumer_key),
            ("TWEETS_CLEANER_CONSUMER_SECRET", &mut c.consumer_secret),
            ("TWEETS_CLEANER_ACCESS_TOKEN_KEY", &mut c.access_token_key),
            ("TWEETS_CLEANER_ACCESS_TOKEN_SECRET", &mut c.access_token_secret),
        ] {
            if let Ok(v) = std::env::var(var) {
                if !v.trim().is_empty() {
                    *slot = v.trim().to_string();
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            bail!("config is missing 'path' (archive file)");
        }
        Ok(())
    }

    pub fn calls_interval(&self) -> Duration {
        Duration::from_millis(self.calls_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn with_archive(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }
    pub fn with_log(mut self, path: impl AsRef<Path>) -> Self {
        self.log = path.as_ref().to_path_buf();
        self
    }
    pub fn with_max_date(mut self, date: impl Into<String>) -> Self {
        self.max_date = Some(date.into());
        self
    }
    pub fn with_save_regexp<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.save_regexp = patterns.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_calls_interval_ms(mut self, ms: u64) -> Self {
        self.calls_interval = ms;
        self
    }
    pub fn with_analyze(mut self, yes: bool) -> Self {
        self.analyze = yes;
        self
    }
    pub fn with_analysis_outputs(mut self, hashtags: impl AsRef<Path>, users: impl AsRef<Path>) -> Self {
        self.hashtags_file = hashtags.as_ref().to_path_buf();
        self.users_file = users.as_ref().to_path_buf();
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
    pub fn with_credentials(mut self, creds: Credentials) -> Self {
        self.credentials = creds;
        self
    }
}

/// Config file location: first CLI argument, else $TWEETS_CLEANER_CONFIG, else ./config.json.
pub fn resolve_config_path(arg: Option<String>) -> PathBuf {
    arg.filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var(CONFIG_ENV).ok().filter(|s| !s.trim().is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

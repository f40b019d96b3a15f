mod config;
mod date;
mod record;
mod archive;
mod filters;
mod deletion_log;

mod api;
mod oauth;
mod twitter;
mod cleaner;
mod progress;

mod analyze;
mod util;
mod pipeline;

pub use crate::config::{resolve_config_path, CleanerOptions, CONFIG_ENV, DEFAULT_CONFIG_PATH};
pub use crate::date::{parse_timestamp, reset_from_epoch, resolve_cutoff};
pub use crate::record::{is_numeric_id, PostRecord};
pub use crate::pipeline::{Plan, RunOutcome, TweetsCleaner};

// Archive ingestion, usable on its own.
pub use crate::archive::{read_archive, read_csv, read_json, read_twitter_js, ArchiveFormat};

// Candidate selection.
pub use crate::filters::{is_candidate, select_candidates, RetentionRules};

// Deletion log persistence.
pub use crate::deletion_log::{DeletionLog, DEFAULT_LOG_PATH};

// Remote API seam and the live client.
pub use crate::api::{ApiError, DeleteApi, DeleteOutcome, RateLimit};
pub use crate::oauth::Credentials;
pub use crate::twitter::{parse_rate_limit, TwitterClient, DEFAULT_API_BASE};

// The deletion loop.
pub use crate::cleaner::{decide_step, run_deletion, DeletionSummary, LoopSettings, Pacer, StepDecision, StepKind, ThreadSleep};

// Analysis mode.
pub use crate::analyze::{extract_tokens, write_analysis, write_tokens, AnalysisReport, TokenSets};

pub use crate::util::init_tracing_once;

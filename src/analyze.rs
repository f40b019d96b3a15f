//! Read-only analysis: collect distinct hashtags and mentions from candidates.

use crate::record::PostRecord;
use crate::util::create_with_backoff;
use ahash::AHashSet;
use anyhow::{Context, Result};
use rayon::prelude::*;
use regex::Regex;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_HASHTAGS_FILE: &str = "./hashTags.txt";
pub const DEFAULT_USERS_FILE: &str = "./users.txt";

fn hashtag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\w+").expect("static regex"))
}

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\w+").expect("static regex"))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenSets {
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
}

/// Extract every `#word` and `@word` from the candidates' text. Each list is
/// deduplicated and sorted so output files are stable between runs.
pub fn extract_tokens(posts: &[PostRecord]) -> TokenSets {
    let (tags, users) = posts
        .par_iter()
        .fold(
            || (AHashSet::<String>::new(), AHashSet::<String>::new()),
            |(mut tags, mut users), post| {
                for m in hashtag_re().find_iter(&post.text) {
                    tags.insert(m.as_str().to_string());
                }
                for m in mention_re().find_iter(&post.text) {
                    users.insert(m.as_str().to_string());
                }
                (tags, users)
            },
        )
        .reduce(
            || (AHashSet::<String>::new(), AHashSet::<String>::new()),
            |(mut a_tags, mut a_users), (b_tags, b_users)| {
                a_tags.extend(b_tags);
                a_users.extend(b_users);
                (a_tags, a_users)
            },
        );
    let mut hashtags: Vec<String> = tags.into_iter().collect();
    let mut mentions: Vec<String> = users.into_iter().collect();
    hashtags.sort();
    mentions.sort();
    TokenSets { hashtags, mentions }
}

/// What was written where. A failed file carries its error message; the other
/// file is written regardless.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub tokens: TokenSets,
    pub hashtags_path: PathBuf,
    pub mentions_path: PathBuf,
    pub hashtags_error: Option<String>,
    pub mentions_error: Option<String>,
}

impl AnalysisReport {
    pub fn is_complete(&self) -> bool {
        self.hashtags_error.is_none() && self.mentions_error.is_none()
    }
}

pub fn write_tokens(path: &Path, tokens: &[String]) -> Result<()> {
    let f = create_with_backoff(path, 16, 50).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for t in tokens {
        w.write_all(t.as_bytes())?;
        w.write_all(b"\n")?;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// Extract and persist both token lists. No network, no deletion log access.
pub fn write_analysis(posts: &[PostRecord], hashtags_path: &Path, mentions_path: &Path) -> AnalysisReport {
    let tokens = extract_tokens(posts);
    let mut report = AnalysisReport {
        hashtags_path: hashtags_path.to_path_buf(),
        mentions_path: mentions_path.to_path_buf(),
        ..Default::default()
    };

    match write_tokens(hashtags_path, &tokens.hashtags) {
        Ok(()) => tracing::info!("The hashtags file has been saved! ({} tags -> {})", tokens.hashtags.len(), hashtags_path.display()),
        Err(e) => {
            tracing::error!("Writing hashtags failed: {:#}", e);
            report.hashtags_error = Some(format!("{:#}", e));
        }
    }
    match write_tokens(mentions_path, &tokens.mentions) {
        Ok(()) => tracing::info!("The users file has been saved! ({} users -> {})", tokens.mentions.len(), mentions_path.display()),
        Err(e) => {
            tracing::error!("Writing users failed: {:#}", e);
            report.mentions_error = Some(format!("{:#}", e));
        }
    }
    report.tokens = tokens;
    report
}

//! Durable record of posts already deleted. Read at startup, rewritten whole
//! after every deletion attempt via temp file + atomic rename.

use crate::record::PostRecord;
use crate::util::{create_with_backoff, replace_file_atomic_backoff, tmp_sibling};
use ahash::AHashSet;
use anyhow::{Context, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_PATH: &str = "./log.json";

#[derive(Debug)]
pub struct DeletionLog {
    path: PathBuf,
    entries: Vec<PostRecord>,
    ids: AHashSet<String>,
}

impl DeletionLog {
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), entries: Vec::new(), ids: AHashSet::new() }
    }

    /// Load the log at `path`. A missing, unreadable or malformed file yields an
    /// empty log: the next run starts a fresh delete cycle.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::info!("No log file at {} ({}), starting a fresh delete cycle.", path.display(), e);
                return Self::empty(path);
            }
        };
        match serde_json::from_str::<Vec<PostRecord>>(&raw) {
            Ok(entries) => {
                let ids = entries.iter().map(|r| r.tweet_id.trim().to_string()).collect();
                tracing::info!("Loaded {} deleted posts from {}", entries.len(), path.display());
                Self { path: path.to_path_buf(), entries, ids }
            }
            Err(e) => {
                tracing::warn!("Log file {} is not a valid JSON array ({}), starting a fresh delete cycle.", path.display(), e);
                Self::empty(path)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id.trim())
    }

    /// Record a confirmed deletion. Re-recording an id already present is a no-op.
    pub fn record(&mut self, post: PostRecord) {
        if self.ids.insert(post.tweet_id.trim().to_string()) {
            self.entries.push(post);
        }
    }

    pub fn entries(&self) -> &[PostRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty-print the whole log to a sibling temp file, fsync, then rename over the target.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let tmp = tmp_sibling(&self.path);
        let f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, &self.entries).with_context(|| format!("serialize {}", tmp.display()))?;
        w.write_all(b"\n")?;
        let f = w.into_inner().map_err(|e| e.into_error()).with_context(|| format!("flush {}", tmp.display()))?;
        f.sync_all().with_context(|| format!("sync {}", tmp.display()))?;
        drop(f);
        replace_file_atomic_backoff(&tmp, &self.path)
    }
}

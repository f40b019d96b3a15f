#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use tweets_cleaner::{ApiError, DeleteApi, DeleteOutcome, Pacer, PostRecord, RateLimit};

/// Write a legacy-style CSV archive with the given (id, timestamp, text) rows.
pub fn write_csv_archive(dir: &Path, rows: &[(&str, &str, &str)]) -> PathBuf {
    let path = dir.join("tweets.csv");
    let mut w = csv::Writer::from_path(&path).unwrap();
    w.write_record(["tweet_id", "in_reply_to_status_id", "timestamp", "source", "text"]).unwrap();
    for (id, ts, text) in rows {
        w.write_record([*id, "", *ts, "web", *text]).unwrap();
    }
    w.flush().unwrap();
    path
}

/// A small archive crossing each candidate predicate (cutoff 2015-01-01, pattern "#keep"):
/// - 100, 101: old, plain -> candidates
/// - abc123, "": malformed ids
/// - 102: newer than the cutoff
/// - 103: old but matches the retention pattern
pub fn make_archive_basic(dir: &Path) -> PathBuf {
    write_csv_archive(
        dir,
        &[
            ("100", "2012-03-08 21:45:26 +0000", "Hello #foo @bar #foo"),
            ("abc123", "2012-03-08 21:45:26 +0000", "bad id #bad"),
            ("", "2012-03-08 21:45:26 +0000", "empty id"),
            ("101", "2013-07-01 08:00:00 +0000", "lunch with @alice #food"),
            ("102", "2016-02-01 08:00:00 +0000", "too recent #new"),
            ("103", "2011-01-01 00:00:00 +0000", "family photo #keep"),
        ],
    )
}

pub fn ids(records: &[PostRecord]) -> Vec<String> {
    records.iter().map(|r| r.tweet_id.clone()).collect()
}

/// Replays scripted outcomes in order; once the script runs out every call succeeds.
#[derive(Default)]
pub struct ScriptedApi {
    pub script: VecDeque<DeleteOutcome>,
    pub calls: Vec<String>,
}

impl ScriptedApi {
    pub fn new(script: Vec<DeleteOutcome>) -> Self {
        Self { script: script.into(), calls: Vec::new() }
    }
}

impl DeleteApi for ScriptedApi {
    fn delete_post(&mut self, id: &str) -> DeleteOutcome {
        self.calls.push(id.to_string());
        self.script.pop_front().unwrap_or_else(|| DeleteOutcome::ok(remaining(100)))
    }
}

/// Panics if anything reaches the network.
pub struct NoNetwork;

impl DeleteApi for NoNetwork {
    fn delete_post(&mut self, id: &str) -> DeleteOutcome {
        panic!("unexpected delete call for {}", id);
    }
}

#[derive(Default)]
pub struct RecordingPacer {
    pub waits: Vec<Duration>,
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, wait: Duration) {
        self.waits.push(wait);
    }
}

pub fn remaining(n: u64) -> RateLimit {
    RateLimit { remaining: Some(n), reset_at: Some(OffsetDateTime::now_utc() + time::Duration::minutes(15)) }
}

pub fn exhausted_for(ms: i64) -> RateLimit {
    RateLimit { remaining: Some(0), reset_at: Some(OffsetDateTime::now_utc() + time::Duration::milliseconds(ms)) }
}

pub fn app_error(status: u16) -> ApiError {
    ApiError::Status { status, body: format!("{{\"errors\":[{{\"code\":{}}}]}}", status) }
}

pub fn read_log_ids(path: &Path) -> Vec<String> {
    let raw = fs::read_to_string(path).unwrap();
    let v: Vec<PostRecord> = serde_json::from_str(&raw).unwrap();
    ids(&v)
}

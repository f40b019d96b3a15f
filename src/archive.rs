//! Archive ingestion: turn an exported archive file into `PostRecord`s.
//!
//! Supported layouts, picked by extension:
//! - `.csv` (and anything unknown): legacy export with a header row containing
//!   `tweet_id`, `text`, `timestamp`; other columns ride along in `extra`.
//! - `.json`: array of `{tweet_id, text, timestamp, ...}` objects.
//! - `.js`: current export, `window.YTD.tweets.part0 = [{"tweet": {...}}, ...]`.

use crate::record::PostRecord;
use crate::util::open_with_backoff;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Csv,
    Json,
    TwitterJs,
}

impl ArchiveFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("json") => ArchiveFormat::Json,
            Some("js") => ArchiveFormat::TwitterJs,
            _ => ArchiveFormat::Csv,
        }
    }
}

/// Read every record from the archive. An unreadable file, a parse failure or an
/// archive with zero rows is an error: nothing should be deleted or analyzed then.
pub fn read_archive(path: &Path) -> Result<Vec<PostRecord>> {
    let f = open_with_backoff(path, 8, 50).with_context(|| format!("open archive {}", path.display()))?;
    let rdr = BufReader::new(f);
    let records = match ArchiveFormat::from_path(path) {
        ArchiveFormat::Csv => read_csv(rdr),
        ArchiveFormat::Json => read_json(rdr),
        ArchiveFormat::TwitterJs => read_twitter_js(rdr),
    }
    .with_context(|| format!("parse archive {}", path.display()))?;
    if records.is_empty() {
        bail!("archive {} contains no records", path.display());
    }
    tracing::debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_csv<R: Read>(rdr: R) -> Result<Vec<PostRecord>> {
    let mut csv_rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(rdr);
    let headers = csv_rdr.headers().context("read csv header")?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);
    let id_col = col("tweet_id").ok_or_else(|| anyhow!("missing 'tweet_id' column"))?;
    let text_col = col("text").ok_or_else(|| anyhow!("missing 'text' column"))?;
    let ts_col = col("timestamp").ok_or_else(|| anyhow!("missing 'timestamp' column"))?;

    let mut out = Vec::new();
    for (i, row) in csv_rdr.records().enumerate() {
        let row = row.with_context(|| format!("csv row {}", i + 1))?;
        let field = |c: usize| row.get(c).unwrap_or("").to_string();
        let mut extra = Map::new();
        for (c, name) in headers.iter().enumerate() {
            if c == id_col || c == text_col || c == ts_col {
                continue;
            }
            extra.insert(name.to_string(), Value::String(field(c)));
        }
        out.push(PostRecord { tweet_id: field(id_col), text: field(text_col), timestamp: field(ts_col), extra });
    }
    Ok(out)
}

pub fn read_json<R: Read>(rdr: R) -> Result<Vec<PostRecord>> {
    let v: Vec<PostRecord> = serde_json::from_reader(rdr).context("decode json array")?;
    Ok(v)
}

/// Current exports wrap a JSON array in a JS assignment; strip everything up to
/// the first `[` and map `id_str`/`full_text`/`created_at` onto our fields.
pub fn read_twitter_js<R: Read>(mut rdr: R) -> Result<Vec<PostRecord>> {
    let mut raw = String::new();
    rdr.read_to_string(&mut raw).context("read tweets.js")?;
    let start = raw.find('[').ok_or_else(|| anyhow!("no JSON array in tweets.js"))?;
    let items: Vec<Value> = serde_json::from_str(raw[start..].trim_end().trim_end_matches(';'))
        .context("decode tweets.js array")?;

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let tweet = match item.get("tweet") {
            Some(Value::Object(m)) => m.clone(),
            _ => match item {
                Value::Object(m) => m,
                _ => continue,
            },
        };
        out.push(record_from_js_tweet(tweet));
    }
    Ok(out)
}

fn record_from_js_tweet(mut tweet: Map<String, Value>) -> PostRecord {
    let mut take_str = |keys: &[&str]| -> String {
        for k in keys {
            if let Some(v) = tweet.remove(*k) {
                return match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
            }
        }
        String::new()
    };
    let tweet_id = take_str(&["id_str", "id"]);
    let text = take_str(&["full_text", "text"]);
    let timestamp = take_str(&["created_at"]);
    PostRecord { tweet_id, text, timestamp, extra: tweet }
}

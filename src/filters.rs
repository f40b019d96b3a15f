//! Candidate selection: which archived posts this run should act on.

use crate::date::parse_timestamp;
use crate::deletion_log::DeletionLog;
use crate::record::PostRecord;
use anyhow::{Context, Result};
use regex::Regex;
use time::OffsetDateTime;

/// Compiled retention patterns. Any match against the raw text keeps the post.
#[derive(Clone, Debug, Default)]
pub struct RetentionRules {
    patterns: Vec<Regex>,
}

impl RetentionRules {
    pub fn compile<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).with_context(|| format!("invalid saveRegexp pattern '{}'", p))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Case-sensitive, unanchored; stops at the first matching pattern.
    pub fn keeps(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// A record is a candidate iff its id is numeric, it is strictly older than
/// `cutoff`, it is not in the deletion log, and no retention pattern matches.
pub fn is_candidate(rec: &PostRecord, cutoff: OffsetDateTime, log: &DeletionLog, rules: &RetentionRules) -> bool {
    if !rec.has_numeric_id() {
        return false;
    }
    match parse_timestamp(&rec.timestamp) {
        Some(ts) if ts < cutoff => {}
        _ => return false,
    }
    if log.contains(&rec.tweet_id) {
        return false;
    }
    !rules.keeps(&rec.text)
}

/// Filter `records` down to candidates, preserving archive order.
pub fn select_candidates(
    records: &[PostRecord],
    cutoff: OffsetDateTime,
    log: &DeletionLog,
    rules: &RetentionRules,
) -> Vec<PostRecord> {
    records.iter().filter(|r| is_candidate(r, cutoff, log, rules)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn rec(id: &str, text: &str, ts: &str) -> PostRecord {
        PostRecord::new(id, text, ts)
    }

    #[test]
    fn each_predicate_excludes_independently() {
        let cutoff = datetime!(2015-01-01 0:00 UTC);
        let mut log = DeletionLog::empty("unused.json");
        log.record(rec("3", "", ""));
        let rules = RetentionRules::compile(["KEEP"]).unwrap();
        let records = vec![
            rec("1", "old and plain", "2014-06-01 10:00:00 +0000"),
            rec("abc123", "bad id", "2014-06-01 10:00:00 +0000"),
            rec("", "empty id", "2014-06-01 10:00:00 +0000"),
            rec("2", "too new", "2015-01-01 00:00:00 +0000"),
            rec("3", "already deleted", "2014-06-01 10:00:00 +0000"),
            rec("4", "please KEEP me", "2001-01-01 00:00:00 +0000"),
            rec("5", "keep lowercase is not a match", "2014-06-01 10:00:00 +0000"),
            rec("6", "no timestamp", "???"),
        ];
        let got: Vec<String> = select_candidates(&records, cutoff, &log, &rules).into_iter().map(|r| r.tweet_id).collect();
        assert_eq!(got, vec!["1", "5"]);
    }

    #[test]
    fn invalid_pattern_is_error() {
        assert!(RetentionRules::compile(["(unclosed"]).is_err());
    }
}

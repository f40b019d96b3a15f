use crate::analyze::{write_analysis, AnalysisReport};
use crate::api::DeleteApi;
use crate::archive::read_archive;
use crate::cleaner::{run_deletion, DeletionSummary, LoopSettings, Pacer, ThreadSleep};
use crate::config::CleanerOptions;
use crate::date::resolve_cutoff;
use crate::deletion_log::DeletionLog;
use crate::filters::{select_candidates, RetentionRules};
use crate::record::PostRecord;
use crate::twitter::TwitterClient;
use crate::util::init_tracing_once;
use anyhow::{anyhow, Result};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// How a run ended. Fatal failures are the `Err` side of `run`.
#[derive(Debug)]
pub enum RunOutcome {
    NothingToDo,
    Analyzed(AnalysisReport),
    Deleted(DeletionSummary),
}

/// Everything `run` needs after config has been validated and inputs read.
#[derive(Debug)]
pub struct Plan {
    pub cutoff: OffsetDateTime,
    pub candidates: Vec<PostRecord>,
    pub log: DeletionLog,
}

#[derive(Clone, Debug, Default)]
pub struct TweetsCleaner {
    pub(crate) opts: CleanerOptions,
}

impl TweetsCleaner {
    pub fn new() -> Self {
        Self { opts: CleanerOptions::default() }
    }

    pub fn from_options(opts: CleanerOptions) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn archive(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_archive(path); self }
    pub fn log(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_log(path); self }
    pub fn max_date(mut self, date: impl Into<String>) -> Self { self.opts = self.opts.with_max_date(date); self }
    pub fn save_regexp<I, S>(mut self, patterns: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.opts = self.opts.with_save_regexp(patterns); self }
    pub fn calls_interval_ms(mut self, ms: u64) -> Self { self.opts = self.opts.with_calls_interval_ms(ms); self }
    pub fn analyze(mut self, yes: bool) -> Self { self.opts = self.opts.with_analyze(yes); self }
    pub fn analysis_outputs(mut self, hashtags: impl AsRef<Path>, users: impl AsRef<Path>) -> Self { self.opts = self.opts.with_analysis_outputs(hashtags, users); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }

    pub fn options(&self) -> &CleanerOptions {
        &self.opts
    }

    /// Validate config, read archive and log, and select candidates.
    /// Config errors (bad pattern or date) surface before the archive is touched.
    pub fn plan(&self) -> Result<Plan> {
        self.opts.validate()?;
        let rules = RetentionRules::compile(&self.opts.save_regexp)?;
        let cutoff = resolve_cutoff(self.opts.max_date.as_deref()).map_err(|e| anyhow!(e))?;

        let records = read_archive(&self.opts.path)?;
        let log = DeletionLog::load(&self.opts.log);
        let candidates = select_candidates(&records, cutoff, &log, &rules);
        tracing::info!(
            "{} of {} archived posts are candidates ({} already deleted, {} retention patterns)",
            candidates.len(),
            records.len(),
            log.len(),
            rules.len()
        );
        Ok(Plan { cutoff, candidates, log })
    }

    /// Full run against the live API, pacing with real sleeps.
    pub fn run(&self) -> Result<RunOutcome> {
        init_tracing_once();
        let plan = self.plan()?;
        if plan.candidates.is_empty() {
            tracing::info!("No more tweets to delete!");
            return Ok(RunOutcome::NothingToDo);
        }
        if self.opts.analyze {
            return Ok(self.analyze_plan(&plan));
        }
        let mut client = TwitterClient::new(
            self.opts.credentials.clone(),
            self.opts.api_base.clone(),
            self.opts.request_timeout(),
        )?;
        self.delete_plan(plan, &mut client, &mut ThreadSleep)
    }

    /// Same as `run`, with the remote API and pacing supplied by the caller.
    pub fn run_with<A, P>(&self, api: &mut A, pacer: &mut P) -> Result<RunOutcome>
    where
        A: DeleteApi + ?Sized,
        P: Pacer + ?Sized,
    {
        let plan = self.plan()?;
        if plan.candidates.is_empty() {
            tracing::info!("No more tweets to delete!");
            return Ok(RunOutcome::NothingToDo);
        }
        if self.opts.analyze {
            return Ok(self.analyze_plan(&plan));
        }
        self.delete_plan(plan, api, pacer)
    }

    fn analyze_plan(&self, plan: &Plan) -> RunOutcome {
        tracing::info!(
            "Starting analyzing tweets on {} - Analyzing tweets older than {}",
            now_rfc3339(),
            fmt_rfc3339(plan.cutoff)
        );
        RunOutcome::Analyzed(write_analysis(&plan.candidates, &self.opts.hashtags_file, &self.opts.users_file))
    }

    fn delete_plan<A, P>(&self, plan: Plan, api: &mut A, pacer: &mut P) -> Result<RunOutcome>
    where
        A: DeleteApi + ?Sized,
        P: Pacer + ?Sized,
    {
        tracing::info!(
            "Starting tweets cleaner on {} - Deleting tweets older than {}",
            now_rfc3339(),
            fmt_rfc3339(plan.cutoff)
        );
        let Plan { candidates, mut log, .. } = plan;
        let settings = LoopSettings { calls_interval: self.opts.calls_interval(), progress: self.opts.progress };
        let summary = run_deletion(&candidates, &mut log, api, pacer, settings)?;
        Ok(RunOutcome::Deleted(summary))
    }
}

fn fmt_rfc3339(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_else(|_| dt.to_string())
}

fn now_rfc3339() -> String {
    fmt_rfc3339(OffsetDateTime::now_utc())
}

//! Scheduled alert jobs
//!
//! Each job sends a session header, analyzes every configured symbol
//! concurrently and sends one report per symbol. Nothing in a job can stop
//! the schedule loop: failed analyses become error reports and failed
//! deliveries are logged and counted.

use std::future::Future;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::{
    analysis::{AnalysisOutcome, Analyzer},
    notify::Notifier,
    provider::MarketDataProvider,
    report::{format_report, format_session_header},
    schedule::{AlertKind, SessionSchedule},
};

/// Summary of one job run
#[derive(Debug, Clone)]
pub struct JobReport {
    pub kind: AlertKind,
    pub at: DateTime<Utc>,
    /// One per symbol, in configured order
    pub outcomes: Vec<AnalysisOutcome>,
    /// Messages handed to the notifier without error, header included
    pub delivered: usize,
    pub failed_deliveries: usize,
}

impl JobReport {
    pub fn plans_found(&self) -> usize {
        self.outcomes.iter().filter(|o| o.plan().is_some()).count()
    }

    pub fn failed_analyses(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }
}

/// Runs scheduled alert jobs over the configured symbols
#[derive(Debug)]
pub struct AlertService<P, N> {
    analyzer: Analyzer<P>,
    notifier: N,
    schedule: SessionSchedule,
    symbols: Vec<String>,
}

impl<P: MarketDataProvider, N: Notifier> AlertService<P, N> {
    pub fn new(
        analyzer: Analyzer<P>,
        notifier: N,
        schedule: SessionSchedule,
        symbols: Vec<String>,
    ) -> Self {
        Self {
            analyzer,
            notifier,
            schedule,
            symbols,
        }
    }

    pub fn schedule(&self) -> &SessionSchedule {
        &self.schedule
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Run one job now. `at` is the nominal trigger time shown in the header.
    pub async fn run_job(&self, kind: AlertKind, at: DateTime<Utc>) -> JobReport {
        info!(%kind, symbols = self.symbols.len(), "running alert job");

        let mut report = JobReport {
            kind,
            at,
            outcomes: Vec::with_capacity(self.symbols.len()),
            delivered: 0,
            failed_deliveries: 0,
        };

        let header = format_session_header(
            kind,
            &self.schedule,
            at,
            &self.symbols,
            self.analyzer.core().config().coarse_interval,
        );
        self.deliver(&header, &mut report).await;

        let outcomes = join_all(self.symbols.iter().map(|s| self.analyzer.analyze(s))).await;
        for outcome in &outcomes {
            self.deliver(&format_report(outcome), &mut report).await;
        }
        report.outcomes = outcomes;

        info!(
            %kind,
            plans = report.plans_found(),
            failed_analyses = report.failed_analyses(),
            failed_deliveries = report.failed_deliveries,
            "alert job finished"
        );
        report
    }

    async fn deliver(&self, text: &str, report: &mut JobReport) {
        match self.notifier.send(text).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                error!(kind = %report.kind, error = %e, "message delivery failed");
                report.failed_deliveries += 1;
            },
        }
    }

    /// Sleep until each trigger and run its job, until `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut last_fired: Option<DateTime<Utc>> = None;

        loop {
            let now = Utc::now();
            // never fire the same trigger twice if the timer wakes early
            let after = last_fired.map_or(now, |t| t.max(now));
            let Some(trigger) = self.schedule.next_trigger(after) else {
                warn!("schedule has no upcoming trigger, stopping");
                return;
            };
            let wait = (trigger.at - now).to_std().unwrap_or_default();
            info!(
                kind = %trigger.kind,
                at = %self.schedule.local_time(trigger.at).format("%Y-%m-%d %H:%M %Z"),
                wait_secs = wait.as_secs(),
                "next alert scheduled"
            );

            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping scheduler");
                    return;
                }
                _ = tokio::time::sleep(wait) => {
                    self.run_job(trigger.kind, trigger.at).await;
                    last_fired = Some(trigger.at);
                }
            }
        }
    }
}

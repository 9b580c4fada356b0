// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Network-wide report batches and the daily collection loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, Utc};
use futures::StreamExt;
use tracing::{error, info, warn};

use crate::chain::{ChainQuery, TipsetRef};
use crate::report::{ExpirationReport, Report, ReportSink};
use crate::ReportEngine;

/// How a batch run walks the network.
#[derive(Clone, Copy, Debug)]
pub struct BatchConfig {
    /// Upper bound on miners queried concurrently.
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig { concurrency: 12 }
    }
}

/// The result of one network sweep. Failed miners are skipped, not fatal.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    pub reports: Vec<ExpirationReport>,
    pub skipped: usize,
}

/// Computes an expiration report for every miner on the network at `ts`.
///
/// Miner queries run through a buffered stream bounded by
/// `config.concurrency`; results are collected by this task alone, so no
/// shared mutable state is needed. A miner whose queries fail is logged
/// and skipped; only the initial miner enumeration is fatal.
pub async fn network_expiration_report<Q: ChainQuery>(
    engine: &ReportEngine<Q>,
    config: &BatchConfig,
    ts: &TipsetRef,
) -> Result<BatchOutcome, crate::Error> {
    let as_of_date = Utc::now().date_naive();
    let miners = engine.chain().list_miners(ts).await?;
    info!(miners = miners.len(), "starting expiration sweep");

    let mut results = futures::stream::iter(miners.into_iter().map(|miner| async move {
        let report = engine.expiration_report(&miner, ts, as_of_date).await;
        (miner, report)
    }))
    .buffered(config.concurrency.max(1));

    let mut outcome = BatchOutcome::default();
    while let Some((miner, report)) = results.next().await {
        match report {
            Ok(report) => outcome.reports.push(report),
            Err(err) => {
                warn!(%miner, %err, "skipping miner in expiration sweep");
                outcome.skipped += 1;
            }
        }
    }
    info!(
        reports = outcome.reports.len(),
        skipped = outcome.skipped,
        "expiration sweep finished"
    );
    Ok(outcome)
}

/// Runs `network_expiration_report` once per day at UTC midnight against
/// the chain head, delivering each report to `sink`.
///
/// Single-flight: each run is awaited to completion before the next sleep
/// begins, so runs never overlap even when one takes longer than a day.
pub async fn run_daily<Q, S>(engine: Arc<ReportEngine<Q>>, config: BatchConfig, mut sink: S)
where
    Q: ChainQuery + 'static,
    S: ReportSink,
{
    loop {
        let run_engine = Arc::clone(&engine);
        let handle = tokio::spawn(async move {
            network_expiration_report(&run_engine, &config, &TipsetRef::Head).await
        });

        match handle.await {
            Ok(Ok(outcome)) => {
                for report in outcome.reports {
                    if let Err(err) = sink.deliver(&Report::Expiration(report)) {
                        error!(%err, "failed to deliver expiration report");
                    }
                }
            }
            Ok(Err(err)) => error!(%err, "expiration sweep failed"),
            Err(err) => error!(%err, "expiration sweep task panicked"),
        }

        tokio::time::sleep(until_next_utc_midnight()).await;
    }
}

fn until_next_utc_midnight() -> Duration {
    let now = Utc::now();
    let midnight = NaiveTime::MIN;
    let next = (now.date_naive() + chrono::Duration::days(1)).and_time(midnight);
    (next - now.naive_utc())
        .to_std()
        .unwrap_or(Duration::from_secs(60 * 60 * 24))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_midnight_is_within_a_day() {
        let wait = until_next_utc_midnight();
        assert!(wait <= Duration::from_secs(60 * 60 * 24));
        assert!(wait > Duration::ZERO);
    }

    #[test]
    fn default_concurrency_bounds_in_flight_miners() {
        assert_eq!(12, BatchConfig::default().concurrency);
    }
}

use crate::collector::Collector;
use crate::digest::DigestFormatter;
use crate::ledger::Ledger;
use crate::publisher::Publisher;
use crate::scoring::KeywordTable;
use crate::types::{Result, ScoredItem, ScoringConfig};
use std::time::Instant;
use tracing::{error, info, warn};

/// Counters for one run of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub known: usize,
    pub collected: usize,
    pub ranked: usize,
    pub parts: usize,
    pub committed: usize,
    pub commit_failures: usize,
    /// Set when the digest was rendered but not sent.
    pub dry_run: bool,
}

/// One-shot run: collect, score, format, publish, then record what was sent.
pub struct DigestPipeline {
    collector: Collector,
    keywords: KeywordTable,
    scoring: ScoringConfig,
    formatter: DigestFormatter,
    publisher: Publisher,
    send_empty: bool,
    dry_run: bool,
}

impl DigestPipeline {
    pub fn new(
        collector: Collector,
        keywords: KeywordTable,
        scoring: ScoringConfig,
        formatter: DigestFormatter,
        publisher: Publisher,
    ) -> Self {
        Self {
            collector,
            keywords,
            scoring,
            formatter,
            publisher,
            send_empty: false,
            dry_run: false,
        }
    }

    /// Send the "nothing new" digest when no item passes the filter.
    pub fn with_send_empty(mut self, send_empty: bool) -> Self {
        self.send_empty = send_empty;
        self
    }

    /// Render and print the digest without sending it or touching the ledger.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run once against `ledger`.
    ///
    /// Links are only written to the ledger after every part was delivered; a
    /// publish error is returned with the ledger left as it was.
    pub async fn run(&self, ledger: &Ledger) -> Result<RunReport> {
        let started = Instant::now();
        let mut report = RunReport {
            dry_run: self.dry_run,
            ..Default::default()
        };

        let known = ledger.load_all().await?;
        report.known = known.len();

        let collected = self.collector.collect(&known).await;
        report.collected = collected.len();

        let ranked = self
            .keywords
            .filter_and_rank(collected, self.scoring.min_score, self.scoring.max_items);
        report.ranked = ranked.len();

        if ranked.is_empty() && !self.send_empty {
            info!("No items passed the scoring filter. Nothing to send.");
            return Ok(report);
        }

        let parts = self.formatter.format(&ranked);
        report.parts = parts.len();

        if self.dry_run {
            for (index, part) in parts.iter().enumerate() {
                println!("----- part {}/{} -----\n{}", index + 1, parts.len(), part);
            }
            info!("Dry run: {} part(s) rendered, nothing sent", parts.len());
            return Ok(report);
        }

        if let Err(e) = self.publisher.publish(&parts).await {
            error!("Publish failed, ledger left unchanged: {}", e);
            return Err(e);
        }

        let (committed, failures) = commit_published(ledger, &ranked).await;
        report.committed = committed;
        report.commit_failures = failures;

        info!(
            "Run finished in {:.2}s: {} known, {} collected, {} ranked, {} part(s), {} committed",
            started.elapsed().as_secs_f64(),
            report.known,
            report.collected,
            report.ranked,
            report.parts,
            report.committed
        );
        Ok(report)
    }
}

/// Record every published link. A failed insert is logged and counted; the
/// link may be delivered again by a later run.
pub async fn commit_published(ledger: &Ledger, items: &[ScoredItem]) -> (usize, usize) {
    let mut committed = 0;
    let mut failures = 0;

    for scored in items {
        match ledger.insert(&scored.item.link).await {
            Ok(()) => committed += 1,
            Err(e) => {
                failures += 1;
                warn!("Could not record {} in ledger: {}", scored.item.link, e);
            }
        }
    }

    info!("Saved {} links to ledger", committed);
    (committed, failures)
}

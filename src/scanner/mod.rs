//! Probing engine: prober trait and the bounded-concurrency scheduler

pub mod catalog;
pub mod classify;
pub mod debug_log;
pub mod shutdown;
pub mod wp_config;

pub use shutdown::{Shutdown, ShutdownTrigger};

use crate::error::{LeakLensError, Result};
use crate::http::HttpClient;
use crate::models::{Finding, ProbeFamily, ScanConfig, ScanResult, Target};
use crate::report::sink::ResultSink;
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Sending half of the findings queue
pub type FindingQueue = mpsc::Sender<Finding>;

/// One check family run against a single target
#[async_trait]
pub trait PathProber: Send + Sync {
    /// Family tag stamped on every finding
    fn family(&self) -> ProbeFamily;

    /// Catalog of relative paths, probed in order
    fn paths(&self) -> &'static [&'static str];

    /// Probes one resolved URL, yielding zero or one finding.
    /// Network failures become error findings, never `Err`.
    async fn probe(&self, client: &HttpClient, url: &str) -> Option<Finding>;

    /// Probes every catalog path on `target` sequentially and pushes each
    /// finding onto the queue. Individual failures never stop the loop.
    async fn scan_target(
        &self,
        client: &HttpClient,
        target: &Target,
        queue: &FindingQueue,
        shutdown: &mut Shutdown,
    ) -> ProberReport {
        let mut report = ProberReport::default();

        for path in self.paths() {
            if shutdown.is_triggered() {
                report.cancelled = true;
                break;
            }

            let url = target.join(path);
            report.attempted += 1;

            let finding = tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    report.cancelled = true;
                    break;
                }
                finding = self.probe(client, &url) => finding,
            };

            let Some(finding) = finding else {
                continue;
            };

            tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    report.cancelled = true;
                    break;
                }
                sent = queue.send(finding) => {
                    if sent.is_err() {
                        warn!("Findings queue closed while probing {target}");
                        break;
                    }
                    report.emitted += 1;
                }
            }
        }

        debug!(
            "{} on {target}: {} attempted, {} emitted",
            self.family(),
            report.attempted,
            report.emitted
        );
        report
    }
}

/// Outcome of one prober run on one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProberReport {
    pub attempted: usize,
    pub emitted: usize,
    pub cancelled: bool,
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Dispatching,
    Draining,
    Done,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::Idle => write!(f, "idle"),
            ScanPhase::Dispatching => write!(f, "dispatching"),
            ScanPhase::Draining => write!(f, "draining"),
            ScanPhase::Done => write!(f, "done"),
        }
    }
}

/// Admits targets through a fixed-size gate and runs every registered
/// prober on each admitted target. Owns the HTTP client and the findings queue.
pub struct Scheduler {
    config: ScanConfig,
    client: HttpClient,
    probers: Vec<Arc<dyn PathProber>>,
    shutdown: Shutdown,
    progress: ProgressBar,
    phase: ScanPhase,
}

impl Scheduler {
    /// Creates a scheduler with no registered probers
    pub fn new(config: ScanConfig) -> Result<Self> {
        let client = HttpClient::from_config(&config)?;
        Ok(Self {
            config,
            client,
            probers: Vec::new(),
            shutdown: Shutdown::never(),
            progress: ProgressBar::hidden(),
            phase: ScanPhase::Idle,
        })
    }

    /// Creates a scheduler running the debug-log and wp-config families
    pub fn with_defaults(config: ScanConfig) -> Result<Self> {
        let mut scheduler = Self::new(config)?;
        scheduler.register(Arc::new(debug_log::DebugLogProber));
        scheduler.register(Arc::new(wp_config::WpConfigProber));
        Ok(scheduler)
    }

    /// Registers a prober family
    pub fn register(&mut self, prober: Arc<dyn PathProber>) {
        self.probers.push(prober);
    }

    /// Observes `shutdown` at every suspension point
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Reports unit completion and routes console output through `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    fn set_phase(&mut self, phase: ScanPhase) {
        debug!("Scheduler {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Scans every target and returns once the sink has drained the queue.
    ///
    /// The sink, and with it the output file, is set up before anything is
    /// dispatched, so an unwritable output path fails the run up front.
    pub async fn run(&mut self, targets: &[Target]) -> Result<ScanResult> {
        if targets.is_empty() {
            return Err(LeakLensError::NoTargets);
        }

        let mut result = ScanResult::new();
        let sink = ResultSink::new(&self.config, self.progress.clone())?;
        let (queue, findings) = mpsc::channel::<Finding>(self.config.queue_capacity);
        let sink_handle = tokio::spawn(sink.drain(findings));

        self.set_phase(ScanPhase::Dispatching);
        info!(
            "Scanning {} targets with {} families, concurrency {}",
            targets.len(),
            self.probers.len(),
            self.config.concurrency
        );
        self.progress
            .set_length((targets.len() * self.probers.len()) as u64);

        let gate = Arc::new(Semaphore::new(self.config.concurrency));
        let mut units = JoinSet::new();
        let mut shutdown = self.shutdown.clone();

        for target in targets {
            if shutdown.is_triggered() {
                break;
            }

            // One slot per target, shared by all of its prober units
            let permit = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                permit = Arc::clone(&gate).acquire_owned() => match permit {
                    Ok(permit) => Arc::new(permit),
                    Err(_) => break,
                },
            };

            result.targets_scanned += 1;
            debug!("Admitted {target}");

            for prober in &self.probers {
                let prober = Arc::clone(prober);
                let client = self.client.clone();
                let queue = queue.clone();
                let mut unit_shutdown = self.shutdown.clone();
                let permit = Arc::clone(&permit);
                let progress = self.progress.clone();
                let target = target.clone();

                units.spawn(async move {
                    let report = prober
                        .scan_target(&client, &target, &queue, &mut unit_shutdown)
                        .await;
                    drop(permit);
                    progress.inc(1);
                    (target, prober.family(), report)
                });
            }
        }

        // Units hold the remaining senders; the queue closes when the last one exits
        drop(queue);

        self.set_phase(ScanPhase::Draining);
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((target, family, report)) if report.cancelled => {
                    debug!("{family} on {target} cancelled after {} paths", report.attempted);
                }
                Ok(_) => {}
                Err(e) => error!("Probing task failed: {e}"),
            }
        }

        let sink_report = sink_handle
            .await
            .map_err(|e| LeakLensError::TaskError(e.to_string()))?;
        self.set_phase(ScanPhase::Done);
        self.progress.finish_and_clear();

        result.total_findings = sink_report.total;
        result.found_lines = sink_report.found_lines;
        result.counts = sink_report.counts;
        result.total_requests = self.client.request_count();
        result.peak_in_flight = self.client.peak_in_flight();
        result.interrupted = self.shutdown.is_triggered();
        result.finish();

        info!(
            "Scan finished: {} findings, {} requests, {} [FOUND] lines",
            result.total_findings,
            result.total_requests,
            result.found_lines
        );
        Ok(result)
    }
}

use crate::{
    ratelimit::ScanRateLimiter,
    types::{normalize_parallelism, ProbeOutcome, ScanConfig},
};
use futures::future::join_all;
use std::{
    collections::{HashMap, HashSet},
    future::Future,
    sync::Arc,
};
use tokio::sync::{mpsc, Mutex};

/// Checks whether one fully-qualified candidate is live.
///
/// Implementations swallow their own I/O errors and report them as an
/// outcome that is not accepted.
pub trait Probe: Send + Sync {
    fn probe(&self, candidate: String) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Adapts an async closure into a [`Probe`].
pub struct FnProbe<F>(F);

pub fn probe_fn<F, Fut>(f: F) -> FnProbe<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send,
{
    FnProbe(f)
}

impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send,
{
    fn probe(&self, candidate: String) -> impl Future<Output = ProbeOutcome> + Send {
        (self.0)(candidate)
    }
}

/// Runs a probe over a candidate list with a fixed number of workers.
///
/// A single producer feeds a work queue bounded at `parallelism`, so at most
/// `parallelism` probes are ever in flight. Accepted outcomes flow over a
/// channel into one collector, which is the only writer of the result map.
#[derive(Debug, Clone)]
pub struct BoundedProber {
    parallelism: usize,
    rate_limiter: Option<ScanRateLimiter>,
}

impl BoundedProber {
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: normalize_parallelism(parallelism),
            rate_limiter: None,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            parallelism: config.effective_parallelism(),
            rate_limiter: config.rate_per_second.map(ScanRateLimiter::per_second),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: ScanRateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Probes every candidate and returns the accepted ones.
    pub async fn run<P, I>(&self, candidates: I, probe: Arc<P>) -> HashSet<String>
    where
        P: Probe + 'static,
        I: IntoIterator<Item = String>,
    {
        self.run_outcomes(candidates, probe)
            .await
            .into_keys()
            .collect()
    }

    /// Like [`run`](Self::run) but keeps the accepted outcomes, keyed by candidate.
    pub async fn run_outcomes<P, I>(
        &self,
        candidates: I,
        probe: Arc<P>,
    ) -> HashMap<String, ProbeOutcome>
    where
        P: Probe + 'static,
        I: IntoIterator<Item = String>,
    {
        let candidates: Vec<String> = candidates.into_iter().collect();
        if candidates.is_empty() {
            return HashMap::new();
        }

        let workers = self.parallelism.min(candidates.len());
        let (work_tx, work_rx) = mpsc::channel::<String>(self.parallelism);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (found_tx, mut found_rx) = mpsc::unbounded_channel::<ProbeOutcome>();

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let work_rx = Arc::clone(&work_rx);
                let found_tx = found_tx.clone();
                let probe = Arc::clone(&probe);
                let rate_limiter = self.rate_limiter.clone();

                tokio::spawn(async move {
                    loop {
                        let next = work_rx.lock().await.recv().await;
                        let Some(candidate) = next else { break };

                        if let Some(limiter) = &rate_limiter {
                            limiter.acquire().await;
                        }

                        let outcome = probe.probe(candidate).await;
                        if outcome.accepted {
                            if found_tx.send(outcome).is_err() {
                                break;
                            }
                        } else {
                            tracing::trace!(candidate = %outcome.candidate, "rejected");
                        }
                    }
                })
            })
            .collect();

        let collector = tokio::spawn(async move {
            let mut accepted = HashMap::new();
            while let Some(outcome) = found_rx.recv().await {
                accepted.entry(outcome.candidate.clone()).or_insert(outcome);
            }
            accepted
        });

        for candidate in candidates {
            if work_tx.send(candidate).await.is_err() {
                tracing::warn!("all probe workers exited before the queue was drained");
                break;
            }
        }
        drop(work_tx);

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                tracing::warn!("probe worker failed: {}", e);
            }
        }
        drop(found_tx);

        match collector.await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("result collector failed: {}", e);
                HashMap::new()
            }
        }
    }
}

impl Default for BoundedProber {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_PARALLELISM)
    }
}

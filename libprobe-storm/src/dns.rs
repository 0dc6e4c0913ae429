use crate::{
    prober::Probe,
    types::{Acceptance, ProbeMetadata, ProbeOutcome, ScanConfig},
};
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    system_conf::read_system_conf,
    TokioAsyncResolver,
};
use std::{future::Future, time::Duration};

/// Resolves fully-qualified names; accepted when the answer satisfies the
/// scan's acceptance predicate (by default: at least one address).
#[derive(Clone)]
pub struct DnsProbe {
    resolver: TokioAsyncResolver,
    timeout: Duration,
    acceptance: Acceptance,
}

impl DnsProbe {
    pub fn new(config: &ScanConfig) -> Self {
        let (resolver_config, mut opts) = read_system_conf().unwrap_or_else(|e| {
            tracing::debug!("no usable system resolver config ({}), using defaults", e);
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = config.timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
            timeout: config.timeout,
            acceptance: config.acceptance.clone(),
        }
    }
}

impl Probe for DnsProbe {
    fn probe(&self, candidate: String) -> impl Future<Output = ProbeOutcome> + Send {
        async move {
            let name = absolute_name(&candidate);
            let result = tokio::time::timeout(self.timeout, self.resolver.lookup_ip(name.as_str())).await;

            match result {
                Ok(Ok(lookup)) => {
                    let addresses = lookup.iter().collect();
                    ProbeOutcome::judge(candidate, ProbeMetadata::Dns { addresses }, &self.acceptance)
                }
                Ok(Err(e)) => {
                    tracing::debug!(name = %candidate, "lookup failed: {}", e);
                    ProbeOutcome::failed(candidate, format!("Lookup failed: {}", e))
                }
                Err(_) => ProbeOutcome::failed(candidate, "Timeout"),
            }
        }
    }
}

/// Trailing-dot form, so the resolver never appends search domains.
fn absolute_name(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

impl std::fmt::Debug for DnsProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsProbe")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

use serde::Serialize;
use std::{collections::HashSet, fmt, net::IpAddr, num::NonZeroU32, sync::Arc, time::Duration};

pub const DEFAULT_PARALLELISM: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_ACCEPTED_STATUSES: &[u16] = &[200, 204, 301, 302, 307, 401, 403];

/// What a single probe observed about a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeMetadata {
    Dns { addresses: Vec<IpAddr> },
    Http { status: u16 },
    Failed { reason: String },
}

impl ProbeMetadata {
    pub fn addresses(&self) -> &[IpAddr] {
        match self {
            ProbeMetadata::Dns { addresses } => addresses,
            _ => &[],
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeMetadata::Http { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProbeMetadata::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub candidate: String,
    pub accepted: bool,
    pub metadata: ProbeMetadata,
}

impl ProbeOutcome {
    pub fn judge(candidate: String, metadata: ProbeMetadata, acceptance: &Acceptance) -> Self {
        let accepted = !metadata.is_failed() && acceptance.accepts(&metadata);
        Self {
            candidate,
            accepted,
            metadata,
        }
    }

    /// A probe that could not complete. Never accepted.
    pub fn failed(candidate: String, reason: impl Into<String>) -> Self {
        Self {
            candidate,
            accepted: false,
            metadata: ProbeMetadata::Failed {
                reason: reason.into(),
            },
        }
    }
}

/// Decides whether a probe's metadata counts as a hit.
#[derive(Clone)]
pub struct Acceptance(Arc<dyn Fn(&ProbeMetadata) -> bool + Send + Sync>);

impl Acceptance {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&ProbeMetadata) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Accepts a DNS answer carrying at least one address.
    pub fn resolves() -> Self {
        Self::new(|meta| !meta.addresses().is_empty())
    }

    pub fn status_in<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let codes: HashSet<u16> = codes.into_iter().collect();
        Self::new(move |meta| meta.status().is_some_and(|s| codes.contains(&s)))
    }

    pub fn accepts(&self, metadata: &ProbeMetadata) -> bool {
        (self.0)(metadata)
    }
}

impl fmt::Debug for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Acceptance(..)")
    }
}

/// Options for one scan invocation. Read-only once the scan starts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub base_target: String,
    pub parallelism: usize,
    pub timeout: Duration,
    pub rate_per_second: Option<NonZeroU32>,
    pub acceptance: Acceptance,
}

impl ScanConfig {
    /// Subdomain discovery against a bare domain; a name is a hit if it resolves.
    pub fn for_subdomains(domain: impl Into<String>) -> Self {
        Self {
            base_target: domain.into(),
            parallelism: DEFAULT_PARALLELISM,
            timeout: DEFAULT_TIMEOUT,
            rate_per_second: None,
            acceptance: Acceptance::resolves(),
        }
    }

    /// Path discovery against a base URL, accepting [`DEFAULT_ACCEPTED_STATUSES`].
    pub fn for_paths(base_url: impl Into<String>) -> Self {
        Self {
            base_target: base_url.into(),
            parallelism: DEFAULT_PARALLELISM,
            timeout: DEFAULT_TIMEOUT,
            rate_per_second: None,
            acceptance: Acceptance::status_in(DEFAULT_ACCEPTED_STATUSES.iter().copied()),
        }
    }

    /// Sets the worker ceiling. Zero is replaced by [`DEFAULT_PARALLELISM`].
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = normalize_parallelism(parallelism);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rate(mut self, per_second: u32) -> Self {
        self.rate_per_second = NonZeroU32::new(per_second);
        self
    }

    pub fn with_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.acceptance = acceptance;
        self
    }

    pub fn with_accepted_statuses<I>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.with_acceptance(Acceptance::status_in(codes))
    }

    /// Parallelism with a zero ceiling replaced by the default.
    pub fn effective_parallelism(&self) -> usize {
        if self.parallelism == 0 {
            DEFAULT_PARALLELISM
        } else {
            self.parallelism
        }
    }
}

pub(crate) fn normalize_parallelism(parallelism: usize) -> usize {
    if parallelism == 0 {
        tracing::warn!(
            "parallelism must be positive, using default of {}",
            DEFAULT_PARALLELISM
        );
        DEFAULT_PARALLELISM
    } else {
        parallelism
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubdomainHit {
    pub name: String,
    pub addresses: Vec<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathHit {
    pub url: String,
    pub status: u16,
}

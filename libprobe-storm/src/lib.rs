mod dns;
mod error;
mod http;
mod paths;
mod permute;
mod prober;
mod ratelimit;
mod source;
mod subdomain;
mod types;

pub use dns::DnsProbe;
pub use error::ScanError;
pub use http::{create_http_pool, HttpProbe, USER_AGENT};
pub use paths::{join_path, PathDiscovery};
pub use permute::{default_vocabulary, expand, DEFAULT_MUTATION_VOCABULARY};
pub use prober::{probe_fn, BoundedProber, FnProbe, Probe};
pub use ratelimit::ScanRateLimiter;
pub use source::{CandidateSource, DiscoveryMode, SourceError};
pub use subdomain::{qualify_names, SubdomainDiscovery};
pub use types::{
    Acceptance, PathHit, ProbeMetadata, ProbeOutcome, ScanConfig, SubdomainHit,
    DEFAULT_ACCEPTED_STATUSES, DEFAULT_PARALLELISM, DEFAULT_TIMEOUT,
};

/// Subdomain discovery with the built-in wordlist and default settings.
pub async fn discover_subdomains(domain: &str) -> Result<Vec<SubdomainHit>, ScanError> {
    SubdomainDiscovery::new(ScanConfig::for_subdomains(domain))?
        .run(&CandidateSource::Builtin)
        .await
}

/// Path discovery with the built-in wordlist and default settings.
pub async fn discover_paths(base_url: &str) -> Result<Vec<PathHit>, ScanError> {
    PathDiscovery::new(ScanConfig::for_paths(base_url))?
        .run(&CandidateSource::Builtin)
        .await
}

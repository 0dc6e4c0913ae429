use crate::{
    dns::DnsProbe,
    error::ScanError,
    permute::{default_vocabulary, expand},
    prober::{BoundedProber, Probe},
    source::{CandidateSource, DiscoveryMode},
    types::{ProbeOutcome, ScanConfig, SubdomainHit},
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{debug, info};

/// Two-phase subdomain enumeration: a wordlist pass, then a pass over
/// permutations of whatever the first pass confirmed.
pub struct SubdomainDiscovery<P = DnsProbe> {
    domain: String,
    vocabulary: Vec<String>,
    prober: BoundedProber,
    probe: Arc<P>,
}

impl SubdomainDiscovery<DnsProbe> {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let probe = DnsProbe::new(&config);
        Self::with_probe(config, probe)
    }
}

impl<P: Probe + 'static> SubdomainDiscovery<P> {
    pub fn with_probe(config: ScanConfig, probe: P) -> Result<Self, ScanError> {
        Ok(Self {
            domain: normalize_domain(&config.base_target)?,
            vocabulary: default_vocabulary(),
            prober: BoundedProber::from_config(&config),
            probe: Arc::new(probe),
        })
    }

    pub fn with_vocabulary(mut self, vocabulary: Vec<String>) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Loads the candidates, then runs both phases. Only a failure to load
    /// the source is reported as an error.
    pub async fn run(&self, source: &CandidateSource) -> Result<Vec<SubdomainHit>, ScanError> {
        let words = source.load(DiscoveryMode::Subdomains).await?;
        Ok(self.discover(words).await)
    }

    pub async fn discover(&self, words: Vec<String>) -> Vec<SubdomainHit> {
        let candidates = qualify_names(&words, &self.domain);
        info!(
            domain = %self.domain,
            candidates = candidates.len(),
            "phase 1: wordlist enumeration"
        );
        let mut found = self
            .prober
            .run_outcomes(candidates, Arc::clone(&self.probe))
            .await;
        info!("phase 1: {} subdomains found", found.len());

        let permutations = expand(found.keys(), &self.domain, &self.vocabulary);
        info!(
            candidates = permutations.len(),
            "phase 2: permutation enumeration"
        );
        let permuted = self
            .prober
            .run_outcomes(permutations, Arc::clone(&self.probe))
            .await;
        info!("phase 2: {} new subdomains found", permuted.len());

        for (name, outcome) in permuted {
            found.entry(name).or_insert(outcome);
        }

        into_hits(found)
    }
}

fn into_hits(found: HashMap<String, ProbeOutcome>) -> Vec<SubdomainHit> {
    let mut hits: Vec<SubdomainHit> = found
        .into_values()
        .map(|outcome| SubdomainHit {
            addresses: outcome.metadata.addresses().to_vec(),
            name: outcome.candidate,
        })
        .collect();
    hits.sort_by(|a, b| a.name.cmp(&b.name));
    hits
}

fn normalize_domain(domain: &str) -> Result<String, ScanError> {
    let domain = domain.trim().trim_matches('.').to_lowercase();
    if domain.is_empty() || domain.contains(|c: char| c == '/' || c == ':' || c.is_whitespace()) {
        return Err(ScanError::InvalidTarget(format!("not a bare domain: {:?}", domain)));
    }
    Ok(domain)
}

/// Turns raw labels into unique fully-qualified names, keeping first-seen order.
pub fn qualify_names(words: &[String], domain: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .iter()
        .filter_map(|word| {
            let label = word.trim().trim_matches('.').to_lowercase();
            if label.is_empty() || label.contains(char::is_whitespace) {
                debug!(word = %word, "skipping malformed label");
                return None;
            }
            Some(format!("{}.{}", label, domain))
        })
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

use crate::{
    error::ScanError,
    http::HttpProbe,
    prober::{BoundedProber, Probe},
    source::{CandidateSource, DiscoveryMode},
    types::{PathHit, ScanConfig},
};
use reqwest::Url;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info};

/// Single-phase path enumeration against one base URL.
pub struct PathDiscovery<P = HttpProbe> {
    base_url: String,
    prober: BoundedProber,
    probe: Arc<P>,
}

impl PathDiscovery<HttpProbe> {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let probe = HttpProbe::new(&config)?;
        Self::with_probe(config, probe)
    }
}

impl<P: Probe + 'static> PathDiscovery<P> {
    pub fn with_probe(config: ScanConfig, probe: P) -> Result<Self, ScanError> {
        Ok(Self {
            base_url: normalize_base_url(&config.base_target)?,
            prober: BoundedProber::from_config(&config),
            probe: Arc::new(probe),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn run(&self, source: &CandidateSource) -> Result<Vec<PathHit>, ScanError> {
        let words = source.load(DiscoveryMode::Paths).await?;
        Ok(self.discover(words).await)
    }

    pub async fn discover(&self, words: Vec<String>) -> Vec<PathHit> {
        let mut seen = HashSet::new();
        let urls: Vec<String> = words
            .iter()
            .filter_map(|segment| {
                let url = join_path(&self.base_url, segment);
                if url.is_none() {
                    debug!(segment = %segment, "skipping malformed path");
                }
                url
            })
            .filter(|url| seen.insert(url.clone()))
            .collect();

        info!(base = %self.base_url, candidates = urls.len(), "path enumeration");
        let found = self
            .prober
            .run_outcomes(urls, Arc::clone(&self.probe))
            .await;
        info!("{} paths found", found.len());

        let mut hits: Vec<PathHit> = found
            .into_values()
            .filter_map(|outcome| {
                let status = outcome.metadata.status()?;
                Some(PathHit {
                    url: outcome.candidate,
                    status,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.url.cmp(&b.url));
        hits
    }
}

fn normalize_base_url(base: &str) -> Result<String, ScanError> {
    let trimmed = base.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ScanError::InvalidTarget(format!("{}: {}", base, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ScanError::InvalidTarget(format!("not an http(s) URL: {}", base)));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ScanError::InvalidTarget(format!(
            "base URL must not carry a query or fragment: {}",
            base
        )));
    }
    Ok(trimmed.to_string())
}

/// `base + "/" + segment`, or `None` when the segment cannot form a URL.
pub fn join_path(base: &str, segment: &str) -> Option<String> {
    let segment = segment.trim().trim_start_matches('/');
    if segment.is_empty() || segment.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return None;
    }
    let joined = format!("{}/{}", base, segment);
    Url::parse(&joined).ok().map(|_| joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_malformed_segments() {
        let base = "http://example.test";
        assert_eq!(join_path(base, "admin").as_deref(), Some("http://example.test/admin"));
        assert_eq!(join_path(base, "/robots.txt").as_deref(), Some("http://example.test/robots.txt"));
        assert_eq!(join_path(base, ""), None);
        assert_eq!(join_path(base, "a b"), None);
        assert_eq!(join_path(base, "tab\there"), None);
    }

    #[test]
    fn base_url_must_be_http() {
        assert_eq!(normalize_base_url("http://example.test/").unwrap(), "http://example.test");
        assert_eq!(normalize_base_url("https://example.test/app/").unwrap(), "https://example.test/app");
        assert!(normalize_base_url("example.test").is_err());
        assert!(normalize_base_url("ftp://example.test").is_err());
        assert!(normalize_base_url("http://example.test/?a=1").is_err());
        assert!(normalize_base_url("http://example.test/app?debug").is_err());
        assert!(normalize_base_url("http://example.test/#top").is_err());
    }
}

use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_SUBDOMAIN_WORDS: &[&str] = &[
    "www", "mail", "ftp", "localhost", "webmail", "smtp", "pop", "ns1", "ns2", "admin",
    "dev", "test", "web", "demo", "vpn", "m", "shop", "api", "prod", "staging",
];

const DEFAULT_PATH_WORDS: &[&str] = &[
    "admin", "login", "api", "backup", "config", "dashboard", "uploads", "static",
    "test", "server-status", "wp-admin", "robots.txt", "sitemap.xml", ".git/HEAD", ".env",
];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read wordlist {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    Subdomains,
    Paths,
}

impl DiscoveryMode {
    pub fn builtin_words(self) -> &'static [&'static str] {
        match self {
            DiscoveryMode::Subdomains => DEFAULT_SUBDOMAIN_WORDS,
            DiscoveryMode::Paths => DEFAULT_PATH_WORDS,
        }
    }
}

/// Where a scan's raw candidates come from.
#[derive(Debug, Clone, Default)]
pub enum CandidateSource {
    /// The small built-in list for the discovery mode.
    #[default]
    Builtin,
    /// One candidate per non-empty line, in file order.
    Wordlist(PathBuf),
    Inline(Vec<String>),
}

impl CandidateSource {
    pub fn from_path(path: Option<impl Into<PathBuf>>) -> Self {
        match path {
            Some(p) => CandidateSource::Wordlist(p.into()),
            None => CandidateSource::Builtin,
        }
    }

    /// Loads the candidates. Duplicates are kept; they collapse later on
    /// their fully-qualified form.
    pub async fn load(&self, mode: DiscoveryMode) -> Result<Vec<String>, SourceError> {
        match self {
            CandidateSource::Builtin => Ok(mode.builtin_words().iter().map(|w| w.to_string()).collect()),
            CandidateSource::Wordlist(path) => read_wordlist(path).await,
            CandidateSource::Inline(words) => Ok(words.clone()),
        }
    }
}

async fn read_wordlist(path: &Path) -> Result<Vec<String>, SourceError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

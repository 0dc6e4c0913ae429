use clap::{Args as ClapArgs, Parser, Subcommand};
use libprobe_storm::{
    default_vocabulary, CandidateSource, PathDiscovery, PathHit, ScanConfig, SubdomainDiscovery,
    DEFAULT_ACCEPTED_STATUSES, DEFAULT_PARALLELISM, DEFAULT_TIMEOUT,
};
use serde::{Deserialize, Serialize};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Deserialize, Serialize)]
struct Config {
    #[serde(default)]
    scan: ScanDefaults,
    #[serde(default)]
    subdomains: SubdomainDefaults,
    #[serde(default)]
    paths: PathDefaults,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ScanDefaults {
    threads: Option<i64>,
    timeout_secs: Option<u64>,
    rate: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SubdomainDefaults {
    mutation_vocabulary: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct PathDefaults {
    accepted_statuses: Option<Vec<u16>>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("recon").join("config.toml"))
}

fn load_config() -> Config {
    config_path()
        .and_then(|path| std::fs::read_to_string(&path).ok())
        .and_then(|content| match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring malformed config file: {}", e);
                None
            }
        })
        .unwrap_or_default()
}

fn get_default_config_toml() -> String {
    format!(
        r#"# Recon Configuration

[scan]
# Concurrent probes per scan (non-positive values fall back to {threads})
# threads = {threads}
# Per-probe timeout in seconds
# timeout_secs = {timeout}
# Requests per second ceiling, unlimited when unset
# rate = 20

[subdomains]
# Words used to mutate confirmed subdomains in the permutation pass
# mutation_vocabulary = {vocab:?}

[paths]
# Status codes that count as a hit
# accepted_statuses = {statuses:?}
"#,
        threads = DEFAULT_PARALLELISM,
        timeout = DEFAULT_TIMEOUT.as_secs(),
        vocab = default_vocabulary(),
        statuses = DEFAULT_ACCEPTED_STATUSES,
    )
}

#[derive(Parser, Debug)]
#[command(name = "recon")]
#[command(about = "Recon - bounded subdomain and path discovery", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Log scan progress to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Print the default config to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate subdomains of a domain (wordlist pass, then permutations)
    Subdomains(SubdomainArgs),
    /// Scan a web server for accessible paths
    Paths(PathArgs),
    /// Print the version
    Version,
}

#[derive(ClapArgs, Debug)]
struct ScanArgs {
    /// Wordlist file, one candidate per line (built-in list when omitted)
    #[arg(long, short = 'w')]
    wordlist: Option<PathBuf>,

    /// Number of concurrent probes
    #[arg(long, short = 't', allow_negative_numbers = true)]
    threads: Option<i64>,

    /// Per-probe timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Requests per second ceiling
    #[arg(long)]
    rate: Option<u32>,

    /// Print a JSON report instead of plain lines
    #[arg(long, short = 'j')]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct SubdomainArgs {
    /// Bare domain, e.g. example.com
    domain: String,

    /// Comma-separated mutation words for the permutation pass
    #[arg(long, value_delimiter = ',')]
    vocab: Option<Vec<String>>,

    #[command(flatten)]
    scan: ScanArgs,
}

#[derive(ClapArgs, Debug)]
struct PathArgs {
    /// Base URL, e.g. https://example.com
    url: String,

    /// Comma-separated status codes that count as a hit
    #[arg(long, value_delimiter = ',')]
    status: Option<Vec<u16>>,

    #[command(flatten)]
    scan: ScanArgs,
}

#[derive(Debug, Serialize)]
struct Report<'a, T> {
    target: &'a str,
    mode: &'static str,
    hits: &'a [T],
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Flags win over the config file, which wins over library defaults.
fn build_config(mut config: ScanConfig, args: &ScanArgs, defaults: &ScanDefaults) -> ScanConfig {
    if let Some(threads) = args.threads.or(defaults.threads) {
        config = config.with_parallelism(usize::try_from(threads).unwrap_or(0));
    }
    if let Some(secs) = args.timeout.or(defaults.timeout_secs) {
        config = config.with_timeout(Duration::from_secs(secs.max(1)));
    }
    if let Some(rate) = args.rate.or(defaults.rate) {
        config = config.with_rate(rate);
    }
    config
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", get_default_config_toml());
        return Ok(());
    }

    if args.write_default_config {
        if let Some(path) = config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, get_default_config_toml())?;
            println!("Default config written to: {}", path.display());
        } else {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
        return Ok(());
    }

    let Some(command) = args.command else {
        eprintln!("Error: a subcommand is required (see --help)");
        std::process::exit(2);
    };

    if let Command::Version = command {
        println!("recon {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(args.verbose);
    let config = load_config();

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        match command {
            Command::Subdomains(sub) => run_subdomains(sub, &config).await,
            Command::Paths(paths) => run_paths(paths, &config).await,
            Command::Version => Ok(()),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

async fn run_subdomains(args: SubdomainArgs, config: &Config) -> CliResult {
    let scan = build_config(ScanConfig::for_subdomains(&args.domain), &args.scan, &config.scan);
    let vocabulary = args
        .vocab
        .or_else(|| config.subdomains.mutation_vocabulary.clone())
        .unwrap_or_else(default_vocabulary);

    let discovery = SubdomainDiscovery::new(scan)?.with_vocabulary(vocabulary);
    let source = CandidateSource::from_path(args.scan.wordlist.clone());
    let hits = discovery.run(&source).await?;

    let report = Report {
        target: discovery.domain(),
        mode: "subdomains",
        hits: &hits,
    };
    emit(&report, &args.scan, |out| {
        for hit in &hits {
            writeln!(out, "{}", hit.name)?;
        }
        Ok(())
    })
}

async fn run_paths(args: PathArgs, config: &Config) -> CliResult {
    let mut scan = build_config(ScanConfig::for_paths(&args.url), &args.scan, &config.scan);
    if let Some(statuses) = args.status.or_else(|| config.paths.accepted_statuses.clone()) {
        scan = scan.with_accepted_statuses(statuses);
    }

    let discovery = PathDiscovery::new(scan)?;
    let source = CandidateSource::from_path(args.scan.wordlist.clone());
    let hits = discovery.run(&source).await?;

    let report = Report {
        target: discovery.base_url(),
        mode: "paths",
        hits: &hits,
    };
    emit(&report, &args.scan, |out| {
        for PathHit { url, status } in &hits {
            writeln!(out, "[{}] {}", status, url)?;
        }
        Ok(())
    })
}

fn emit<T, F>(report: &Report<'_, T>, args: &ScanArgs, plain: F) -> CliResult
where
    T: Serialize,
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let json = serde_json::to_string_pretty(report)?;

    if let Some(path) = &args.out {
        write_report(path, &json)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        writeln!(out, "{}", json)?;
    } else {
        plain(&mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn write_report(path: &Path, json: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn scan_args(threads: Option<i64>, timeout: Option<u64>) -> ScanArgs {
        ScanArgs {
            wordlist: None,
            threads,
            timeout,
            rate: None,
            json: false,
            out: None,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config: Config = toml::from_str(&get_default_config_toml()).unwrap();
        assert!(config.scan.threads.is_none());
        assert!(config.paths.accepted_statuses.is_none());
    }

    #[test]
    fn config_file_values_are_read() {
        let config: Config = toml::from_str(
            r#"
[scan]
threads = 25
timeout_secs = 3

[subdomains]
mutation_vocabulary = ["blue", "green"]

[paths]
accepted_statuses = [200, 500]
"#,
        )
        .unwrap();
        assert_eq!(config.scan.threads, Some(25));
        assert_eq!(config.subdomains.mutation_vocabulary.unwrap(), vec!["blue", "green"]);
        assert_eq!(config.paths.accepted_statuses.unwrap(), vec![200, 500]);
    }

    #[test]
    fn flags_override_file_defaults() {
        let defaults = ScanDefaults {
            threads: Some(40),
            timeout_secs: Some(9),
            rate: None,
        };
        let config = build_config(
            ScanConfig::for_subdomains("example.test"),
            &scan_args(Some(3), None),
            &defaults,
        );
        assert_eq!(config.effective_parallelism(), 3);
        assert_eq!(config.timeout, Duration::from_secs(9));
    }

    #[test]
    fn negative_threads_fall_back_to_default() {
        let config = build_config(
            ScanConfig::for_paths("http://example.test"),
            &scan_args(Some(-4), None),
            &ScanDefaults::default(),
        );
        assert_eq!(config.effective_parallelism(), DEFAULT_PARALLELISM);
    }

    #[test]
    fn parses_path_subcommand() {
        let args = Args::try_parse_from([
            "recon", "paths", "https://example.test", "--status", "200,403", "-t", "-1", "--json",
        ])
        .unwrap();
        match args.command {
            Some(Command::Paths(p)) => {
                assert_eq!(p.status, Some(vec![200, 403]));
                assert_eq!(p.scan.threads, Some(-1));
                assert!(p.scan.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn report_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let hits = vec![PathHit {
            url: "http://example.test/admin".into(),
            status: 401,
        }];
        let report = Report {
            target: "http://example.test",
            mode: "paths",
            hits: &hits,
        };
        write_report(&path, &serde_json::to_string_pretty(&report).unwrap()).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["hits"][0]["status"], 401);
        assert_eq!(written["mode"], "paths");
    }
}

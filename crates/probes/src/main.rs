//! Service probes - command line entry point
//!
//! Exit codes: 0 when every selected probe passed, 1 when any failed,
//! 2 when the run could not be set up.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use service_probes::config::{
    self, BrowserProbeConfig, CapabilityStyle, HealthProbeConfig, ProbeConfig, Strictness,
};
use service_probes::output::{self, OutputFormat};
use service_probes::runner::{ProbeRunner, SuiteReport};

#[derive(Parser, Debug)]
#[command(name = "service-probes")]
#[command(author, version, about = "Browser and health endpoint probes", long_about = None)]
struct Args {
    /// Run only the probe with this name (browser-title, health)
    #[arg(short, long)]
    probe: Option<String>,

    /// Run only probes carrying this tag (e2e, integration)
    #[arg(short, long, conflicts_with = "probe")]
    tag: Option<String>,

    /// Remote WebDriver endpoint
    #[arg(long, env = config::SELENIUM_URL_ENV, default_value = config::DEFAULT_SELENIUM_URL)]
    selenium_url: String,

    /// Page loaded by the browser probe
    #[arg(long, default_value = config::DEFAULT_TARGET_URL)]
    target_url: String,

    /// Substring the page title must contain
    #[arg(long, default_value = config::DEFAULT_EXPECTED_TITLE)]
    expected_title: String,

    /// Tag name of the element that must be present
    #[arg(long, default_value = "h1")]
    heading_tag: String,

    /// Seconds to wait for each browser condition
    #[arg(long, default_value = "10")]
    wait_timeout: u64,

    /// Milliseconds between browser condition checks
    #[arg(long, default_value = "500")]
    poll_interval: u64,

    /// Browser probe variant
    #[arg(long, value_enum, default_value = "strict")]
    browser_variant: Strictness,

    /// How browser capabilities are declared
    #[arg(long, value_enum, default_value = "options-only")]
    capabilities: CapabilityStyle,

    /// Base URL of the service under health check
    #[arg(long, env = config::BASE_URL_ENV, default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Path of the health endpoint
    #[arg(long, default_value = "/health")]
    health_path: String,

    /// Seconds before the health request times out
    #[arg(long, default_value = "5")]
    request_timeout: u64,

    /// Health probe variant
    #[arg(long, value_enum, default_value = "loose")]
    health_variant: Strictness,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Args {
    fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            browser: BrowserProbeConfig {
                selenium_url: self.selenium_url.clone(),
                target_url: self.target_url.clone(),
                expected_title: self.expected_title.clone(),
                heading_tag: self.heading_tag.clone(),
                wait_timeout: Duration::from_secs(self.wait_timeout),
                poll_interval: Duration::from_millis(self.poll_interval),
                strictness: self.browser_variant,
                capabilities: self.capabilities,
                browser_args: config::default_browser_args(),
            },
            health: HealthProbeConfig {
                base_url: self.base_url.clone(),
                path: self.health_path.clone(),
                request_timeout: Duration::from_secs(self.request_timeout),
                strictness: self.health_variant,
            },
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    let result = run(&args).await;
    match &result {
        Ok(report) => println!("{}", output::render_suite(report, args.format)),
        Err(e) => output::print_error(&format!("{:#}", e)),
    }
    std::process::exit(exit_code(&result));
}

fn init_logging(args: &Args) {
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// 0 when every probe passed, 1 when any failed, 2 when the run could not start
fn exit_code(result: &anyhow::Result<SuiteReport>) -> i32 {
    match result {
        Ok(report) if report.all_passed() => 0,
        Ok(_) => 1,
        Err(_) => 2,
    }
}

async fn run(args: &Args) -> anyhow::Result<SuiteReport> {
    let runner = ProbeRunner::new(args.probe_config());

    let report = if let Some(name) = &args.probe {
        let result = runner.run_probe(name).await?;
        SuiteReport {
            total: 1,
            passed: usize::from(result.success),
            failed: usize::from(!result.success),
            duration_ms: result.duration_ms,
            results: vec![result],
        }
    } else if let Some(tag) = &args.tag {
        let report = runner.run_tagged(tag).await;
        if report.total == 0 {
            anyhow::bail!("no probes carry tag {:?}", tag);
        }
        report
    } else {
        runner.run_all().await
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn health_service(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "status": "ok" })))
            .mount(&server)
            .await;
        server
    }

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["service-probes"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults_match_config() {
        let parsed = args(&[
            "--selenium-url",
            "http://grid:4444/wd/hub",
            "--base-url",
            "http://api:8080",
        ]);
        let config = parsed.probe_config();

        assert_eq!(config.browser.selenium_url, "http://grid:4444/wd/hub");
        assert_eq!(config.browser.wait_timeout, Duration::from_secs(10));
        assert_eq!(config.browser.strictness, Strictness::Strict);
        assert_eq!(config.health.base_url, "http://api:8080");
        assert_eq!(config.health.request_timeout, Duration::from_secs(5));
        assert_eq!(config.health.strictness, Strictness::Loose);
    }

    #[test]
    fn test_probe_and_tag_conflict() {
        let argv = ["service-probes", "--probe", "health", "--tag", "e2e"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_log_format_selects_json() {
        assert!(matches!(args(&[]).log_format, LogFormat::Text));
        assert!(matches!(args(&["--log-format", "json"]).log_format, LogFormat::Json));
        assert!(Args::try_parse_from(["service-probes", "--log-format", "xml"]).is_err());
    }

    #[tokio::test]
    async fn test_passing_probe_exits_zero() {
        let server = health_service(200).await;
        let uri = server.uri();
        let parsed = args(&["--probe", "health", "--base-url", uri.as_str()]);

        let result = run(&parsed).await;

        assert_eq!(result.as_ref().unwrap().passed, 1);
        assert_eq!(exit_code(&result), 0);
    }

    #[tokio::test]
    async fn test_failing_probe_exits_one() {
        let server = health_service(500).await;
        let uri = server.uri();
        let parsed = args(&["--tag", "integration", "--base-url", uri.as_str()]);

        let result = run(&parsed).await;

        assert_eq!(result.as_ref().unwrap().failed, 1);
        assert_eq!(exit_code(&result), 1);
    }

    #[tokio::test]
    async fn test_unknown_tag_exits_two() {
        let result = run(&args(&["--tag", "nightly"])).await;

        let err = result.as_ref().unwrap_err();
        assert!(err.to_string().contains("nightly"));
        assert_eq!(exit_code(&result), 2);
    }

    #[tokio::test]
    async fn test_unknown_probe_exits_two() {
        let result = run(&args(&["--probe", "smoke"])).await;

        assert!(result.as_ref().unwrap_err().to_string().contains("smoke"));
        assert_eq!(exit_code(&result), 2);
    }
}

//! Probe runner that executes selected probes and aggregates their results

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::browser::run_browser_probe;
use crate::config::ProbeConfig;
use crate::error::{ErrorKind, ProbeError, ProbeResult};
use crate::health::run_health_probe;

/// The probes this crate knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeKind {
    BrowserTitle,
    Health,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 2] = [ProbeKind::BrowserTitle, ProbeKind::Health];

    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::BrowserTitle => "browser-title",
            ProbeKind::Health => "health",
        }
    }

    /// Suite the probe belongs to
    pub fn tag(&self) -> &'static str {
        match self {
            ProbeKind::BrowserTitle => "e2e",
            ProbeKind::Health => "integration",
        }
    }

    pub fn from_name(name: &str) -> ProbeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| ProbeError::UnknownProbe(name.to_string()))
    }
}

/// Result of a single probe run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub name: String,
    pub tag: String,
    pub variant: String,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub detail: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
}

/// Result of running a set of probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ProbeReport>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs probes against the configured endpoints
pub struct ProbeRunner {
    config: ProbeConfig,
}

impl ProbeRunner {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run every probe
    pub async fn run_all(&self) -> SuiteReport {
        self.run_kinds(&ProbeKind::ALL).await
    }

    /// Run probes carrying `tag`
    pub async fn run_tagged(&self, tag: &str) -> SuiteReport {
        let kinds: Vec<ProbeKind> = ProbeKind::ALL
            .into_iter()
            .filter(|k| k.tag() == tag)
            .collect();
        self.run_kinds(&kinds).await
    }

    /// Run one probe by name
    pub async fn run_probe(&self, name: &str) -> ProbeResult<ProbeReport> {
        let kind = ProbeKind::from_name(name)?;
        Ok(self.run_kind(kind).await)
    }

    pub async fn run_kinds(&self, kinds: &[ProbeKind]) -> SuiteReport {
        let start = Instant::now();
        let mut results = Vec::with_capacity(kinds.len());
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} probe(s)...", kinds.len());

        for kind in kinds {
            let report = self.run_kind(*kind).await;
            if report.success {
                passed += 1;
                info!("✓ {} ({} ms)", report.name, report.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} [{}] - {}",
                    report.name,
                    report.error_kind.map(|k| k.as_str()).unwrap_or("unknown"),
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(report);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Probe results: {} passed, {} failed ({} ms)", passed, failed, duration_ms);

        SuiteReport {
            total: kinds.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run a single probe, folding its outcome into a report
    pub async fn run_kind(&self, kind: ProbeKind) -> ProbeReport {
        let started_at = Utc::now();
        let start = Instant::now();
        debug!("Running probe: {}", kind.name());

        let (variant, outcome) = match kind {
            ProbeKind::BrowserTitle => {
                let config = &self.config.browser;
                let outcome = run_browser_probe(config).await.map(|page| match page.heading {
                    Some(heading) => format!("title {:?}, heading {:?}", page.title, heading),
                    None => format!("title {:?}", page.title),
                });
                (config.strictness, outcome)
            }
            ProbeKind::Health => {
                let config = &self.config.health;
                let outcome = run_health_probe(config).await.map(|health| {
                    format!("{} answered {}", health.url, health.status_code)
                });
                (config.strictness, outcome)
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        let (detail, error_kind, error) = match outcome {
            Ok(detail) => (Some(detail), None, None),
            Err(e) => (None, Some(e.kind()), Some(e.to_string())),
        };

        ProbeReport {
            name: kind.name().to_string(),
            tag: kind.tag().to_string(),
            variant: variant.as_str().to_string(),
            success: error.is_none(),
            started_at,
            duration_ms,
            detail,
            error_kind,
            error,
        }
    }
}

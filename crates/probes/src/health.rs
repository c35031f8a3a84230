//! Health endpoint probe

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{HealthProbeConfig, Strictness};
use crate::error::{ProbeError, ProbeResult};

/// Payload value the strict variant requires in the `status` field
pub const HEALTHY_STATUS: &str = "ok";

/// What the health endpoint answered on a passing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthObservation {
    pub url: String,
    pub status_code: u16,
    /// Payload `status` field, read only by the strict variant
    pub payload_status: Option<String>,
}

/// Run the health endpoint probe once
pub async fn run_health_probe(config: &HealthProbeConfig) -> ProbeResult<HealthObservation> {
    let url = config.health_url()?;
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    info!("Checking health at {}", url);
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    debug!("Health endpoint returned {}", status);

    if status != StatusCode::OK {
        return Err(ProbeError::UnexpectedStatus {
            expected: StatusCode::OK.as_u16(),
            actual: status.as_u16(),
        });
    }

    let payload_status = match config.strictness {
        Strictness::Strict => {
            let body = response.text().await?;
            Some(check_payload(&body)?)
        }
        Strictness::Loose => None,
    };

    Ok(HealthObservation {
        url: url.to_string(),
        status_code: status.as_u16(),
        payload_status,
    })
}

/// Require a JSON object whose `status` field is `"ok"`
fn check_payload(body: &str) -> ProbeResult<String> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| ProbeError::Payload(format!("body is not JSON: {}", e)))?;

    let status = payload
        .get("status")
        .ok_or_else(|| ProbeError::Payload("missing `status` field".to_string()))?;

    match status.as_str() {
        Some(HEALTHY_STATUS) => Ok(HEALTHY_STATUS.to_string()),
        _ => Err(ProbeError::Payload(format!(
            "expected status {:?}, got {}",
            HEALTHY_STATUS, status
        ))),
    }
}

//! Browser title probe
//!
//! Opens a headless Chrome session on a remote WebDriver endpoint, loads the
//! target page and checks its title and heading. The session is deleted on
//! every exit path once it has been created.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{BrowserProbeConfig, Strictness};
use crate::error::{ProbeError, ProbeResult};
use crate::wait::{self, Wait};
use crate::webdriver::{Capabilities, Locator, Session, WebDriverClient};

/// What the browser saw on a passing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageObservation {
    pub title: String,
    /// Heading text, read only by the strict variant
    pub heading: Option<String>,
}

/// Run the browser title probe once
pub async fn run_browser_probe(config: &BrowserProbeConfig) -> ProbeResult<PageObservation> {
    let client = WebDriverClient::new(&config.selenium_url)?;
    let capabilities = Capabilities::chrome(config.browser_args.clone(), config.capabilities);

    let session = client.new_session(&capabilities).await?;
    let outcome = check_page(&session, config).await;
    let released = session.quit().await;

    match (outcome, released) {
        (Ok(observation), Ok(())) => Ok(observation),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), released) => {
            if let Err(release_err) = released {
                warn!("Session release failed after probe failure: {}", release_err);
            }
            Err(e)
        }
    }
}

async fn check_page(session: &Session, config: &BrowserProbeConfig) -> ProbeResult<PageObservation> {
    let waiter = Wait::new(config.wait_timeout, config.poll_interval);
    let expected = config.expected_title.as_str();
    let locator = Locator::TagName(config.heading_tag.clone());
    let locator = &locator;

    info!("Navigating to {}", config.target_url);
    session.navigate(&config.target_url).await?;

    waiter
        .until(&format!("title containing {:?}", expected), move || {
            wait::title_contains(session, expected)
        })
        .await?;

    let heading = waiter
        .until(&format!("element {}", locator), move || {
            wait::element_present(session, locator)
        })
        .await?;

    let title = waiter.within("page title", session.title()).await?;
    if !title.contains(expected) {
        return Err(ProbeError::AssertionFailed(format!(
            "title {:?} does not contain {:?}",
            title, expected
        )));
    }

    let heading_text = match config.strictness {
        Strictness::Strict => {
            let what = format!("<{}> text", config.heading_tag);
            let text = waiter.within(&what, session.element_text(&heading)).await?;
            if text.trim().is_empty() {
                return Err(ProbeError::AssertionFailed(format!(
                    "<{}> text is empty",
                    config.heading_tag
                )));
            }
            Some(text)
        }
        Strictness::Loose => None,
    };

    info!("Page title {:?}, heading {:?}", title, heading_text);

    Ok(PageObservation {
        title,
        heading: heading_text,
    })
}

//! Bounded waits over WebDriver conditions

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout_at, Instant};
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::webdriver::{Element, Locator, Session};

/// Polls a condition until it yields a value or the timeout elapses
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    timeout: Duration,
    poll_interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Run `condition` until it returns `Some`
    ///
    /// The condition is always checked at least once. An `Err` from the
    /// condition ends the wait immediately; expiry yields
    /// [`ProbeError::Timeout`] naming `what`. An attempt still in flight at
    /// the deadline is abandoned.
    pub async fn until<T, F, Fut>(&self, what: &str, mut condition: F) -> ProbeResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<Option<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let checked = timeout_at(deadline, condition())
                .await
                .map_err(|_| self.expired(what))?;
            if let Some(value) = checked? {
                debug!("{} satisfied after {} attempt(s)", what, attempts);
                return Ok(value);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.expired(what));
            }

            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Await a single command, bounded by the same timeout
    pub async fn within<T, Fut>(&self, what: &str, command: Fut) -> ProbeResult<T>
    where
        Fut: Future<Output = ProbeResult<T>>,
    {
        timeout_at(Instant::now() + self.timeout, command)
            .await
            .map_err(|_| self.expired(what))?
    }

    fn expired(&self, what: &str) -> ProbeError {
        ProbeError::Timeout {
            what: what.to_string(),
            after: self.timeout,
        }
    }
}

/// Title of the current page, if it contains `expected`
pub async fn title_contains(session: &Session, expected: &str) -> ProbeResult<Option<String>> {
    let title = session.title().await?;
    Ok(title.contains(expected).then_some(title))
}

/// First element matching `locator`, if present
pub async fn element_present(session: &Session, locator: &Locator) -> ProbeResult<Option<Element>> {
    match session.find_element(locator).await {
        Ok(element) => Ok(Some(element)),
        Err(e) if e.is_no_such_element() => Ok(None),
        Err(e) => Err(e),
    }
}
